use anyhow::Result;
use std::path::Path;

use super::open_existing;

pub fn show_status(db_path: &Path) -> Result<()> {
    let store = open_existing(db_path)?;
    let collections = store.list_collections()?;

    println!("\n📊 Intervector Status\n");
    println!("  Store: {}", db_path.display());
    println!("  Collections: {}\n", collections.len());

    for collection in &collections {
        let count = store.count_records(collection)?;
        println!("  {} ({count} records)", collection.name);
        for (key, value) in &collection.metadata {
            println!("      {key}: {value}");
        }
    }

    if collections.is_empty() {
        println!("  Run `intervector setup` to create the command center collections");
    }

    Ok(())
}
