use anyhow::{Context, Result};
use intervector_setup::directory::{self, NewRestorePoint};
use std::path::Path;

use super::open_existing;

/// List saved restore points.
pub fn show_restore_points(db_path: &Path, limit: usize) -> Result<()> {
    let store = open_existing(db_path)?;
    let points = directory::list_restore_points(&store, limit)
        .context("Failed to read restore points")?;

    println!("\n💾 Restore Points ({} shown)\n", points.len());
    for point in &points {
        println!(
            "  {} [{}] by {} at {}",
            point.id, point.kind, point.created_by, point.timestamp
        );
        println!(
            "    priority: {}, complexity: {}",
            point.metadata.priority, point.metadata.restore_complexity
        );
        if !point.metadata.tags.is_empty() {
            println!("    tags: {}", point.metadata.tags.join(", "));
        }
        println!("    {}", point.summary);
    }

    Ok(())
}

/// Save a new restore point.
pub fn save_restore_point(db_path: &Path, input: &NewRestorePoint) -> Result<()> {
    let store = open_existing(db_path)?;
    let point = directory::create_restore_point(&store, input)
        .context("Failed to create restore point")?;

    println!("✓ Created restore point {}", point.id);
    Ok(())
}
