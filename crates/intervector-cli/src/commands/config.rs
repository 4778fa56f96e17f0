use anyhow::Result;
use intervector_setup::config::{self, DB_PATH_ENV};
use intervector_setup::Config;
use std::path::Path;

/// Show the current effective configuration.
pub fn show_config(config: &Config, db_path: &Path) {
    println!("Current Configuration");
    println!("=====================\n");

    let config_path = config::config_file_path();
    println!("Config file: {}", config_path.display());
    println!(
        "File exists: {}\n",
        if config_path.exists() { "yes" } else { "no (using defaults)" }
    );

    println!("Settings:");
    println!("  database_path (config): {}", config.database_path.display());
    println!("  database_path (effective): {}", db_path.display());
    println!("  log_level: {}", config.log_level);

    println!(
        "\nPriority: CLI args > ENV vars ({DB_PATH_ENV}, INTERVECTOR_*) > Config file > Defaults"
    );
}

/// Show the config file path.
pub fn show_path() {
    println!("{}", config::config_file_path().display());
}

/// Show example configuration.
pub fn show_example() {
    print!("{}", config::example_config());
}

/// Initialize config file with defaults.
pub fn init_config() -> Result<()> {
    let created = config::ensure_config_file()?;
    let config_path = config::config_file_path();

    if created {
        println!("✓ Created config file: {}", config_path.display());
        println!("\nEdit this file to configure intervector.");
    } else {
        println!("Config file already exists: {}", config_path.display());
    }

    Ok(())
}
