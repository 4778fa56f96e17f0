use anyhow::{Context, Result};
use confyg::{env, Confygery};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::PathBuf;

/// Environment variable that overrides the store directory.
pub const DB_PATH_ENV: &str = "CHROMA_DB_PATH";

/// Store directory used when nothing else is configured.
pub const DEFAULT_DB_PATH: &str = "./chromadb";

/// Configuration for intervector.
///
/// Configuration is loaded from multiple sources with the following priority:
/// 1. CLI arguments (highest priority)
/// 2. `CHROMA_DB_PATH` for the store directory, `INTERVECTOR_*` for the rest
/// 3. Config file (~/.config/intervector/config.toml)
/// 4. Built-in defaults (lowest priority)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the persistent store.
    ///
    /// Can be set via:
    /// - CLI: --db /path/to/dir
    /// - ENV: CHROMA_DB_PATH
    /// - Config: database_path = "/path/to/dir"
    /// - Default: ./chromadb
    pub database_path: PathBuf,

    /// Log filter used when `RUST_LOG` is not set.
    ///
    /// Can be set via:
    /// - ENV: INTERVECTOR_LOG_LEVEL
    /// - Config: log_level = "info"
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DB_PATH),
            log_level: String::from("warn"),
        }
    }
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// Searches for config file at: ~/.config/intervector/config.toml
    /// Reads environment variables with INTERVECTOR_ prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load() -> Result<Self> {
        let config_path = config_file_path();

        let mut builder = Confygery::new().context("Failed to create config builder")?;

        if config_path.exists() {
            let path_str = config_path
                .to_str()
                .ok_or_else(|| anyhow::anyhow!("Config path contains invalid UTF-8"))?;
            builder
                .add_file(path_str)
                .context("Failed to load config file")?;
        }

        let env_opts = env::Options::with_top_level("intervector");
        builder
            .add_env(env_opts)
            .context("Failed to load environment variables")?;

        let config: Self = builder.build().context("Failed to build configuration")?;

        Ok(config)
    }

    /// Store directory after applying the CLI flag and `CHROMA_DB_PATH`.
    pub fn db_path(&self, cli: Option<PathBuf>) -> PathBuf {
        resolve_db_path(cli, std::env::var_os(DB_PATH_ENV), self)
    }
}

/// Pick the store directory: CLI flag, then environment, then config.
///
/// An empty environment value counts as unset.
pub fn resolve_db_path(cli: Option<PathBuf>, env: Option<OsString>, config: &Config) -> PathBuf {
    cli.or_else(|| env.filter(|v| !v.is_empty()).map(PathBuf::from))
        .unwrap_or_else(|| config.database_path.clone())
}

/// Get the config file path.
///
/// Returns:
/// - Linux: ~/.config/intervector/config.toml
/// - macOS: ~/Library/Application Support/intervector/config.toml
/// - Windows: %APPDATA%\intervector\config.toml
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("intervector")
        .join("config.toml")
}

/// Get the example config file content.
pub fn example_config() -> &'static str {
    r#"# Intervector Configuration File
#
# Configuration is loaded from multiple sources with the following priority:
# 1. CLI arguments (highest priority)
# 2. Environment variables (CHROMA_DB_PATH, INTERVECTOR_*)
# 3. This config file
# 4. Built-in defaults (lowest priority)

# Directory holding the persistent store
#
# Can also be set via:
# - CLI: intervector --db /custom/dir setup
# - Environment: CHROMA_DB_PATH=/custom/dir
database_path = "./chromadb"

# Log filter used when RUST_LOG is not set (error, warn, info, debug, trace)
#
# Can also be set via:
# - Environment: INTERVECTOR_LOG_LEVEL=info
log_level = "warn"
"#
}

/// Create default config file if it doesn't exist.
///
/// Returns true if a new file was created, false if it already existed.
pub fn ensure_config_file() -> Result<bool> {
    let config_path = config_file_path();

    if config_path.exists() {
        return Ok(false);
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    std::fs::write(&config_path, example_config()).context("Failed to write config file")?;

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.database_path, PathBuf::from("./chromadb"));
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_example_config_parses() {
        let config: Config = toml::from_str(example_config()).unwrap();
        assert_eq!(config.database_path, PathBuf::from(DEFAULT_DB_PATH));
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = toml::from_str(r#"log_level = "debug""#).unwrap();
        assert_eq!(config.database_path, PathBuf::from(DEFAULT_DB_PATH));
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_cli_flag_wins() {
        let config = Config::default();
        let path = resolve_db_path(
            Some(PathBuf::from("/cli/dir")),
            Some(OsString::from("/env/dir")),
            &config,
        );
        assert_eq!(path, PathBuf::from("/cli/dir"));
    }

    #[test]
    fn test_env_beats_config() {
        let config = Config {
            database_path: PathBuf::from("/config/dir"),
            ..Config::default()
        };
        let path = resolve_db_path(None, Some(OsString::from("/env/dir")), &config);
        assert_eq!(path, PathBuf::from("/env/dir"));
    }

    #[test]
    fn test_falls_back_to_config_then_default() {
        let config = Config {
            database_path: PathBuf::from("/config/dir"),
            ..Config::default()
        };
        assert_eq!(
            resolve_db_path(None, None, &config),
            PathBuf::from("/config/dir")
        );
        assert_eq!(
            resolve_db_path(None, Some(OsString::new()), &Config::default()),
            PathBuf::from("./chromadb")
        );
    }
}
