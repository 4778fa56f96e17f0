pub mod agents;
pub mod config;
pub mod restore;
pub mod setup;
pub mod status;

use anyhow::{bail, Context, Result};
use intervector_core::schema::STORE_FILE;
use intervector_core::Store;
use std::path::Path;

pub use agents::{post_message, set_agent_status, show_agents, show_messages};
pub use restore::{save_restore_point, show_restore_points};
pub use setup::run_setup;
pub use status::show_status;

/// Open a store that a previous `setup` created.
fn open_existing(db_path: &Path) -> Result<Store> {
    if !db_path.join(STORE_FILE).exists() {
        bail!(
            "No store found at {}\n\nRun 'intervector setup' to create it.",
            db_path.display()
        );
    }
    Store::open(db_path).with_context(|| format!("Failed to open store at {}", db_path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use intervector_setup::directory::{NewMessage, NewRestorePoint};
    use intervector_setup::{seed, SeedPlan};
    use tempfile::TempDir;

    #[test]
    fn test_open_existing_requires_setup() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("chromadb");

        let err = open_existing(&db_path).unwrap_err();
        assert!(err.to_string().contains("intervector setup"));
        assert!(!db_path.exists());
    }

    #[test]
    fn test_read_commands_after_seed() {
        let temp_dir = TempDir::new().unwrap();
        let store = Store::open(temp_dir.path()).unwrap();
        seed(&store, &SeedPlan::command_center(), |_| {});
        drop(store);

        assert!(show_status(temp_dir.path()).is_ok());
        assert!(show_agents(temp_dir.path()).is_ok());
        assert!(show_messages(temp_dir.path(), &Default::default()).is_ok());
        assert!(show_restore_points(temp_dir.path(), 20).is_ok());
    }

    #[test]
    fn test_write_commands_after_seed() {
        let temp_dir = TempDir::new().unwrap();
        assert!(setup::setup_store(temp_dir.path()));

        let message = NewMessage::new("THEO-5001", "PROMETHEUS", "Dashboard is live");
        assert!(post_message(temp_dir.path(), &message).is_ok());
        let point = NewRestorePoint::new("session_checkpoint", "THEO-5001", "Dashboard is live");
        assert!(save_restore_point(temp_dir.path(), &point).is_ok());

        let store = Store::open(temp_dir.path()).unwrap();
        let messages =
            intervector_setup::directory::list_messages(&store, &Default::default()).unwrap();
        assert_eq!(messages.len(), 2);
        let points = intervector_setup::directory::list_restore_points(&store, 20).unwrap();
        assert_eq!(points.len(), 1);
    }

    #[test]
    fn test_setup_succeeds_on_fresh_and_repeated_runs() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("chromadb");

        assert!(setup::setup_store(&db_path));
        assert!(setup::setup_store(&db_path));
        assert!(db_path.join(STORE_FILE).is_file());
    }

    #[test]
    fn test_setup_fails_when_store_cannot_be_opened() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("occupied");
        std::fs::write(&blocker, b"not a directory").unwrap();

        assert!(!setup::setup_store(&blocker.join("chromadb")));
    }

    #[cfg(unix)]
    #[test]
    fn test_setup_fails_on_read_only_store() {
        use std::fs::{self, Permissions};
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("chromadb");
        assert!(setup::setup_store(&db_path));

        fs::set_permissions(db_path.join(STORE_FILE), Permissions::from_mode(0o444)).unwrap();
        fs::set_permissions(&db_path, Permissions::from_mode(0o555)).unwrap();
        let enforced = fs::write(db_path.join("write-check"), b"").is_err();

        let succeeded = setup::setup_store(&db_path);

        fs::set_permissions(&db_path, Permissions::from_mode(0o755)).unwrap();
        fs::set_permissions(db_path.join(STORE_FILE), Permissions::from_mode(0o644)).unwrap();
        if enforced {
            assert!(!succeeded);
        }
    }
}
