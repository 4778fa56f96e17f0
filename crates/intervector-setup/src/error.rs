//! Fatal bootstrap errors.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a bootstrap run.
///
/// Per-collection and per-record failures are not errors at this level;
/// they are recorded in the run report and the run carries on.
#[derive(Debug, Error)]
pub enum SetupError {
    /// The linked storage engine does not meet the store's requirements.
    #[error("storage engine requirement not met: {0}")]
    Requirements(#[source] intervector_core::Error),

    /// The store at the given path could not be opened or initialized.
    #[error("failed to open store at {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: intervector_core::Error,
    },
}

/// Convenience alias for bootstrap results.
pub type SetupResult<T> = std::result::Result<T, SetupError>;
