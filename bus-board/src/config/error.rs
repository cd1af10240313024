//! Config store error types.

use std::path::PathBuf;

/// Failures of the underlying storage port.
///
/// These never reach callers of [`super::ConfigStore`]; the store logs them
/// and carries on with an empty or unsaved collection.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Storage backend cannot be used at all
    #[error("storage unavailable: {message}")]
    Unavailable { message: String },

    /// Filesystem operation failed
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Rejected subscription edits. Nothing is written when these are returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A required text field was blank
    #[error("{0} is required")]
    MissingField(&'static str),

    /// Route list was empty after trimming blanks
    #[error("at least one route must be monitored")]
    NoRoutes,
}
