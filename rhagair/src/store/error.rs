use std::path::PathBuf;

/// Errors from opening or querying a frequency store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store is missing or could not be read when opened.
    #[error("Could not open store at {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The location is not a kind of store this build can open.
    #[error("Unsupported store location {} (expected a directory or a .sqlite file)", .0.display())]
    Unsupported(PathBuf),
    /// The store stopped answering queries.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
    /// The store returned rows that do not fit the table schema.
    #[error("Store contract violation: {0}")]
    ContractViolation(String),
}

impl StoreError {
    pub(crate) fn not_found(path: impl Into<PathBuf>) -> StoreError {
        StoreError::Io {
            path: path.into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such store"),
        }
    }
}
