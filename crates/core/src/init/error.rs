use std::path::PathBuf;
use thiserror::Error;

pub type InitResult<T> = Result<T, InitError>;

/// Why `clipflow init` could not lay out a project.
#[derive(Debug, Error)]
pub enum InitError {
    #[error("{0:?} is already a clipflow project; pass --force to rewrite its templates")]
    AlreadyInitialized(PathBuf),

    /// The binary was built without this template embedded.
    #[error("No embedded template named {0}")]
    MissingTemplate(String),

    #[error("Cannot create {path:?}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Cannot write {path:?}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}
