//! Errors raised while reading a `.clipflow/` directory.

use cf_protocol::ItemId;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// `config.toml` is not valid TOML or has fields of the wrong type.
    #[error("Malformed settings in {path}: {source}")]
    Settings {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A file under `processes/` does not describe a process.
    #[error("Malformed process definition in {path}: {source}")]
    Definition {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    /// A file under `items/` lacks usable front matter.
    #[error("Malformed item file {path}: {reason}")]
    Item { path: PathBuf, reason: String },

    #[error("Cannot list {path}: {source}")]
    Walk {
        path: PathBuf,
        source: walkdir::Error,
    },

    /// Parsed fine but holds a value the runtime cannot use.
    #[error("Unusable setting in {path}: {reason}")]
    InvalidSetting { path: PathBuf, reason: String },

    #[error("Item id {id} in {path} is already used by {first}")]
    DuplicateItem {
        id: ItemId,
        path: PathBuf,
        first: PathBuf,
    },
}

pub type ConfigResult<T> = Result<T, ConfigError>;
