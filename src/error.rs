use std::path::PathBuf;
use thiserror::Error;

/// Crate-level error.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    UnsupportedVersion(#[from] UnsupportedVersionError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// The input had nothing the wildcard log parser could use.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("wildcard log is empty")]
    Empty,

    #[error("no endpoint attribute reports found in {lines} lines of input")]
    NoRecords { lines: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "specification version {requested:?} is not supported (supported: {})",
    .supported.join(", ")
)]
pub struct UnsupportedVersionError {
    pub requested: String,
    pub supported: Vec<String>,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("read catalog file {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("bad catalog JSON in {origin}")]
    Json {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("catalog version {0:?} is defined more than once")]
    DuplicateVersion(String),

    #[error("catalog version {version:?} defines device type {id} more than once")]
    DuplicateDeviceType { version: String, id: String },

    #[error("catalog version {version:?} defines {side} cluster {id} more than once")]
    DuplicateCluster {
        version: String,
        id: String,
        side: &'static str,
    },

    #[error("catalog version {version:?}: {message}")]
    Invalid { version: String, message: String },

    #[error("no catalog files (*.json) found in {}", .0.display())]
    EmptyDirectory(PathBuf),
}
