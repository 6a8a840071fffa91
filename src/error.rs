//! Error types shared across the player, catalog and favorites modules

use std::path::PathBuf;
use std::time::Duration;

/// Failures of a single load attempt. Always terminal for the current epoch only.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    #[error("content failed to load: {0}")]
    Surface(String),
    #[error("no response from content within {}s", .budget.as_secs())]
    TimeoutExceeded { budget: Duration },
    #[error("no content session has been started")]
    NotStarted,
    #[error("session is bound to '{active}', cannot start '{requested}'")]
    DescriptorMismatch { active: String, requested: String },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FullscreenError {
    #[error("fullscreen request denied: {0}")]
    Denied(String),
    #[error("no playback surface available for fullscreen")]
    NoSurface,
}

/// Favorites store read/write failures. Logged, never fatal.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode favorites: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("import data is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("import data must be a list of favorites")]
    NotAnArray,
    #[error("failed to read import file: {0}")]
    Read(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid catalog data: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("catalog request failed: {0}")]
    Download(String),
    #[error("catalog server returned HTTP {0}")]
    Http(u16),
}
