// Error types shared by the library modules. The binary wraps these in
// `anyhow` at the top level; inside the crate every fallible step returns
// `Result<T>` so callers can tell an I/O problem from a network one.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BjspmError {
    #[error("{context} ({}): {source}", .path.display())]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Manifest encoding error: {0}")]
    Manifest(#[from] serde_json::Error),

    /// The interactive input stream failed or was closed.
    #[error("Prompt failed: {0}")]
    Prompt(#[source] std::io::Error),
}

impl BjspmError {
    pub fn io(context: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BjspmError::Io {
            context,
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, BjspmError>;
