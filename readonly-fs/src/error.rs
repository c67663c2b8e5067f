//! Error taxonomy for sandboxed queries.
//!
//! Candidate-level rejections during glob/grep enumeration are swallowed by the caller;
//! only `view` targets, invalid regexes and construction failures surface as errors.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Failure of a single sandboxed operation.
#[derive(Debug, Error)]
pub enum FsToolError {
    #[error("path escapes sandbox root: {}", .0.display())]
    PathEscape(PathBuf),
    #[error("path is blocked: {}", .0.display())]
    BlockedPath(PathBuf),
    #[error("hidden path denied: {}", .0.display())]
    HiddenPathDenied(PathBuf),
    #[error("not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("not a file: {}", .0.display())]
    NotAFile(PathBuf),
    #[error("invalid pattern: {0}")]
    InvalidPattern(String),
    #[error("invalid sandbox root {}: {reason}", .path.display())]
    InvalidRoot { path: PathBuf, reason: String },
    #[error("io error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FsToolError {
    /// Maps an I/O failure on `path`: a missing file becomes [`FsToolError::NotFound`],
    /// anything else [`FsToolError::Io`].
    pub(crate) fn from_io(path: &Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            FsToolError::NotFound(path.to_path_buf())
        } else {
            FsToolError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }
}

/// Failure while building a toolbox from loaded settings.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("config: {0}")]
    Config(#[from] env_config::LoadError),
    #[error(transparent)]
    Sandbox(#[from] FsToolError),
}
