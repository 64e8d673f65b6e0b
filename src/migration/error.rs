use crate::external::ConvertError;
use crate::git::GitError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Why a single pipeline step failed
#[derive(Debug, Error)]
pub enum StepError {
    #[error("Failed to {operation} '{}': {source}", .path.display())]
    Filesystem {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to rename '{}' to '{}': {source}", .from.display(), .to.display())]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    VersionControl(#[from] GitError),
    #[error(transparent)]
    Converter(#[from] ConvertError),
}
