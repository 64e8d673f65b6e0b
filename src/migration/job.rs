//! The single unit of work: one source file, the path it is renamed to,
//! and the sibling backup that guards it.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use thiserror::Error;

const SOURCE_EXTENSION: &str = "coffee";
const TARGET_EXTENSION: &str = "js";
pub const BACKUP_SUFFIX: &str = ".bak";

#[derive(Debug, Error)]
pub enum JobError {
    #[error("'{}' has no '.coffee' segment, renaming it would be a no-op (pass --allow-unchanged to run anyway)", .path.display())]
    NoCoffeeSegment { path: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileJob {
    pub source_path: PathBuf,
    pub derived_path: PathBuf,
    pub backup_path: PathBuf,
}

impl FileJob {
    /// Build a job for `source`, rejecting files whose name would not change.
    pub fn new(source: impl Into<PathBuf>, allow_unchanged: bool) -> Result<Self, JobError> {
        let source_path = source.into();
        let derived_path = derive_target_path(&source_path);

        if derived_path == source_path && !allow_unchanged {
            return Err(JobError::NoCoffeeSegment { path: source_path });
        }

        let backup_path = backup_path_for(&source_path);

        Ok(Self {
            source_path,
            derived_path,
            backup_path,
        })
    }

    /// False for a pass-through job whose derived name equals the source.
    pub fn renames_file(&self) -> bool {
        self.derived_path != self.source_path
    }

    pub fn commit_message(&self) -> String {
        format!(
            "renaming {} to {}",
            display_basename(&self.source_path),
            display_basename(&self.derived_path)
        )
    }
}

/// Replace the first `coffee` segment of the file name with `js`.
///
/// `foo.coffee` becomes `foo.js` and `dir/bar.spec.coffee` becomes
/// `dir/bar.spec.js`. Names without such a segment come back unchanged.
pub fn derive_target_path(path: &Path) -> PathBuf {
    let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
        return path.to_path_buf();
    };

    let mut segments: Vec<&str> = file_name.split('.').collect();
    let Some(index) = segments.iter().position(|s| *s == SOURCE_EXTENSION) else {
        return path.to_path_buf();
    };
    segments[index] = TARGET_EXTENSION;

    path.with_file_name(segments.join("."))
}

pub fn backup_path_for(path: &Path) -> PathBuf {
    let mut raw: OsString = path.as_os_str().to_owned();
    raw.push(BACKUP_SUFFIX);
    PathBuf::from(raw)
}

fn display_basename(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
