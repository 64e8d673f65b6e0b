use super::error::StepError;
use super::job::FileJob;
use crate::fs::FileSystemOperations;
use std::sync::Arc;
use tracing::{error, info};

/// Keeps the `.bak` copy that guards the source file while it is moved around.
///
/// Every operation logs its own failure and hands it back; none of them
/// abort the run.
pub struct BackupManager {
    fs: Arc<dyn FileSystemOperations>,
}

impl BackupManager {
    pub fn new(fs: Arc<dyn FileSystemOperations>) -> Self {
        Self { fs }
    }

    pub async fn make_backup(&self, job: &FileJob) -> Result<(), StepError> {
        self.fs
            .copy(&job.source_path, &job.backup_path)
            .await
            .map_err(|source| {
                error!(path = %job.backup_path.display(), error = %source, "Error creating backup file");
                StepError::Filesystem {
                    operation: "create backup",
                    path: job.backup_path.clone(),
                    source,
                }
            })
    }

    pub async fn remove_backup(&self, job: &FileJob) -> Result<(), StepError> {
        self.fs.remove_file(&job.backup_path).await.map_err(|source| {
            error!(path = %job.backup_path.display(), error = %source, "Error deleting backup file");
            StepError::Filesystem {
                operation: "delete backup",
                path: job.backup_path.clone(),
                source,
            }
        })
    }

    /// Move the backup back over the source path, replacing whatever is there.
    pub async fn restore_backup(&self, job: &FileJob) -> Result<(), StepError> {
        info!(path = %job.source_path.display(), "Restoring backup file");
        self.fs
            .move_file(&job.backup_path, &job.source_path, true)
            .await
            .map_err(|source| {
                error!(path = %job.backup_path.display(), error = %source, "There was an error restoring the backup");
                StepError::Filesystem {
                    operation: "restore backup",
                    path: job.backup_path.clone(),
                    source,
                }
            })
    }
}
