use super::backup::BackupManager;
use super::error::StepError;
use super::job::FileJob;
use super::report::{MigrationReport, StepDetail};
use super::state::{FailurePolicy, PipelineState, Step};
use crate::external::{ConversionOutcome, Converter};
use crate::fs::FileSystemOperations;
use crate::git::VersionControl;
use crate::telemetry::{create_migration_span, generate_correlation_id};
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn, Instrument};

#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineOptions {
    pub failure_policy: FailurePolicy,
}

/// Runs one file through backup, rename, commit, rename back and conversion.
pub struct MigrationPipeline {
    fs: Arc<dyn FileSystemOperations>,
    backups: BackupManager,
    vcs: Arc<dyn VersionControl>,
    converter: Arc<dyn Converter>,
    options: PipelineOptions,
}

impl MigrationPipeline {
    pub fn new(
        fs: Arc<dyn FileSystemOperations>,
        vcs: Arc<dyn VersionControl>,
        converter: Arc<dyn Converter>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            backups: BackupManager::new(Arc::clone(&fs)),
            fs,
            vcs,
            converter,
            options,
        }
    }

    /// Execute every step in order.
    ///
    /// Under [`FailurePolicy::Continue`] a failed step still moves the run
    /// forward; under [`FailurePolicy::Halt`] the run stops in the state it
    /// had reached before the failure.
    pub async fn run(&self, job: &FileJob) -> MigrationReport {
        let span = create_migration_span(&job.source_path, &generate_correlation_id());

        async {
            let mut report = MigrationReport::new();
            info!(
                target_path = %job.derived_path.display(),
                policy = ?self.options.failure_policy,
                "Starting migration"
            );

            for step in Step::ALL {
                let result = self.execute_step(step, job).await;
                let failed = result.is_err();
                report.record(step, result);

                if failed && self.options.failure_policy == FailurePolicy::Halt {
                    warn!(step = step.as_str(), "Halting after failed step");
                    return report;
                }
                report.advance(step.target_state());
            }

            report.advance(PipelineState::Done);
            info!(failed_steps = report.failures().count(), "Migration finished");
            report
        }
        .instrument(span)
        .await
    }

    async fn execute_step(&self, step: Step, job: &FileJob) -> Result<StepDetail, StepError> {
        info!(step = step.as_str(), "Running step");

        match step {
            Step::Backup => self.backups.make_backup(job).await.map(|_| StepDetail::Completed),
            Step::RenameForward | Step::RenameBack if !job.renames_file() => {
                info!(step = step.as_str(), path = %job.source_path.display(), "Name is unchanged, skipping rename");
                Ok(StepDetail::Completed)
            }
            Step::RenameForward => self
                .rename(job, &job.source_path, &job.derived_path)
                .await
                .map(|_| StepDetail::Completed),
            Step::RemoveBackup => self.backups.remove_backup(job).await.map(|_| StepDetail::Completed),
            Step::Commit => self.commit(job).map(StepDetail::Committed),
            Step::RenameBack => self
                .rename(job, &job.derived_path, &job.source_path)
                .await
                .map(|_| StepDetail::Completed),
            Step::Convert => self.convert(&job.source_path).await.map(StepDetail::Converted),
        }
    }

    /// Move `from` to `to`; on failure put the backup back before reporting it.
    async fn rename(&self, job: &FileJob, from: &Path, to: &Path) -> Result<(), StepError> {
        match self.fs.move_file(from, to, false).await {
            Ok(()) => {
                info!(from = %from.display(), to = %to.display(), "Renamed file");
                Ok(())
            }
            Err(source) => {
                error!(from = %from.display(), to = %to.display(), error = %source, "Error renaming file");
                // restore failures are logged by the backup manager
                let _ = self.backups.restore_backup(job).await;
                Err(StepError::Rename {
                    from: from.to_path_buf(),
                    to: to.to_path_buf(),
                    source,
                })
            }
        }
    }

    /// Stage everything, log the status and commit. Only the commit itself
    /// decides the outcome of the step.
    fn commit(&self, job: &FileJob) -> Result<String, StepError> {
        let message = job.commit_message();

        if let Err(e) = self.vcs.stage_all() {
            error!(error = %e, "Git add error");
        }

        match self.vcs.status() {
            Ok(status) if status.is_clean() => warn!("Git status is clean, nothing staged for the commit"),
            Ok(status) => info!(
                staged = ?status.staged_files,
                unstaged = ?status.unstaged_files,
                untracked = ?status.untracked_files,
                "Git status"
            ),
            Err(e) => error!(error = %e, "Git status error"),
        }

        match self.vcs.commit(&message) {
            Ok(hash) => {
                info!(commit = %hash, message = %message, "Committed rename");
                Ok(hash)
            }
            Err(e) => {
                error!(error = %e, "Git commit error");
                Err(e.into())
            }
        }
    }

    async fn convert(&self, path: &Path) -> Result<ConversionOutcome, StepError> {
        match self.converter.convert(path).await {
            Ok(outcome) => {
                info!(path = %path.display(), ?outcome, "Converter invoked");
                Ok(outcome)
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "Error while converting");
                Err(e.into())
            }
        }
    }
}
