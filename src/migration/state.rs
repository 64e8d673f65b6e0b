use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a migration run stands. Each step moves the run one state forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PipelineState {
    Start,
    BackedUp,
    Renamed,
    BackupRemoved,
    Committed,
    RenamedBack,
    ConversionInvoked,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Backup,
    RenameForward,
    RemoveBackup,
    Commit,
    RenameBack,
    Convert,
}

impl Step {
    /// Execution order of a run
    pub const ALL: [Step; 6] = [
        Step::Backup,
        Step::RenameForward,
        Step::RemoveBackup,
        Step::Commit,
        Step::RenameBack,
        Step::Convert,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Backup => "backup",
            Self::RenameForward => "rename_forward",
            Self::RemoveBackup => "remove_backup",
            Self::Commit => "commit",
            Self::RenameBack => "rename_back",
            Self::Convert => "convert",
        }
    }

    /// State a run is in once this step has been attempted
    pub const fn target_state(self) -> PipelineState {
        match self {
            Self::Backup => PipelineState::BackedUp,
            Self::RenameForward => PipelineState::Renamed,
            Self::RemoveBackup => PipelineState::BackupRemoved,
            Self::Commit => PipelineState::Committed,
            Self::RenameBack => PipelineState::RenamedBack,
            Self::Convert => PipelineState::ConversionInvoked,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the orchestrator does after a step fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Record the failure and attempt every remaining step anyway
    #[default]
    Continue,
    /// Stop at the first failed step
    Halt,
}
