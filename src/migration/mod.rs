//! One-shot coffee-to-js migration of a single file
//!
//! The run backs the file up, renames it to `.js`, commits that rename on its
//! own so history follows the file, renames it back and hands it to the
//! converter.

pub mod backup;
pub mod error;
pub mod job;
pub mod pipeline;
pub mod report;
pub mod state;

pub use backup::BackupManager;
pub use error::StepError;
pub use job::{derive_target_path, FileJob, JobError};
pub use pipeline::{MigrationPipeline, PipelineOptions};
pub use report::{MigrationReport, StepDetail, StepRecord};
pub use state::{FailurePolicy, PipelineState, Step};
