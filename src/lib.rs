// decaf-rename - one-shot .coffee to .js migration helper
// This exposes the core components for testing and integration

pub mod cli;
pub mod config;
pub mod external;
pub mod fs;
pub mod git;
pub mod migration;
pub mod telemetry;

// Re-export key types for easy access
pub use config::DecafConfig;
pub use external::{ConversionOutcome, ConvertError, Converter, ProcessConverter};
pub use fs::{FileSystemOperations, StandardFileSystem};
pub use git::{Git2Operations, GitError, VersionControl};
pub use migration::{
    derive_target_path,
    FailurePolicy,
    FileJob,
    MigrationPipeline,
    MigrationReport,
    PipelineOptions,
    PipelineState,
    Step,
    StepError,
};
pub use telemetry::{init_telemetry, LogFormat};
