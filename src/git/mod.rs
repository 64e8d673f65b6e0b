//! Git operations module
//!
//! This module provides a trait-based interface for the git operations the
//! migration needs, backed by libgit2 bindings instead of shell commands.

pub mod operations;

pub use operations::{CommitHash, Git2Operations, GitError, GitStatus, VersionControl};
