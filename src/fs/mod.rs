//! File system operations abstraction for testing
//!
//! This module provides a trait-based abstraction over the handful of file
//! operations the migration pipeline performs, so the pipeline can be driven
//! against `MockFileSystemOperations` in tests.
//!
//! # Examples
//!
//! ```rust,no_run
//! use decaf_rename::fs::{FileSystemOperations, StandardFileSystem};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     let fs_ops: Arc<dyn FileSystemOperations> = Arc::new(StandardFileSystem);
//!
//!     fs_ops.copy(Path::new("app.coffee"), Path::new("app.coffee.bak")).await?;
//!     fs_ops.move_file(Path::new("app.coffee"), Path::new("app.js"), false).await?;
//!
//!     fs_ops.remove_file(Path::new("app.coffee.bak")).await?;
//!
//!     Ok(())
//! }
//! ```
use std::io;
use std::path::Path;

#[cfg(any(test, feature = "testing"))]
use mockall::automock;

/// Trait for file system operations that can be mocked in tests
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait::async_trait]
pub trait FileSystemOperations: Send + Sync {
    /// Copy `from` to `to`, overwriting `to` if it exists
    async fn copy(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Move `from` to `to`
    ///
    /// Without `overwrite` the move fails with `AlreadyExists` when `to` is
    /// already present.
    async fn move_file(&self, from: &Path, to: &Path, overwrite: bool) -> io::Result<()>;

    /// Remove a file; a path that is already gone counts as removed
    async fn remove_file(&self, path: &Path) -> io::Result<()>;
}

/// Standard implementation that uses actual file system operations
///
/// This is the production implementation of `FileSystemOperations`. Use it
/// in production code and switch to `MockFileSystemOperations` in tests.
pub struct StandardFileSystem;

#[async_trait::async_trait]
impl FileSystemOperations for StandardFileSystem {
    async fn copy(&self, from: &Path, to: &Path) -> io::Result<()> {
        tokio::fs::copy(from, to).await.map(|_| ())
    }

    async fn move_file(&self, from: &Path, to: &Path, overwrite: bool) -> io::Result<()> {
        // rename(2) would clobber silently, so the existence check happens here
        if !overwrite && tokio::fs::try_exists(to).await? {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("destination '{}' already exists", to.display()),
            ));
        }

        match tokio::fs::rename(from, to).await {
            Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
                tokio::fs::copy(from, to).await?;
                tokio::fs::remove_file(from).await
            }
            other => other,
        }
    }

    async fn remove_file(&self, path: &Path) -> io::Result<()> {
        match tokio::fs::remove_file(path).await {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}
