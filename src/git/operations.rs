use git2::{IndexAddOption, Repository, Signature, Status, StatusOptions};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;

#[cfg(any(test, feature = "testing"))]
use mockall::automock;

pub type CommitHash = String;

#[derive(Debug, Error)]
pub enum GitError {
    #[error("No git repository found at or above '{}'", .path.display())]
    RepositoryNotFound {
        path: PathBuf,
        #[source]
        source: git2::Error,
    },
    #[error("Failed to stage changes: {0}")]
    Stage(#[source] git2::Error),
    #[error("Failed to read repository status: {0}")]
    Status(#[source] git2::Error),
    #[error("Failed to create commit: {0}")]
    Commit(#[source] git2::Error),
    #[error("Nothing to commit, the staged tree matches HEAD")]
    NothingToCommit,
    #[error("Repository handle is poisoned by an earlier panic")]
    Poisoned,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitStatus {
    pub staged_files: Vec<String>,
    pub unstaged_files: Vec<String>,
    pub untracked_files: Vec<String>,
}

impl GitStatus {
    pub fn is_clean(&self) -> bool {
        self.staged_files.is_empty() && self.unstaged_files.is_empty() && self.untracked_files.is_empty()
    }
}

/// The version-control operations the migration needs
#[cfg_attr(any(test, feature = "testing"), automock)]
pub trait VersionControl: Send + Sync {
    /// Stage every change below the working directory (replaces `git add ./*`)
    fn stage_all(&self) -> Result<(), GitError>;

    /// Get working tree status (replaces `git status --porcelain`)
    fn status(&self) -> Result<GitStatus, GitError>;

    /// Commit the index on top of HEAD (replaces `git commit --no-verify`)
    ///
    /// libgit2 never runs hooks, so no hook can veto the commit. A tree
    /// identical to HEAD's is refused with [`GitError::NothingToCommit`].
    fn commit(&self, message: &str) -> Result<CommitHash, GitError>;
}

/// Implementation of VersionControl using git2
pub struct Git2Operations {
    repo: Mutex<Repository>,
    pathspec: String,
}

impl Git2Operations {
    /// Open the repository containing `path`, searching parent directories.
    pub fn discover<P: AsRef<Path>>(path: P) -> Result<Self, GitError> {
        let path = path.as_ref();
        let repo = Repository::discover(path).map_err(|source| GitError::RepositoryNotFound {
            path: path.to_path_buf(),
            source,
        })?;
        let pathspec = Self::pathspec_for(&repo, path);
        Ok(Self {
            repo: Mutex::new(repo),
            pathspec,
        })
    }

    /// The directory `path` relative to the work tree, or `*` at its root.
    fn pathspec_for(repo: &Repository, path: &Path) -> String {
        let relative = repo
            .workdir()
            .and_then(|workdir| {
                let workdir = workdir.canonicalize().ok()?;
                let dir = path.canonicalize().ok()?;
                dir.strip_prefix(&workdir).ok().map(Path::to_path_buf)
            })
            .filter(|relative| !relative.as_os_str().is_empty());

        match relative {
            Some(relative) => relative.to_string_lossy().replace('\\', "/"),
            None => "*".to_string(),
        }
    }

    fn repo(&self) -> Result<MutexGuard<'_, Repository>, GitError> {
        self.repo.lock().map_err(|_| GitError::Poisoned)
    }

    fn signature(repo: &Repository) -> Result<Signature<'static>, git2::Error> {
        // Try to get signature from config, fall back to defaults
        match repo.signature() {
            Ok(sig) => Ok(sig.to_owned()),
            Err(_) => Signature::now("decaf-rename", "decaf-rename@localhost"),
        }
    }
}

impl VersionControl for Git2Operations {
    fn stage_all(&self) -> Result<(), GitError> {
        let repo = self.repo()?;
        let mut index = repo.index().map_err(GitError::Stage)?;

        // add_all picks up new and modified paths, update_all records deletions
        let pathspec = [self.pathspec.as_str()];
        index
            .add_all(pathspec, IndexAddOption::DEFAULT, None)
            .map_err(GitError::Stage)?;
        index.update_all(pathspec, None).map_err(GitError::Stage)?;
        index.write().map_err(GitError::Stage)?;

        Ok(())
    }

    fn status(&self) -> Result<GitStatus, GitError> {
        let repo = self.repo()?;
        let mut options = StatusOptions::new();
        options.include_untracked(true).recurse_untracked_dirs(true);

        let statuses = repo.statuses(Some(&mut options)).map_err(GitError::Status)?;
        let mut status = GitStatus::default();

        for entry in statuses.iter() {
            let Some(path) = entry.path() else { continue };
            let flags = entry.status();

            if flags.intersects(
                Status::INDEX_NEW
                    | Status::INDEX_MODIFIED
                    | Status::INDEX_DELETED
                    | Status::INDEX_RENAMED
                    | Status::INDEX_TYPECHANGE,
            ) {
                status.staged_files.push(path.to_string());
            }
            if flags.intersects(Status::WT_MODIFIED | Status::WT_DELETED | Status::WT_TYPECHANGE | Status::WT_RENAMED) {
                status.unstaged_files.push(path.to_string());
            }
            if flags.contains(Status::WT_NEW) {
                status.untracked_files.push(path.to_string());
            }
        }

        Ok(status)
    }

    fn commit(&self, message: &str) -> Result<CommitHash, GitError> {
        let repo = self.repo()?;
        let signature = Self::signature(&repo).map_err(GitError::Commit)?;

        let tree_id = repo
            .index()
            .and_then(|mut index| index.write_tree())
            .map_err(GitError::Commit)?;
        let tree = repo.find_tree(tree_id).map_err(GitError::Commit)?;

        // An unborn branch has no HEAD commit yet; this becomes the root commit
        let parent = match repo.head() {
            Ok(head) => Some(head.peel_to_commit().map_err(GitError::Commit)?),
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch || e.code() == git2::ErrorCode::NotFound => None,
            Err(e) => return Err(GitError::Commit(e)),
        };
        let unchanged = match &parent {
            Some(parent) => parent.tree_id() == tree_id,
            None => tree.is_empty(),
        };
        if unchanged {
            return Err(GitError::NothingToCommit);
        }
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        let oid = repo
            .commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)
            .map_err(GitError::Commit)?;

        Ok(oid.to_string())
    }
}
