use async_trait::async_trait;
use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
    time::Duration,
};
use thiserror::Error;
use tokio::{process::Command, time::timeout};
use tracing::debug;

/// Upper bound on a single git invocation unless configured otherwise.
pub const DEFAULT_GIT_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Error)]
pub enum GitError {
    #[error("failed to execute `git {operation}` in `{}`: {source}", .repo_root.display())]
    Spawn {
        operation: &'static str,
        repo_root: PathBuf,
        source: std::io::Error,
    },
    #[error("`git {operation}` failed ({status}): {stderr}")]
    Failed {
        operation: &'static str,
        status: String,
        stderr: String,
    },
    #[error("`git {operation}` did not finish within {limit:?}")]
    TimedOut {
        operation: &'static str,
        limit: Duration,
    },
}

/// The three repository operations the commit procedure needs. Each call is
/// atomic from the caller's point of view.
#[async_trait]
pub trait VersionControl: Send + Sync {
    /// Stage `path`, given relative to the repository root.
    async fn stage(&self, path: &Path) -> Result<(), GitError>;
    async fn commit(&self, message: &str) -> Result<(), GitError>;
    /// Push the current branch to the configured remote.
    async fn push(&self) -> Result<(), GitError>;
}

/// A working copy driven through the `git` command line.
///
/// Git never prompts for credentials, and every invocation is killed once it
/// exceeds the configured time limit.
#[derive(Debug, Clone)]
pub struct GitRepository {
    repo_root: PathBuf,
    remote: String,
    timeout: Duration,
}

impl GitRepository {
    pub fn new(repo_root: impl Into<PathBuf>, remote: impl Into<String>) -> Self {
        Self {
            repo_root: repo_root.into(),
            remote: remote.into(),
            timeout: DEFAULT_GIT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn run_git<I, S>(&self, operation: &'static str, args: I) -> Result<(), GitError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut command = Command::new("git");
        command
            .arg(operation)
            .args(args)
            .current_dir(&self.repo_root)
            .env("GIT_TERMINAL_PROMPT", "0")
            .kill_on_drop(true);

        let output = timeout(self.timeout, command.output())
            .await
            .map_err(|_| GitError::TimedOut {
                operation,
                limit: self.timeout,
            })?
            .map_err(|source| GitError::Spawn {
                operation,
                repo_root: self.repo_root.clone(),
                source,
            })?;

        if output.status.success() {
            debug!(operation, repo = %self.repo_root.display(), "git command succeeded");
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let status = output
                .status
                .code()
                .map_or_else(|| "terminated by signal".to_string(), |code| format!("exit code {code}"));
            Err(GitError::Failed {
                operation,
                status,
                stderr,
            })
        }
    }
}

#[async_trait]
impl VersionControl for GitRepository {
    async fn stage(&self, path: &Path) -> Result<(), GitError> {
        self.run_git("add", [OsStr::new("--"), path.as_os_str()])
            .await
    }

    async fn commit(&self, message: &str) -> Result<(), GitError> {
        self.run_git("commit", ["-m", message]).await
    }

    async fn push(&self) -> Result<(), GitError> {
        self.run_git("push", [self.remote.as_str(), "HEAD"]).await
    }
}
