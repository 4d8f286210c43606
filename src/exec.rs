//! External command execution with a testable seam.
//!
//! Every collaborator recap talks to (ffmpeg, the AWS CLI) is reached by
//! running a process and reading its stdout. The `CommandExecutor` trait
//! lets each stage be exercised without those tools installed.

use crate::error::{RecapError, Result};
use std::collections::VecDeque;
use std::ffi::OsString;
use std::sync::Mutex;
use tokio::process::Command;

/// Trait for executing system commands.
///
/// Object-safe, Send + Sync so it can be shared across pipeline stages.
#[async_trait::async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Execute a command with arguments.
    ///
    /// Arguments are passed to the process byte for byte, so paths that are
    /// not valid UTF-8 reach the tool unchanged.
    ///
    /// Returns the stdout of the command on success.
    /// Returns an error if the command is not found or exits non-zero.
    async fn execute(&self, command: &str, args: &[OsString]) -> Result<String>;
}

/// Collect arguments for [`CommandExecutor::execute`].
pub fn os_args<I, S>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
{
    args.into_iter().map(Into::into).collect()
}

/// Production command executor using `tokio::process::Command`.
#[derive(Debug, Clone, Default)]
pub struct SystemCommandExecutor;

impl SystemCommandExecutor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl CommandExecutor for SystemCommandExecutor {
    async fn execute(&self, command: &str, args: &[OsString]) -> Result<String> {
        tracing::debug!(command, ?args, "running external command");

        let output = Command::new(command)
            .args(args)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    RecapError::ToolNotFound {
                        tool: command.to_string(),
                    }
                } else {
                    RecapError::CommandFailed {
                        command: command.to_string(),
                        status: "not started".to_string(),
                        stderr: e.to_string(),
                    }
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RecapError::CommandFailed {
                command: command.to_string(),
                status: output.status.to_string(),
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

#[async_trait::async_trait]
impl<T: CommandExecutor + ?Sized> CommandExecutor for std::sync::Arc<T> {
    async fn execute(&self, command: &str, args: &[OsString]) -> Result<String> {
        (**self).execute(command, args).await
    }
}

/// Mock command executor for testing.
///
/// Records every call and replays queued responses in order. When the queue
/// is empty, calls succeed with empty stdout.
#[derive(Debug, Default)]
pub struct MockCommandExecutor {
    calls: Mutex<Vec<(String, Vec<OsString>)>>,
    responses: Mutex<VecDeque<Result<String>>>,
}

impl MockCommandExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response.
    pub fn with_response(self, response: &str) -> Self {
        if let Ok(mut responses) = self.responses.lock() {
            responses.push_back(Ok(response.to_string()));
        }
        self
    }

    /// Queue an error response.
    pub fn with_error(self, error: RecapError) -> Self {
        if let Ok(mut responses) = self.responses.lock() {
            responses.push_back(Err(error));
        }
        self
    }

    /// All recorded calls as (command, args), args converted lossily to text.
    pub fn calls(&self) -> Vec<(String, Vec<String>)> {
        self.calls
            .lock()
            .map(|c| c.iter().map(lossy).collect())
            .unwrap_or_default()
    }

    /// Number of recorded calls.
    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }

    /// A specific call by index.
    pub fn call(&self, index: usize) -> Option<(String, Vec<String>)> {
        self.calls.lock().ok().and_then(|c| c.get(index).map(lossy))
    }

    /// A specific call by index with the exact arguments received.
    pub fn raw_call(&self, index: usize) -> Option<(String, Vec<OsString>)> {
        self.calls.lock().ok().and_then(|c| c.get(index).cloned())
    }
}

fn lossy((command, args): &(String, Vec<OsString>)) -> (String, Vec<String>) {
    (
        command.clone(),
        args.iter().map(|a| a.to_string_lossy().into_owned()).collect(),
    )
}

#[async_trait::async_trait]
impl CommandExecutor for MockCommandExecutor {
    async fn execute(&self, command: &str, args: &[OsString]) -> Result<String> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((command.to_string(), args.to_vec()));
        }

        self.responses
            .lock()
            .ok()
            .and_then(|mut r| r.pop_front())
            .unwrap_or_else(|| Ok(String::new()))
    }
}
