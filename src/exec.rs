//! Sequential command execution, one invocation per batch.
//!
//! The [`Runner`] trait is the seam between the consumption loop and the
//! OS: [`PartialCommand`] is the real implementation, tests substitute a
//! recording fake. Invocations inherit stdout/stderr, so the watched
//! command owns the terminal.

use std::fmt;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitStatus;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;
use tokio::sync::mpsc;

/// ANSI cursor-home plus clear-screen. Best effort; not every terminal
/// honors it.
const CLEAR_TERMINAL: &str = "\x1b[H\x1b[2J";

/// Errors from building or running an invocation.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("no executable file provided")]
    EmptyCommand,

    #[error("failed to spawn '{command}': {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    #[error("'{command}' exited with {status}")]
    Failed {
        command: String,
        status: ExitStatus,
    },
}

/// A one-shot command invocation.
#[async_trait]
pub trait Runner: fmt::Display + Send + Sync {
    /// Run once with `files` appended as trailing arguments.
    async fn run(&self, files: &[PathBuf]) -> Result<(), ExecError>;
}

/// An executable plus a fixed argument prefix.
///
/// Constructed once from the CLI; each invocation copies the prefix into a
/// fresh [`Command`] before appending batch arguments, so successive runs
/// never share mutable argument state.
#[derive(Debug, Clone)]
pub struct PartialCommand {
    program: String,
    base_args: Vec<String>,
}

impl PartialCommand {
    /// Split `argv` into program and base arguments.
    pub fn new(argv: &[String]) -> Result<Self, ExecError> {
        let (program, base_args) = argv.split_first().ok_or(ExecError::EmptyCommand)?;
        Ok(Self {
            program: program.clone(),
            base_args: base_args.to_vec(),
        })
    }

    /// A fresh, fully-resolved invocation with `files` appended.
    fn finalize(&self, files: &[PathBuf]) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.base_args);
        cmd.args(files);
        cmd
    }
}

impl fmt::Display for PartialCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.base_args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

#[async_trait]
impl Runner for PartialCommand {
    async fn run(&self, files: &[PathBuf]) -> Result<(), ExecError> {
        let status = self
            .finalize(files)
            .status()
            .await
            .map_err(|source| ExecError::Spawn {
                command: self.to_string(),
                source,
            })?;
        if !status.success() {
            return Err(ExecError::Failed {
                command: self.to_string(),
                status,
            });
        }
        Ok(())
    }
}

/// The executor control loop. Returns once `batches` closes.
///
/// Strictly sequential: a slow command delays consumption of the next
/// batch, which backpressures the buffer upstream. A failing invocation is
/// logged with its batch and the loop moves on; it never stops the
/// pipeline. With `skip_args` the batch still triggers a run, but its
/// contents are discarded instead of passed as arguments.
pub async fn run_batches<R: Runner>(
    mut batches: mpsc::Receiver<Vec<PathBuf>>,
    command: &R,
    skip_args: bool,
    clear_terminal: bool,
) {
    while let Some(mut files) = batches.recv().await {
        if clear_terminal {
            print!("{CLEAR_TERMINAL}");
            let _ = std::io::stdout().flush();
        }
        if skip_args {
            files.clear();
        }
        crate::log_event!("exec", "run", "{command} {files:?}");
        if let Err(e) = command.run(&files).await {
            tracing::error!("[exec] run failed: {e}, files {files:?}");
        }
    }
}
