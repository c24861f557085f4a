//! Orchestration: wire source -> buffer -> executor and own their
//! lifecycles.

use thiserror::Error;
use tokio::task::JoinHandle;

use crate::config::RunConfig;
use crate::exec::{self, ExecError, PartialCommand};
use crate::filter::PathFilter;
use crate::watcher::{self, WatchError, WatchGuard};

/// Startup failures; steady-state failures never surface here.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Watch(#[from] WatchError),

    #[error(transparent)]
    Exec(#[from] ExecError),
}

/// A running change pipeline.
///
/// Holds the shutdown guard for the source end and the join handle for the
/// executor end; nothing else knows about both.
#[derive(Debug)]
pub struct Pipeline {
    guard: WatchGuard,
    executor: JoinHandle<()>,
}

impl Pipeline {
    /// Start all three stages.
    ///
    /// Fails if the command line is empty or any watch directory cannot be
    /// registered; on failure nothing is left running.
    pub fn start(config: RunConfig, filter: PathFilter) -> Result<Self, PipelineError> {
        let command = PartialCommand::new(&config.command)?;
        let (files, guard) = watcher::watch_dirs(&config.watch_dirs, filter)?;
        let batches = watcher::debounce(files, config.size_threshold, config.quiet_period);

        let skip_args = config.skip_args();
        let clear_terminal = config.clear_terminal;
        let executor = tokio::spawn(async move {
            exec::run_batches(batches, &command, skip_args, clear_terminal).await;
        });

        Ok(Self { guard, executor })
    }

    /// Shutdown handle: `close()` on it tears the pipeline down from the
    /// source end. The sole shutdown trigger.
    pub fn canceller(&self) -> WatchGuard {
        self.guard.clone()
    }

    /// Resolve once the executor has observed upstream closure and drained
    /// every batch. Signals pipeline completion, not command success.
    pub async fn wait(self) {
        let _ = self.executor.await;
    }
}
