//! Resolved process configuration.
//!
//! Built once in `main` from CLI flags; immutable for the process lifetime.
//! There is deliberately no config-file layer: everything the tool needs
//! fits on the command line, and the blacklist extension comes from the
//! `RERUN_BLACKLIST` environment variable (see [`crate::filter`]).

use std::path::PathBuf;
use std::time::Duration;

/// Everything the pipeline needs to run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Directories to watch, non-recursively.
    pub watch_dirs: Vec<PathBuf>,
    /// Required inactivity before a sub-threshold batch flushes.
    pub quiet_period: Duration,
    /// Pending-path count that forces an immediate flush. `0` additionally
    /// suppresses passing file arguments to the command.
    pub size_threshold: usize,
    /// Clear the terminal before each invocation.
    pub clear_terminal: bool,
    /// The command and its base arguments.
    pub command: Vec<String>,
}

impl RunConfig {
    /// A size threshold of 0 means "trigger runs, but never pass the
    /// changed files as arguments".
    pub fn skip_args(&self) -> bool {
        self.size_threshold == 0
    }
}
