//! Error types for the watch pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while setting up file watching.
///
/// These are the only fatal errors in the pipeline; anything that happens
/// after setup is logged and isolated to its originating event.
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("no directories to watch")]
    NoWatchDirs,

    #[error("failed to initialize file watcher: {0}")]
    Init(#[source] notify::Error),

    #[error("cannot watch {path}: {source}")]
    Watch {
        path: PathBuf,
        source: notify::Error,
    },
}
