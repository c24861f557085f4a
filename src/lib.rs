//! Watch directories and re-run a command when files change.
//!
//! The crate is a three-stage channel pipeline:
//!
//! ```text
//! notify -> watcher::watch_dirs -> watcher::debounce -> exec::run_batches
//!            (filter basenames)    (dedupe + coalesce)   (one run per batch)
//! ```
//!
//! Each stage is an independent tokio task; the handoff channels have
//! capacity 1, so a slow command applies backpressure all the way up to the
//! notification facility. Shutdown propagates downstream by channel closure:
//! closing the [`watcher::WatchGuard`] ends the source loop, which drains
//! the buffer, which lets the executor return.

pub mod config;
pub mod exec;
pub mod filter;
pub mod logging;
pub mod pipeline;
pub mod watcher;

pub use config::RunConfig;
pub use exec::{ExecError, PartialCommand, Runner};
pub use filter::{FilterError, PathFilter};
pub use pipeline::{Pipeline, PipelineError};
pub use watcher::{WatchError, WatchGuard};
