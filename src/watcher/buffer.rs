//! Debounce buffer: turns a per-file change stream into discrete batches.
//!
//! Rapid saves produce one notification per write; triggering a build on
//! each would thrash. The buffer deduplicates concurrently arriving paths
//! into a pending set and flushes it as one batch when the set fills up or
//! the stream goes quiet.

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{self, Instant};

/// Consume `files` and emit deduplicated batches.
///
/// A batch flushes when the pending set reaches the size threshold
/// (immediately) or when no path has arrived for `quiet_period` (the single
/// deadline is re-armed on every sub-threshold insertion). Batches are never
/// empty and contain no duplicates. Emission blocks until the downstream
/// consumer is ready, which backpressures the input stream.
///
/// A threshold below 2 is raised to 2: flushing on every single path would
/// defeat deduplication of repeated writes to the same file. Callers that
/// want a pure quiet-period policy should pass a large threshold instead.
///
/// When `files` closes the loop exits at once and closes the output; paths
/// still pending are dropped, not flushed.
pub fn debounce(
    mut files: mpsc::Receiver<PathBuf>,
    size_threshold: usize,
    quiet_period: Duration,
) -> mpsc::Receiver<Vec<PathBuf>> {
    let (tx, rx) = mpsc::channel(1);
    let threshold = size_threshold.max(2);

    tokio::spawn(async move {
        let mut pending: HashSet<PathBuf> = HashSet::new();
        let timer = time::sleep(quiet_period);
        tokio::pin!(timer);
        let mut armed = false;

        loop {
            tokio::select! {
                received = files.recv() => {
                    let Some(path) = received else {
                        // Upstream closed: shut down without a final flush.
                        break;
                    };
                    pending.insert(path);
                    if pending.len() < threshold {
                        // Allow quiet_period to collect more files.
                        timer.as_mut().reset(Instant::now() + quiet_period);
                        armed = true;
                        continue;
                    }
                    crate::debug_event!("buffer", "flush", "pending set full");
                }
                () = timer.as_mut(), if armed => {
                    if pending.is_empty() {
                        // Timer is only armed after an insertion, so this
                        // should not happen; disarm and keep waiting.
                        armed = false;
                        continue;
                    }
                    crate::debug_event!("buffer", "flush", "quiet period elapsed");
                }
            }

            // Flush: full pending set, or timer fired with paths waiting.
            armed = false;
            let batch: Vec<PathBuf> = pending.drain().collect();
            if tx.send(batch).await.is_err() {
                break;
            }
        }
    });

    rx
}
