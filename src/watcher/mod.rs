//! The watch side of the change pipeline: sourcing and debouncing.
//!
//! # Architecture
//!
//! ```text
//! notify thread --blocking_send--> source loop --+--> debounce loop --> batches
//!                                  (filter,      |    (dedupe, quiet
//!                                   kind check)  |     period, size cap)
//!                                                |
//!                                     WatchGuard::close() tears down
//!                                     everything upstream of here
//! ```
//!
//! Both loops are tokio tasks joined by capacity-1 channels. Neither stage
//! buffers beyond the debouncer's pending set, so a stalled consumer stalls
//! the notify thread rather than growing a queue.

mod buffer;
mod error;
mod source;

#[cfg(test)]
pub(crate) mod testutil;

pub use buffer::debounce;
pub use error::WatchError;
pub use source::{WatchGuard, watch_dirs};
