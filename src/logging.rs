//! Unified logging for pipeline events.
//!
//! Provides compact timestamped logging on stderr, so the watched command
//! keeps exclusive ownership of stdout. Supports the `RUST_LOG` environment
//! variable for runtime overrides:
//!
//! ```bash
//! RUST_LOG=debug rerun -d src cargo test
//! ```

use std::sync::Once;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

static INIT: Once = Once::new();

/// Compact time format: HH:MM:SS.mmm
struct CompactTime;

impl FormatTime for CompactTime {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%H:%M:%S%.3f"))
    }
}

/// Initialize logging.
///
/// Call once at startup. Safe to call multiple times (only first call takes
/// effect).
///
/// Log levels control visibility:
/// - `error` - errors only (quietest)
/// - `info` - run and shutdown events (default)
/// - `debug` - per-file accept/skip decisions and flush triggers
///
/// The `RUST_LOG` environment variable takes precedence over the default.
pub fn init() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_timer(CompactTime)
            .with_level(true)
            .with_writer(std::io::stderr)
            .with_filter(filter);

        tracing_subscriber::registry().with(fmt_layer).init();
    });
}

/// Log an event with stage context.
///
/// # Examples
/// ```ignore
/// log_event!("exec", "run", "{} {:?}", command, files);
/// log_event!("rerun", "done");
/// ```
#[macro_export]
macro_rules! log_event {
    ($stage:expr, $event:expr) => {
        tracing::info!("[{}] {}", $stage, $event)
    };
    ($stage:expr, $event:expr, $($arg:tt)*) => {
        tracing::info!("[{}] {}: {}", $stage, $event, format!($($arg)*))
    };
}

/// Debug-only event logging.
///
/// # Examples
/// ```ignore
/// debug_event!("watcher", "skipped", "{}", path.display());
/// ```
#[macro_export]
macro_rules! debug_event {
    ($stage:expr, $event:expr) => {
        tracing::debug!("[{}] {}", $stage, $event)
    };
    ($stage:expr, $event:expr, $($arg:tt)*) => {
        tracing::debug!("[{}] {}: {}", $stage, $event, format!($($arg)*))
    };
}
