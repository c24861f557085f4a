//! Channel probes shared by the watcher test modules.

use std::fmt::Debug;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::timeout;

/// Generous bound for events that should arrive.
const READ_TIMEOUT: Duration = Duration::from_secs(2);
/// Short settle window for asserting nothing arrives.
const EMPTY_WINDOW: Duration = Duration::from_millis(100);

/// Read the next value, failing if the channel stays empty or closes.
pub async fn expect_read<T>(rx: &mut mpsc::Receiver<T>) -> T {
    match timeout(READ_TIMEOUT, rx.recv()).await {
        Ok(Some(value)) => value,
        Ok(None) => panic!("expected to read from channel: closed"),
        Err(_) => panic!("expected to read from channel: empty"),
    }
}

/// Assert the channel delivers nothing within the settle window.
pub async fn expect_empty<T: Debug>(rx: &mut mpsc::Receiver<T>) {
    match timeout(EMPTY_WINDOW, rx.recv()).await {
        Ok(Some(value)) => panic!("expected empty channel: read {value:?}"),
        Ok(None) => panic!("expected empty channel: closed"),
        Err(_) => {}
    }
}

/// Assert the channel closes without delivering anything further.
pub async fn expect_closed<T: Debug>(rx: &mut mpsc::Receiver<T>) {
    match timeout(READ_TIMEOUT, rx.recv()).await {
        Ok(None) => {}
        Ok(Some(value)) => panic!("expected closed channel: read {value:?}"),
        Err(_) => panic!("expected closed channel: still open"),
    }
}
