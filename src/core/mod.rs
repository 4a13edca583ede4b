//! Generic async helpers shared by the host bindings and the adapter session.
//!
//! - [`callback`]: callback-to-future adapters
//! - [`series`]: strictly sequential batch execution with optional throttling
//! - [`retry`]: `retry` and the inverted `repeat`
//! - [`logging`]: namespaced logging shorthands
//! - [`value`]: value kinds and comparison helpers

pub mod callback;
pub mod error;
pub mod logging;
pub mod retry;
pub mod series;
pub mod value;

use std::future::Future;
use std::time::Duration;

/// Sleeps for `duration`.
pub async fn wait(duration: Duration) {
    tokio::time::sleep(duration).await;
}

/// Schedules `fut` to run on the runtime after the current task yields.
pub fn next_tick<F>(fut: F) -> tokio::task::JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::spawn(fut)
}
