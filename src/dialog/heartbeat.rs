//! Liveness heartbeat while a dialog is open
//!
//! The ticker lives inside the same `select!` as the awaited dialog, so it is
//! torn down the moment the dialog settles, whatever the outcome.

use std::future::Future;
use std::time::Duration;

use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

/// Message attached to every heartbeat.
pub const HEARTBEAT_MESSAGE: &str = "Waiting for the user to respond...";

/// Receives progress ticks; the MCP server forwards them as
/// `notifications/progress`.
pub trait ProgressSink: Send + Sync {
    fn progress(&self, progress: u64, message: &str);
}

/// Await `fut`, reporting a tick to `sink` every `every` until it completes.
pub async fn with_heartbeat<F>(fut: F, sink: Option<&dyn ProgressSink>, every: Duration) -> F::Output
where
    F: Future,
{
    let Some(sink) = sink else {
        return fut.await;
    };

    tokio::pin!(fut);
    let mut ticker = interval_at(Instant::now() + every, every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut count = 0u64;

    loop {
        tokio::select! {
            biased;
            output = &mut fut => return output,
            _ = ticker.tick() => {
                count += 1;
                debug!(count, "Heartbeat");
                sink.progress(count, HEARTBEAT_MESSAGE);
            }
        }
    }
}
