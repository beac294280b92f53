//! Drive a pipeline future while consuming its progress events.
//!
//! The download pass reports progress over an unbounded channel. Frontends
//! need to render those events while the pass runs and still see the final
//! ones after it returns.

use std::future::Future;

use tokio::sync::mpsc;
use tokio::time::{Duration, Instant};

/// Upper bound on draining leftover events once the task has finished.
/// Guards against a leaked sender keeping the channel open forever.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Run `task` to completion, passing every event on `event_rx` to `on_event`.
///
/// Returns the task's output once the channel is drained (or the drain
/// timeout expires).
pub async fn run_with_events<F, E, R>(
    task: F,
    mut event_rx: mpsc::UnboundedReceiver<E>,
    mut on_event: impl FnMut(E),
) -> R
where
    F: Future<Output = R>,
{
    tokio::pin!(task);

    let result = loop {
        tokio::select! {
            r = &mut task => break Some(r),
            event = event_rx.recv() => match event {
                Some(e) => on_event(e),
                None => break None,
            },
        }
    };

    let Some(result) = result else {
        log::debug!("run_with_events: channel closed before task finished");
        return task.await;
    };

    let deadline = Instant::now() + DRAIN_TIMEOUT;
    loop {
        match tokio::time::timeout_at(deadline, event_rx.recv()).await {
            Ok(Some(e)) => on_event(e),
            Ok(None) => break,
            Err(_) => {
                log::warn!(
                    "run_with_events: drain timed out after {}s",
                    DRAIN_TIMEOUT.as_secs()
                );
                break;
            }
        }
    }

    result
}
