// ── Line reader / router ──
//
// One task per connection. Every received line goes through the frame
// decoder; decoded events are applied to the DeviceState, everything
// else is dropped. This task is the only writer of device state.

use std::future::Future;
use std::pin::Pin;

use heytech_api::{LineReader, decode};
use tokio_util::sync::CancellationToken;
use tracing::{info, trace, warn};

use crate::controller::Controller;

/// A spawned background task.
///
/// Boxed because these tasks call back into `connect()`, which spawns
/// them in turn.
pub(crate) type TaskFuture = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

pub(crate) fn reader_task(
    controller: Controller,
    mut reader: LineReader,
    link: u64,
    cancel: CancellationToken,
) -> TaskFuture {
    Box::pin(async move {
        loop {
            let next = tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                next = reader.next_line() => next,
            };

            match next {
                Ok(Some(line)) => {
                    if let Some(event) = decode(&line) {
                        controller.inner.store.apply(event);
                    } else {
                        trace!(%line, "ignoring line");
                    }
                }
                Ok(None) => {
                    info!(link, "device closed the connection");
                    controller.disconnect_link(link).await;
                    break;
                }
                Err(e) => {
                    warn!(link, error = %e, "connection lost while reading");
                    controller.disconnect_link(link).await;

                    // The link token is cancelled by now; wait on the engine's.
                    let engine = controller.inner.cancel.clone();
                    tokio::select! {
                        biased;
                        () = engine.cancelled() => break,
                        () = tokio::time::sleep(controller.inner.config.timings.retry_delay) => {}
                    }
                    // A successful reconnect starts its own reader.
                    if let Err(e) = controller.connect().await {
                        warn!(error = %e, "reconnect after read failure failed");
                    }
                    break;
                }
            }
        }
    })
}
