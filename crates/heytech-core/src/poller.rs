// ── Periodic poller ──
//
// Keeps positions fresh every `position_poll_interval` and climate plus
// automation status every `climate_poll_interval`. Everything it queues
// goes to the periodic lane, so user commands always overtake it.

use std::sync::atomic::Ordering;

use heytech_api::protocol::query;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::command::{Command, Priority};
use crate::controller::Controller;
use crate::reader::TaskFuture;

impl Controller {
    /// Start the poller after the first successful connect.
    pub(crate) async fn ensure_poller(&self) {
        if !self.inner.config.periodic_polling {
            return;
        }
        if self
            .inner
            .poller_started
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }
        let ctrl = self.clone();
        let cancel = self.inner.cancel.clone();
        self.inner
            .task_handles
            .lock()
            .await
            .push(tokio::spawn(poll_task(ctrl, cancel)));
    }

    fn poll_once(&self, include_climate: bool) {
        let mut batch = vec![Command::query(query::POSITIONS)];
        if include_climate {
            batch.push(Command::query(query::CLIMATE));
            batch.push(Command::query(query::AUTOMATION));
        }
        for command in batch {
            if let Err(e) = self.enqueue(command, Priority::Periodic) {
                debug!(error = %e, "poll skipped");
                return;
            }
        }
    }
}

fn poll_task(controller: Controller, cancel: CancellationToken) -> TaskFuture {
    Box::pin(async move {
        let timings = controller.inner.config.timings.clone();
        let mut interval = tokio::time::interval(timings.position_poll_interval);
        interval.tick().await; // consume the immediate first tick
        let mut last_climate = Instant::now();

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                _ = interval.tick() => {
                    debug!("poll tick");
                    let ready = controller.is_connected() || match controller.connect().await {
                        Ok(()) => true,
                        Err(e) => {
                            warn!(error = %e, "poll skipped, device unreachable");
                            false
                        }
                    };
                    if ready {
                        let include_climate = last_climate.elapsed() >= timings.climate_poll_interval;
                        if include_climate {
                            last_climate = Instant::now();
                        }
                        controller.poll_once(include_climate);
                    }
                }
            }
        }
    })
}
