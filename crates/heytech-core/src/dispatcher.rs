// ── Command dispatcher ──
//
// A single worker drains the command queue, user lane first. It is
// started on demand by `enqueue()` and exits once both lanes are empty,
// so at most one worker exists at any time.

use std::sync::atomic::Ordering;
use std::time::Duration;

use tracing::{debug, error, warn};

use crate::command::{Priority, QueuedCommand};
use crate::controller::Controller;
use crate::error::CoreError;

impl Controller {
    /// Start the dispatcher unless one is already running.
    pub(crate) fn ensure_dispatcher(&self) {
        if self.claim_dispatcher() {
            tokio::spawn(dispatcher_task(self.clone()));
        }
    }

    fn claim_dispatcher(&self) -> bool {
        self.inner
            .dispatcher_running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Send one command, connecting first if needed.
    ///
    /// Resets and broken pipes are retried; any other write error, or a
    /// spent retry budget, drops the command with an error log.
    async fn dispatch(&self, queued: &QueuedCommand) {
        let timings = &self.inner.config.timings;
        let pacing = match queued.priority {
            Priority::User => timings.user_pacing,
            Priority::Periodic => timings.periodic_pacing,
        };

        let mut attempt = 0;
        let failure = loop {
            attempt += 1;
            let result = self.try_send(queued, pacing).await;
            let err = match result {
                Ok(()) => {
                    debug!(command = %queued.command, "command sent");
                    return;
                }
                Err(CoreError::Stopped) => return,
                Err(e) if !e.is_retryable() => break e,
                Err(e) => e,
            };
            if attempt > timings.max_retries {
                break err;
            }
            warn!(command = %queued.command, attempt, error = %err, "send failed, retrying");
            tokio::time::sleep(timings.retry_delay).await;
        };

        error!(
            command = %queued.command,
            attempts = attempt,
            error = %failure,
            "giving up on command"
        );
    }

    async fn try_send(&self, queued: &QueuedCommand, pacing: Duration) -> Result<(), CoreError> {
        if !self.is_connected() {
            self.connect().await?;
        }
        if let Err(failure) = self.write_lines(&queued.lines, pacing).await {
            if let Some(link) = failure.link {
                self.disconnect_link(link).await;
            }
            if !failure.error.is_transient() {
                warn!(
                    command = %queued.command,
                    error = %failure.error,
                    "write failed, not retrying"
                );
            }
            return Err(failure.error.into());
        }
        Ok(())
    }
}

async fn dispatcher_task(controller: Controller) {
    let cancel = controller.inner.cancel.clone();
    debug!("dispatcher started");

    loop {
        let Some(queued) = controller.inner.queue.pop() else {
            controller
                .inner
                .dispatcher_running
                .store(false, Ordering::Release);
            // An enqueue between the empty pop and the store above saw the
            // flag still set and did not start a worker.
            if controller.inner.queue.has_queued() && controller.claim_dispatcher() {
                continue;
            }
            break;
        };

        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                controller.inner.queue.finish();
                controller.inner.dispatcher_running.store(false, Ordering::Release);
                break;
            }
            () = controller.dispatch(&queued) => {}
        }
        controller.inner.queue.finish();
    }
    debug!("dispatcher idle");
}
