// ── Connection management ──
//
// Owns the single TCP connection. At most one connect attempt runs at a
// time (the `link` mutex), every connection gets its own child
// cancellation token, and the reader/idle tasks spawned for a
// connection only ever tear down that same connection.

use std::future::Future;
use std::sync::atomic::Ordering;
use std::time::Duration;

use heytech_api::protocol::handshake_lines;
use heytech_api::transport::{self, LineWriter};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::controller::Controller;
use crate::error::CoreError;

// ── ConnectionState ──────────────────────────────────────────────

/// Connection state observable by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    /// `stop()` was called; terminal.
    Stopped,
}

/// The live connection: writer half plus the token its tasks listen on.
pub(crate) struct ActiveLink {
    pub(crate) id: u64,
    pub(crate) writer: LineWriter,
    pub(crate) cancel: CancellationToken,
}

/// A command write that failed, with the connection it was written to.
#[derive(Debug)]
pub(crate) struct WriteFailure {
    /// `None` when no connection was open for the first line.
    pub(crate) link: Option<u64>,
    pub(crate) error: heytech_api::Error,
}

// ── Retry helper ─────────────────────────────────────────────────

/// Outcome of [`retry`] when no attempt succeeded.
#[derive(Debug)]
pub(crate) enum RetryError<E> {
    Exhausted { attempts: u32, last: E },
    Cancelled,
}

/// Run `op` until it succeeds: one attempt plus up to `max_retries`
/// retries, `delay` apart. Gives up early once `cancel` fires.
pub(crate) async fn retry<T, E, F, Fut>(
    max_retries: u32,
    delay: Duration,
    cancel: &CancellationToken,
    mut op: F,
) -> Result<T, RetryError<E>>
where
    E: std::fmt::Display,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        let err = match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };
        if attempt > max_retries {
            return Err(RetryError::Exhausted {
                attempts: attempt,
                last: err,
            });
        }
        warn!(attempt, max_retries, error = %err, "attempt failed, retrying");
        tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(RetryError::Cancelled),
            () = tokio::time::sleep(delay) => {}
        }
    }
}

impl Controller {
    // ── Connection lifecycle ─────────────────────────────────────

    /// Open the connection if it is not open yet.
    ///
    /// Retries failed connects, then spawns the line reader and the idle
    /// checker and sends the wake-up handshake. Concurrent callers wait
    /// for the attempt already in progress.
    pub async fn connect(&self) -> Result<(), CoreError> {
        let inner = &self.inner;
        if inner.cancel.is_cancelled() {
            return Err(CoreError::Stopped);
        }

        let mut slot = inner.link.lock().await;
        if slot.is_some() {
            return Ok(());
        }
        if inner.cancel.is_cancelled() {
            return Err(CoreError::Stopped);
        }

        inner
            .connection_state
            .send_replace(ConnectionState::Connecting);
        let target = inner.config.transport();
        let addr = target.addr();
        let timings = &inner.config.timings;
        info!(%addr, "connecting");

        let connected = retry(
            timings.max_retries,
            timings.retry_delay,
            &inner.cancel,
            |attempt| {
                debug!(attempt, "connect attempt");
                transport::connect(&target)
            },
        )
        .await;

        let (reader, mut writer) = match connected {
            Ok(halves) => halves,
            Err(RetryError::Cancelled) => return Err(CoreError::Stopped),
            Err(RetryError::Exhausted { attempts, last }) => {
                inner
                    .connection_state
                    .send_replace(ConnectionState::Disconnected);
                return Err(CoreError::communication(format!(
                    "cannot connect to {addr} after {attempts} attempts: {last}"
                )));
            }
        };

        let id = inner.next_link_id.fetch_add(1, Ordering::Relaxed);
        let cancel = inner.cancel.child_token();

        tokio::spawn(crate::reader::reader_task(
            self.clone(),
            reader,
            id,
            cancel.clone(),
        ));
        tokio::spawn(idle_checker_task(self.clone(), id, cancel.clone()));

        for line in handshake_lines() {
            if let Err(e) = writer.write_line(&line).await {
                cancel.cancel();
                inner
                    .connection_state
                    .send_replace(ConnectionState::Disconnected);
                return Err(CoreError::Connection {
                    addr,
                    reason: format!("handshake failed: {e}"),
                });
            }
            tokio::time::sleep(timings.handshake_delay).await;
        }

        *slot = Some(ActiveLink { id, writer, cancel });
        drop(slot);

        self.touch();
        inner
            .connection_state
            .send_replace(ConnectionState::Connected);
        info!(%addr, link = id, "connected");

        self.ensure_poller().await;
        Ok(())
    }

    /// Close the connection if one is open. Safe to call at any time.
    pub async fn disconnect(&self) {
        let mut slot = self.inner.link.lock().await;
        self.close_link(&mut slot).await;
    }

    /// Close the connection only if it is still connection `id`.
    pub(crate) async fn disconnect_link(&self, id: u64) {
        let mut slot = self.inner.link.lock().await;
        if slot.as_ref().is_some_and(|link| link.id == id) {
            self.close_link(&mut slot).await;
        } else {
            debug!(link = id, "connection already replaced");
        }
    }

    async fn close_link(&self, slot: &mut Option<ActiveLink>) {
        if let Some(mut link) = slot.take() {
            link.cancel.cancel();
            if let Err(e) = link.writer.shutdown().await {
                debug!(error = %e, "socket shutdown failed");
            }
            info!(link = link.id, "disconnected");
        }
        if !self.inner.cancel.is_cancelled() {
            self.inner
                .connection_state
                .send_replace(ConnectionState::Disconnected);
        }
    }

    /// Write the lines of one command, pausing `pacing` after each.
    ///
    /// All lines go to the connection that took the first one. On failure
    /// the error carries that connection's id so the caller can close
    /// exactly that link.
    pub(crate) async fn write_lines(
        &self,
        lines: &[String],
        pacing: Duration,
    ) -> Result<(), WriteFailure> {
        let mut pinned: Option<u64> = None;
        for line in lines {
            {
                let mut slot = self.inner.link.lock().await;
                let link = match slot.as_mut() {
                    Some(link) if pinned.is_none_or(|id| id == link.id) => link,
                    _ => {
                        return Err(WriteFailure {
                            link: pinned,
                            error: heytech_api::Error::NotConnected,
                        });
                    }
                };
                pinned = Some(link.id);
                if let Err(error) = link.writer.write_line(line).await {
                    return Err(WriteFailure {
                        link: pinned,
                        error,
                    });
                }
            }
            self.touch();
            tokio::time::sleep(pacing).await;
        }
        Ok(())
    }

    fn touch(&self) {
        self.inner.last_write.send_replace(Instant::now());
    }

    pub(crate) fn idle_for(&self) -> Duration {
        self.inner.last_write.borrow().elapsed()
    }
}

/// Disconnect once nothing was written for `idle_timeout` and no command
/// is queued or in flight.
async fn idle_checker_task(controller: Controller, id: u64, cancel: CancellationToken) {
    let idle_timeout = controller.inner.config.idle_timeout;
    if idle_timeout.is_zero() {
        return;
    }
    let mut interval = tokio::time::interval(controller.inner.config.timings.idle_check_interval);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                if controller.inner.queue.is_idle() && controller.idle_for() >= idle_timeout {
                    debug!(link = id, ?idle_timeout, "connection idle, disconnecting");
                    controller.disconnect_link(id).await;
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    async fn flaky(failures: u32, max_retries: u32) -> (Result<u32, RetryError<String>>, u32) {
        let calls = AtomicU32::new(0);
        let cancel = CancellationToken::new();
        let result = retry(max_retries, Duration::from_secs(1), &cancel, |attempt| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt <= failures {
                    Err(format!("refused #{attempt}"))
                } else {
                    Ok(attempt)
                }
            }
        })
        .await;
        (result, calls.load(Ordering::SeqCst))
    }

    #[tokio::test(start_paused = true)]
    async fn three_failures_then_success_proceeds() {
        let (result, calls) = flaky(3, 3).await;
        assert_eq!(result.unwrap(), 4);
        assert_eq!(calls, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn fourth_failure_gives_up() {
        let (result, calls) = flaky(4, 3).await;
        match result {
            Err(RetryError::Exhausted { attempts, last }) => {
                assert_eq!(attempts, 4);
                assert_eq!(last, "refused #4");
            }
            other => panic!("expected exhaustion, got {other:?}"),
        }
        assert_eq!(calls, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn retries_are_spaced_by_delay() {
        let start = Instant::now();
        let _ = flaky(2, 3).await;
        assert_eq!(start.elapsed(), Duration::from_secs(2));
    }

    // ── Link ownership ──

    async fn controller_with_listener() -> Controller {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let mut config = crate::EngineConfig::new("127.0.0.1");
        config.port = port;
        config.periodic_polling = false;
        config.timings.handshake_delay = Duration::from_millis(1);
        Controller::new(config)
    }

    async fn link_id(controller: &Controller) -> u64 {
        controller.inner.link.lock().await.as_ref().unwrap().id
    }

    #[tokio::test]
    async fn stale_link_id_leaves_new_connection_open() {
        let controller = controller_with_listener().await;
        controller.connect().await.unwrap();
        let old = link_id(&controller).await;

        controller.disconnect().await;
        controller.connect().await.unwrap();
        assert_ne!(link_id(&controller).await, old);

        controller.disconnect_link(old).await;
        assert!(controller.is_connected());
        controller.stop().await;
    }

    #[tokio::test]
    async fn write_without_connection_names_no_link() {
        let controller = controller_with_listener().await;
        let failure = controller
            .write_lines(&["sop\r\n".to_owned()], Duration::ZERO)
            .await
            .unwrap_err();
        assert_eq!(failure.link, None);
        assert!(matches!(failure.error, heytech_api::Error::NotConnected));
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_stops_retrying() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result: Result<(), RetryError<&str>> =
            retry(3, Duration::from_secs(1), &cancel, |_| async { Err("down") }).await;
        assert!(matches!(result, Err(RetryError::Cancelled)));
    }
}
