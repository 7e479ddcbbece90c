// ── Controller abstraction ──
//
// Full lifecycle management for one Heytech controller: command
// queueing, connection ownership, background polling and reactive
// state access through the DeviceState.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64};
use std::time::Duration;

use heytech_api::protocol::{Action, Channel, query};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::command::{Command, CommandQueue, Priority, QueuedCommand};
use crate::config::EngineConfig;
use crate::connection::{ActiveLink, ConnectionState};
use crate::error::CoreError;
use crate::model::{
    ClimateReading, DeviceInfo, Group, LogbookEntry, Scenario, Shutter, ShutterPositions,
};
use crate::store::DeviceState;

// ── Controller ───────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<ControllerInner>`. Owns the single TCP
/// connection to the device, the two-priority command queue and the
/// background tasks feeding [`DeviceState`].
///
/// Commands may be enqueued at any time; the first command (or an
/// explicit [`connect()`](Self::connect)) opens the connection. Must be
/// used from within a Tokio runtime.
#[derive(Clone)]
pub struct Controller {
    pub(crate) inner: Arc<ControllerInner>,
}

pub(crate) struct ControllerInner {
    pub(crate) config: EngineConfig,
    pub(crate) store: Arc<DeviceState>,
    pub(crate) connection_state: watch::Sender<ConnectionState>,
    /// Engine-wide token; cancelled once by `stop()`.
    pub(crate) cancel: CancellationToken,
    /// The live connection. Locking it also serializes connect attempts.
    pub(crate) link: Mutex<Option<ActiveLink>>,
    pub(crate) next_link_id: AtomicU64,
    /// Time of the last successful write, read by the idle checker.
    pub(crate) last_write: watch::Sender<Instant>,
    pub(crate) queue: CommandQueue,
    pub(crate) dispatcher_running: AtomicBool,
    pub(crate) poller_started: AtomicBool,
    pub(crate) task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Controller {
    /// Create a new Controller from configuration. Does NOT connect.
    pub fn new(config: EngineConfig) -> Self {
        let (connection_state, _) = watch::channel(ConnectionState::Disconnected);
        let (last_write, _) = watch::channel(Instant::now());

        Self {
            inner: Arc::new(ControllerInner {
                config,
                store: Arc::new(DeviceState::new()),
                connection_state,
                cancel: CancellationToken::new(),
                link: Mutex::new(None),
                next_link_id: AtomicU64::new(1),
                last_write,
                queue: CommandQueue::new(),
                dispatcher_running: AtomicBool::new(false),
                poller_started: AtomicBool::new(false),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Access the engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    /// Access the underlying DeviceState.
    pub fn store(&self) -> &Arc<DeviceState> {
        &self.inner.store
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Stop the engine for good.
    ///
    /// Cancels every background task, drops queued commands and closes
    /// the connection. Later commands fail with [`CoreError::Stopped`].
    pub async fn stop(&self) {
        if self.inner.cancel.is_cancelled() {
            return;
        }
        self.inner.cancel.cancel();

        let dropped = self.inner.queue.clear();
        if dropped > 0 {
            debug!(dropped, "discarded queued commands on stop");
        }

        self.disconnect().await;

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }

        self.inner
            .connection_state
            .send_replace(ConnectionState::Stopped);
        info!("engine stopped");
    }

    pub fn is_stopped(&self) -> bool {
        self.inner.cancel.is_cancelled()
    }

    // ── Command submission ───────────────────────────────────────

    /// Queue a command. Returns as soon as it is queued.
    pub fn enqueue(&self, command: Command, priority: Priority) -> Result<(), CoreError> {
        if self.is_stopped() {
            return Err(CoreError::Stopped);
        }
        let lines = command.encode(self.inner.config.pin.as_ref());
        debug!(%command, %priority, lines = lines.len(), "command queued");
        self.inner.queue.push(QueuedCommand {
            command,
            priority,
            lines,
        });
        self.ensure_dispatcher();
        Ok(())
    }

    /// Queue a command with user priority.
    pub fn execute(&self, command: Command) -> Result<(), CoreError> {
        self.enqueue(command, Priority::User)
    }

    /// Queue a shutter action given in its loose string form.
    ///
    /// `action` is `open`, `close`, `stop`, a position `0..=100` or a raw
    /// device verb. With no channels the verb is sent unscoped.
    pub fn enqueue_user_command(&self, action: &str, channels: &[Channel]) -> Result<(), CoreError> {
        let action: Action = action.parse()?;
        if channels.contains(&0) {
            return Err(CoreError::Validation {
                message: "channel numbers start at 1".into(),
            });
        }
        self.execute(Command::Move {
            action,
            channels: channels.to_vec(),
        })
    }

    /// Activate a stored scenario.
    pub fn activate_scenario(&self, number: u16) -> Result<(), CoreError> {
        if number == 0 {
            return Err(CoreError::Validation {
                message: "scenario numbers start at 1".into(),
            });
        }
        self.execute(Command::ActivateScenario(number))
    }

    /// Move every channel of a known group.
    pub fn control_group(&self, number: u16, action: &str) -> Result<(), CoreError> {
        let group = self
            .inner
            .store
            .group(number)
            .ok_or_else(|| CoreError::NotFound {
                entity_type: "group".into(),
                identifier: number.to_string(),
            })?;
        let action: Action = action.parse()?;
        self.execute(Command::Move {
            action,
            channels: group.channels.clone(),
        })
    }

    /// Set the device clock to the local wall-clock time.
    pub fn sync_time(&self) -> Result<(), CoreError> {
        let now = chrono::Local::now().naive_local();
        info!(%now, "syncing device clock");
        self.execute(Command::SyncTime(now))
    }

    /// Erase the device logbook and re-read its (now zero) size.
    pub fn clear_logbook(&self) -> Result<(), CoreError> {
        self.execute(Command::Batch(vec![
            Command::ClearLogbook,
            Command::query(query::LOGBOOK_COUNT),
        ]))
    }

    /// Connect and send the connection test query.
    pub async fn test_connection(&self) -> Result<(), CoreError> {
        self.connect().await?;
        self.execute(Command::query(query::TEST))
    }

    /// Wait until every queued command has been sent or given up.
    ///
    /// Used by one-shot callers that stop the engine right after queueing.
    pub async fn flush(&self, limit: Duration) -> Result<(), CoreError> {
        tokio::time::timeout(limit, self.inner.queue.wait_idle())
            .await
            .map_err(|_| {
                CoreError::communication(format!(
                    "commands still pending after {}s",
                    limit.as_secs()
                ))
            })
    }

    // ── Data reads ───────────────────────────────────────────────

    /// Ask for fresh positions and wait for the answer.
    ///
    /// Falls back to the last known positions when the device does not
    /// answer in time.
    pub async fn read_positions(&self) -> Result<Arc<ShutterPositions>, CoreError> {
        let rx = self.inner.store.subscribe_positions();
        let positions = self
            .request_and_wait(rx, Command::query(query::POSITIONS), "positions")
            .await?;
        if positions.is_empty() {
            return Err(CoreError::communication("no shutter positions received"));
        }
        Ok(positions)
    }

    pub async fn read_climate(&self) -> Result<Arc<ClimateReading>, CoreError> {
        let rx = self.inner.store.subscribe_climate();
        self.request_and_wait(rx, Command::query(query::CLIMATE), "climate")
            .await?
            .ok_or_else(|| CoreError::communication("no climate data received"))
    }

    pub async fn read_automation_status(&self) -> Result<bool, CoreError> {
        let rx = self.inner.store.subscribe_automation();
        self.request_and_wait(rx, Command::query(query::AUTOMATION), "automation status")
            .await?
            .ok_or_else(|| CoreError::communication("no automation status received"))
    }

    /// Ask for the model name and firmware version.
    pub async fn read_device_info(&self) -> Result<DeviceInfo, CoreError> {
        let mut rx = self.inner.store.subscribe_device_info();
        rx.borrow_and_update();
        self.execute(Command::Batch(vec![
            Command::query(query::MODEL),
            Command::query(query::FIRMWARE),
        ]))?;

        let complete = |info: &DeviceInfo| info.model.is_some() && info.firmware.is_some();
        if tokio::time::timeout(self.inner.config.timings.data_wait, rx.wait_for(complete))
            .await
            .is_err()
        {
            warn!("timed out waiting for device information");
        }

        let info = self.inner.store.device_info();
        if info.model.is_none() && info.firmware.is_none() {
            return Err(CoreError::communication("no device information received"));
        }
        Ok(info)
    }

    /// Read up to `max_entries` logbook entries, oldest first.
    pub async fn read_logbook(&self, max_entries: u32) -> Result<Vec<LogbookEntry>, CoreError> {
        let rx = self.inner.store.subscribe_logbook_count();
        let count = self
            .request_and_wait(rx, Command::query(query::LOGBOOK_COUNT), "logbook count")
            .await?
            .ok_or_else(|| CoreError::communication("no logbook size received"))?;

        let wanted = count.min(max_entries);
        if wanted == 0 {
            return Ok(Vec::new());
        }

        let mut rx = self.inner.store.subscribe_logbook();
        rx.borrow_and_update();
        self.execute(Command::Batch(
            (1..=wanted).map(Command::ReadLogbookEntry).collect(),
        ))?;

        let have_all = |entries: &Arc<Vec<Arc<LogbookEntry>>>| {
            let numbers: BTreeSet<u32> = entries.iter().map(|e| e.number).collect();
            (1..=wanted).all(|n| numbers.contains(&n))
        };
        let wait = rx.wait_for(have_all);
        if tokio::time::timeout(self.inner.config.timings.data_wait, wait)
            .await
            .is_err()
        {
            warn!(wanted, "timed out waiting for logbook entries");
        }

        let entries: Vec<LogbookEntry> = self
            .inner
            .store
            .logbook_snapshot()
            .iter()
            .filter(|e| e.number <= wanted)
            .map(|e| (**e).clone())
            .collect();
        Ok(entries)
    }

    /// Enqueue `command` and wait for the next update on `rx`.
    ///
    /// Times out to whatever value is current.
    async fn request_and_wait<T: Clone>(
        &self,
        mut rx: watch::Receiver<T>,
        command: Command,
        what: &'static str,
    ) -> Result<T, CoreError> {
        rx.borrow_and_update();
        self.execute(command)?;

        match tokio::time::timeout(self.inner.config.timings.data_wait, rx.changed()).await {
            Ok(Ok(())) => {}
            Ok(Err(_)) => return Err(CoreError::Stopped),
            Err(_) => warn!(what, "timed out waiting for data, using last known value"),
        }
        let value = rx.borrow().clone();
        Ok(value)
    }

    // ── State observation ────────────────────────────────────────

    /// Subscribe to connection state changes.
    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.connection_state.subscribe()
    }

    pub fn is_connected(&self) -> bool {
        *self.inner.connection_state.borrow() == ConnectionState::Connected
    }

    pub fn positions(&self) -> Arc<ShutterPositions> {
        self.inner.store.positions()
    }

    pub fn climate(&self) -> Option<Arc<ClimateReading>> {
        self.inner.store.climate()
    }

    pub fn automation_status(&self) -> Option<bool> {
        self.inner.store.automation_status()
    }

    pub fn shutters_snapshot(&self) -> Arc<Vec<Arc<Shutter>>> {
        self.inner.store.shutters_snapshot()
    }

    pub fn scenarios_snapshot(&self) -> Arc<Vec<Arc<Scenario>>> {
        self.inner.store.scenarios_snapshot()
    }

    pub fn groups_snapshot(&self) -> Arc<Vec<Arc<Group>>> {
        self.inner.store.groups_snapshot()
    }

    pub fn max_channels(&self) -> Option<u16> {
        self.inner.store.max_channels()
    }

    pub fn device_info(&self) -> DeviceInfo {
        self.inner.store.device_info()
    }
}
