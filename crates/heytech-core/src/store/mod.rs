//! Reactive device state.
//!
//! [`DeviceState`] holds everything learned from the controller. The line
//! reader is its only writer (through `apply`); every other part of the
//! engine reads snapshots or subscribes to `watch` channels to wait for
//! the next update.

mod apply;
mod collection;

use std::sync::Arc;

use tokio::sync::watch;

use self::collection::Collection;
use crate::model::{
    Channel, ClimateReading, DeviceInfo, Group, JalousieParams, LogbookEntry, RainParams,
    Scenario, ShadingParams, Shutter, ShutterPositions, WindParams,
};

/// Central state store for one controller.
pub struct DeviceState {
    // ── Name stream ──────────────────────────────────────────────────
    /// Keyed by name; renaming a channel replaces its entry.
    pub(crate) shutters: Collection<String, Shutter>,
    pub(crate) scenarios: Collection<u16, Scenario>,
    pub(crate) max_channels: watch::Sender<Option<u16>>,
    pub(crate) discovery_complete: watch::Sender<bool>,

    // ── Live data ────────────────────────────────────────────────────
    pub(crate) positions: watch::Sender<Arc<ShutterPositions>>,
    pub(crate) climate: watch::Sender<Option<Arc<ClimateReading>>>,
    pub(crate) automation: watch::Sender<Option<bool>>,

    // ── Configuration read back from the device ──────────────────────
    pub(crate) groups: Collection<u16, Group>,
    pub(crate) logbook: Collection<u32, LogbookEntry>,
    pub(crate) logbook_count: watch::Sender<Option<u32>>,
    pub(crate) jalousie: Collection<Channel, JalousieParams>,
    pub(crate) shading: Collection<Channel, ShadingParams>,
    pub(crate) wind: Collection<Channel, WindParams>,
    pub(crate) rain: Collection<Channel, RainParams>,
    pub(crate) device_info: watch::Sender<DeviceInfo>,
}

impl DeviceState {
    pub fn new() -> Self {
        Self {
            shutters: Collection::new(),
            scenarios: Collection::new(),
            max_channels: watch::channel(None).0,
            discovery_complete: watch::channel(false).0,
            positions: watch::channel(Arc::new(ShutterPositions::new())).0,
            climate: watch::channel(None).0,
            automation: watch::channel(None).0,
            groups: Collection::new(),
            logbook: Collection::new(),
            logbook_count: watch::channel(None).0,
            jalousie: Collection::new(),
            shading: Collection::new(),
            wind: Collection::new(),
            rain: Collection::new(),
            device_info: watch::channel(DeviceInfo::default()).0,
        }
    }

    // ── Snapshot accessors ───────────────────────────────────────────

    /// Shutters ordered by name.
    pub fn shutters_snapshot(&self) -> Arc<Vec<Arc<Shutter>>> {
        self.shutters.snapshot()
    }

    pub fn shutter_count(&self) -> usize {
        self.shutters.len()
    }

    pub fn scenarios_snapshot(&self) -> Arc<Vec<Arc<Scenario>>> {
        self.scenarios.snapshot()
    }

    pub fn groups_snapshot(&self) -> Arc<Vec<Arc<Group>>> {
        self.groups.snapshot()
    }

    pub fn group(&self, number: u16) -> Option<Arc<Group>> {
        self.groups.get(&number)
    }

    pub fn positions(&self) -> Arc<ShutterPositions> {
        self.positions.borrow().clone()
    }

    pub fn climate(&self) -> Option<Arc<ClimateReading>> {
        self.climate.borrow().clone()
    }

    pub fn automation_status(&self) -> Option<bool> {
        *self.automation.borrow()
    }

    pub fn max_channels(&self) -> Option<u16> {
        *self.max_channels.borrow()
    }

    pub fn is_discovery_complete(&self) -> bool {
        *self.discovery_complete.borrow()
    }

    /// Logbook entries ordered by entry number.
    pub fn logbook_snapshot(&self) -> Arc<Vec<Arc<LogbookEntry>>> {
        self.logbook.snapshot()
    }

    pub fn logbook_count(&self) -> Option<u32> {
        *self.logbook_count.borrow()
    }

    pub fn jalousie_params(&self) -> Arc<Vec<Arc<JalousieParams>>> {
        self.jalousie.snapshot()
    }

    pub fn shading_params(&self) -> Arc<Vec<Arc<ShadingParams>>> {
        self.shading.snapshot()
    }

    pub fn wind_params(&self) -> Arc<Vec<Arc<WindParams>>> {
        self.wind.snapshot()
    }

    pub fn rain_params(&self) -> Arc<Vec<Arc<RainParams>>> {
        self.rain.snapshot()
    }

    pub fn device_info(&self) -> DeviceInfo {
        self.device_info.borrow().clone()
    }

    // ── Subscriptions ────────────────────────────────────────────────

    pub fn subscribe_positions(&self) -> watch::Receiver<Arc<ShutterPositions>> {
        self.positions.subscribe()
    }

    pub fn subscribe_climate(&self) -> watch::Receiver<Option<Arc<ClimateReading>>> {
        self.climate.subscribe()
    }

    pub fn subscribe_automation(&self) -> watch::Receiver<Option<bool>> {
        self.automation.subscribe()
    }

    pub fn subscribe_shutters(&self) -> watch::Receiver<Arc<Vec<Arc<Shutter>>>> {
        self.shutters.subscribe()
    }

    pub fn subscribe_max_channels(&self) -> watch::Receiver<Option<u16>> {
        self.max_channels.subscribe()
    }

    pub fn subscribe_discovery_complete(&self) -> watch::Receiver<bool> {
        self.discovery_complete.subscribe()
    }

    pub fn subscribe_logbook(&self) -> watch::Receiver<Arc<Vec<Arc<LogbookEntry>>>> {
        self.logbook.subscribe()
    }

    pub fn subscribe_logbook_count(&self) -> watch::Receiver<Option<u32>> {
        self.logbook_count.subscribe()
    }

    pub fn subscribe_device_info(&self) -> watch::Receiver<DeviceInfo> {
        self.device_info.subscribe()
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Forget the name stream before a fresh discovery run.
    ///
    /// Positions, climate and configuration survive; they are simply
    /// overwritten by the answers to the discovery batch.
    pub(crate) fn begin_discovery(&self) {
        self.shutters.clear();
        self.scenarios.clear();
        self.max_channels.send_replace(None);
        self.discovery_complete.send_replace(false);
    }
}

impl Default for DeviceState {
    fn default() -> Self {
        Self::new()
    }
}
