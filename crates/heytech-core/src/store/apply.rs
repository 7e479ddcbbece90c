// ── Frame application logic ──
//
// Folds decoded device events into the DeviceState. Frames carry no
// request correlation, so every event is applied on its own merits:
// later frames overwrite earlier ones, with the exceptions noted below.

use std::sync::Arc;

use heytech_api::protocol::{ChannelKind, GroupMembers};
use heytech_api::DeviceEvent;
use tracing::{debug, info};

use super::DeviceState;
use crate::model::{Group, Scenario, ScenarioSource, Shutter};

impl DeviceState {
    /// Apply one decoded frame.
    pub(crate) fn apply(&self, event: DeviceEvent) {
        match event {
            DeviceEvent::PositionsUpdated(positions) => {
                self.positions.send_replace(Arc::new(positions));
            }
            DeviceEvent::ChannelNamed { channel, name } => match ChannelKind::classify(channel) {
                ChannelKind::Shutter(channel) => self.name_shutter(channel, name),
                ChannelKind::Scenario(number) => {
                    self.name_scenario(number, name, ScenarioSource::NameStream);
                }
            },
            DeviceEvent::MaxChannelsKnown(count) => {
                debug!(count, "channel count reported");
                self.max_channels.send_replace(Some(count));
                self.check_discovery_complete();
            }
            DeviceEvent::ClimateUpdated(reading) => {
                self.climate.send_replace(Some(Arc::new(reading)));
            }
            DeviceEvent::GroupChannelsUpdated(members) | DeviceEvent::GroupInfoUpdated(members) => {
                self.update_group(members);
            }
            DeviceEvent::ScenarioNamed {
                number,
                name,
                authoritative,
            } => {
                let source = if authoritative {
                    ScenarioSource::NameTable
                } else {
                    ScenarioSource::NameStream
                };
                self.name_scenario(number, name, source);
            }
            DeviceEvent::AutomationStatusUpdated(enabled) => {
                self.automation.send_replace(Some(enabled));
            }
            DeviceEvent::LogbookEntryAdded(entry) => {
                self.logbook.upsert(entry.number, entry);
            }
            DeviceEvent::LogbookCountUpdated(count) => {
                // Entries beyond the new count no longer exist on the device.
                self.logbook.retain(|number, _| *number <= count);
                self.logbook_count.send_replace(Some(count));
            }
            DeviceEvent::JalousieParamsUpdated(params) => {
                self.jalousie.upsert(params.channel, params);
            }
            DeviceEvent::ShadingParamsUpdated(params) => {
                self.shading.upsert(params.channel, params);
            }
            DeviceEvent::WindParamsUpdated(params) => {
                self.wind.upsert(params.channel, params);
            }
            DeviceEvent::RainParamsUpdated(params) => {
                self.rain.upsert(params.channel, params);
            }
            DeviceEvent::ModelReported(model) => {
                self.device_info.send_modify(|info| info.model = Some(model));
            }
            DeviceEvent::FirmwareReported(firmware) => {
                self.device_info
                    .send_modify(|info| info.firmware = Some(firmware));
            }
        }
    }

    // ── Private helpers ──────────────────────────────────────────────

    fn name_shutter(&self, channel: u16, name: String) {
        // A renamed channel must not linger under its old name.
        self.shutters
            .retain(|existing, shutter| shutter.channel != channel || *existing == name);
        if self.shutters.upsert(name.clone(), Shutter { name, channel }) {
            self.check_discovery_complete();
        }
    }

    fn name_scenario(&self, number: u16, name: String, source: ScenarioSource) {
        if source == ScenarioSource::NameStream
            && self
                .scenarios
                .get(&number)
                .is_some_and(|s| s.source == ScenarioSource::NameTable)
        {
            return;
        }
        self.scenarios.upsert(
            number,
            Scenario {
                number,
                name,
                source,
            },
        );
    }

    /// Last writer wins on membership; a learned name is kept.
    fn update_group(&self, members: GroupMembers) {
        let GroupMembers { number, channels } = members;
        if channels.is_empty() {
            if self.groups.remove(&number).is_some() {
                debug!(group = number, "group has no members any more");
            }
            return;
        }
        let name = self
            .groups
            .get(&number)
            .map_or_else(|| Group::default_name(number), |g| g.name.clone());
        self.groups.upsert(
            number,
            Group {
                number,
                name,
                channels,
            },
        );
    }

    fn check_discovery_complete(&self) {
        let Some(expected) = self.max_channels() else {
            return;
        };
        let found = self.shutters.len();
        if found >= usize::from(expected) {
            let newly_complete = self.discovery_complete.send_if_modified(|done| {
                let changed = !*done;
                *done = true;
                changed
            });
            if newly_complete {
                info!(found, expected, "all shutter names received");
            }
        }
    }
}
