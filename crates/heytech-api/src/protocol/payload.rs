// ── Decoded frame payloads ──
//
// One variant per frame family. These are plain data; interpreting them
// against the current device state is the router's job.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::Channel;

/// A single typed event decoded from one response line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DeviceEvent {
    /// `sop`: positions of all channels, 0 (closed) to 100 (open).
    PositionsUpdated(BTreeMap<Channel, u8>),
    /// `smn`: one entry of the name stream; the channel may be a shutter or
    /// a scenario pseudo-channel.
    ChannelNamed { channel: Channel, name: String },
    /// `smc`: number of channels configured on the device.
    MaxChannelsKnown(u16),
    /// `skd`: climate sensor readings.
    ClimateUpdated(ClimateReading),
    /// `rgz`: group membership as an explicit channel list.
    GroupChannelsUpdated(GroupMembers),
    /// `sgz`: group membership as per-byte channel bitmasks.
    GroupInfoUpdated(GroupMembers),
    /// `szn` / `rzn`: scenario name. `rzn` frames are authoritative.
    ScenarioNamed {
        number: u16,
        name: String,
        authoritative: bool,
    },
    /// `sau`: whether the device automation is switched on.
    AutomationStatusUpdated(bool),
    /// `sld`: a logbook entry.
    LogbookEntryAdded(LogbookRecord),
    /// `sla`: number of logbook entries stored on the device.
    LogbookCountUpdated(u32),
    /// `sjp`: jalousie tilt parameters of one channel.
    JalousieParamsUpdated(JalousieParams),
    /// `sbp`: shading automation parameters of one channel.
    ShadingParamsUpdated(ShadingParams),
    /// `swp`: wind protection parameters of one channel.
    WindParamsUpdated(WindParams),
    /// `srp`: rain protection parameters of one channel.
    RainParamsUpdated(RainParams),
    /// `smo`: controller model string.
    ModelReported(String),
    /// `sfi`: firmware version string.
    FirmwareReported(String),
}

/// Climate readings. Fields the device reports as `999` are `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClimateReading {
    pub brightness: Option<f64>,
    pub indoor_temperature: Option<f64>,
    pub indoor_temperature_min: Option<f64>,
    pub indoor_temperature_max: Option<f64>,
    pub outdoor_temperature: Option<f64>,
    pub outdoor_temperature_min: Option<f64>,
    pub outdoor_temperature_max: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_speed_max: Option<f64>,
    pub alarm: Option<bool>,
    pub rain: Option<bool>,
    pub brightness_average: Option<f64>,
    pub relative_humidity: Option<f64>,
}

/// Group number and member channels (ascending, without duplicates).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMembers {
    pub number: u16,
    pub channels: Vec<Channel>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogbookRecord {
    pub number: u32,
    pub room: String,
    pub date: String,
    pub time: String,
    pub direction: String,
    pub trigger: String,
}

/// Jalousie (slat tilt) settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JalousieParams {
    pub channel: Channel,
    pub enabled: bool,
    /// Tilt run time in tenths of a second.
    pub tilt_time: u32,
    /// Trailing fields this decoder does not interpret.
    pub extra: Vec<i64>,
}

/// Brightness-driven shading settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShadingParams {
    pub channel: Channel,
    pub enabled: bool,
    pub brightness_threshold: u32,
    pub position: u8,
    pub extra: Vec<i64>,
}

/// Wind protection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindParams {
    pub channel: Channel,
    pub enabled: bool,
    pub wind_threshold: u32,
    pub position: u8,
    pub extra: Vec<i64>,
}

/// Rain protection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RainParams {
    pub channel: Channel,
    pub enabled: bool,
    pub position: u8,
    pub extra: Vec<i64>,
}
