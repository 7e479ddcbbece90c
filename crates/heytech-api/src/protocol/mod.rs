//! Heytech line protocol: command encoding and framed-response decoding.
//!
//! Requests are bare verbs or verb/argument line pairs terminated by CRLF.
//! Responses are self-framed as `start_<tag><payload>ende_<tag>` and carry
//! no request correlation, so every decoded frame is an independent
//! [`DeviceEvent`].
//!
//! Everything in this module is pure: no I/O, no state beyond constants.

mod action;
mod decode;
mod encode;
mod payload;

pub use action::Action;
pub use decode::{DecodeError, decode, decode_frame};
pub use encode::{
    encode, encode_clear_logbook, encode_logbook_entry, encode_query, encode_scenario,
    encode_time_sync, handshake_lines,
};
pub use payload::{
    ClimateReading, DeviceEvent, GroupMembers, JalousieParams, LogbookRecord, RainParams,
    ShadingParams, WindParams,
};

use serde::{Deserialize, Serialize};

/// Default TCP port of the controller's command interface.
pub const DEFAULT_PORT: u16 = 1002;

/// Line terminator expected by the firmware.
pub const LINE_END: &str = "\r\n";

/// Position value of a fully closed shutter.
pub const FULLY_CLOSED: u8 = 0;

/// Position value of a fully open shutter.
pub const FULLY_OPEN: u8 = 100;

/// Channels above this number are scenario pseudo-channels.
pub const SCENARIO_CHANNEL_OFFSET: u16 = 64;

/// Climate fields carrying this value are not fitted on the device.
pub const ABSENT_SENTINEL: &str = "999";

/// A motor/shutter channel (1-based).
pub type Channel = u16;

/// What a named channel from the name stream actually addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelKind {
    /// A physical shutter motor.
    Shutter(Channel),
    /// A stored scenario, numbered from 1.
    Scenario(u16),
}

impl ChannelKind {
    /// Classify a channel number: `1..=64` are shutters, `65..` scenarios.
    pub fn classify(channel: Channel) -> Self {
        if channel > SCENARIO_CHANNEL_OFFSET {
            Self::Scenario(channel - SCENARIO_CHANNEL_OFFSET)
        } else {
            Self::Shutter(channel)
        }
    }
}

/// Query verbs understood by the firmware.
pub mod query {
    pub const POSITIONS: &str = "sop";
    pub const NAMES: &str = "smn";
    pub const MAX_CHANNELS: &str = "smc";
    pub const CLIMATE: &str = "skd";
    pub const AUTOMATION: &str = "sau";
    pub const GROUPS: &str = "sgz";
    pub const LOGBOOK_COUNT: &str = "sla";
    pub const JALOUSIE_PARAMS: &str = "sjp";
    pub const SHADING_PARAMS: &str = "sbp";
    pub const WIND_PARAMS: &str = "swp";
    pub const RAIN_PARAMS: &str = "srp";
    pub const MODEL: &str = "smo";
    pub const FIRMWARE: &str = "sfi";
    pub const TEST: &str = "sti";
}
