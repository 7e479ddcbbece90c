//! Domain model for one Heytech controller.
//!
//! Decoded payload types from `heytech-api` are re-exported unchanged;
//! the types defined here are the engine's own view assembled from
//! several frames.

mod device;
mod shutter;

use std::collections::BTreeMap;

pub use device::DeviceInfo;
pub use shutter::{Group, Scenario, ScenarioSource, Shutter};

pub use heytech_api::protocol::{
    Channel, ClimateReading, JalousieParams, RainParams, ShadingParams, WindParams,
};

/// Channel -> position (0 closed, 100 open).
pub type ShutterPositions = BTreeMap<Channel, u8>;

/// One logbook record as stored on the device.
pub type LogbookEntry = heytech_api::protocol::LogbookRecord;
