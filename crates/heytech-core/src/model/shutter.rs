// ── Shutter, scenario and group types ──

use serde::{Deserialize, Serialize};

use super::Channel;

/// A named shutter motor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shutter {
    pub name: String,
    pub channel: Channel,
}

/// Where a scenario name came from.
///
/// Names from the scenario name table override names seen in the
/// channel name stream, never the other way round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScenarioSource {
    #[default]
    NameStream,
    NameTable,
}

/// A stored scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub number: u16,
    pub name: String,
    #[serde(skip)]
    pub source: ScenarioSource,
}

/// A group of channels that can be moved together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub number: u16,
    pub name: String,
    /// Member channels, ascending.
    pub channels: Vec<Channel>,
}

impl Group {
    pub(crate) fn default_name(number: u16) -> String {
        format!("Group {number}")
    }
}
