// ── Command system ──
//
// Typed device operations. A `Command` is encoded into protocol lines
// when it is enqueued (so the PIN in effect at that moment applies) and
// then waits in the two-priority queue until the dispatcher sends it.

mod queue;

use std::fmt;

use chrono::NaiveDateTime;
use secrecy::SecretString;

use heytech_api::protocol::{
    Action, Channel, encode, encode_clear_logbook, encode_logbook_entry, encode_query,
    encode_scenario, encode_time_sync,
};

pub(crate) use queue::{CommandQueue, QueuedCommand};

/// Which queue a command goes to.
///
/// User commands always leave before periodic ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Priority {
    User,
    Periodic,
}

/// A device operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Move shutters (hand-control bracket per channel).
    Move {
        action: Action,
        channels: Vec<Channel>,
    },
    /// A bare query verb such as `sop`.
    Query(String),
    ActivateScenario(u16),
    /// Set the device clock.
    SyncTime(NaiveDateTime),
    ReadLogbookEntry(u32),
    ClearLogbook,
    /// Several commands sent back to back as one queue entry.
    Batch(Vec<Command>),
}

impl Command {
    pub fn query(verb: impl Into<String>) -> Self {
        Self::Query(verb.into())
    }

    /// Encode into CRLF-terminated protocol lines.
    pub fn encode(&self, pin: Option<&SecretString>) -> Vec<String> {
        match self {
            Self::Move { action, channels } => encode(action, channels, pin),
            Self::Query(verb) => encode_query(verb, pin),
            Self::ActivateScenario(number) => encode_scenario(*number, pin),
            Self::SyncTime(now) => encode_time_sync(now, pin),
            Self::ReadLogbookEntry(number) => encode_logbook_entry(*number, pin),
            Self::ClearLogbook => encode_clear_logbook(pin),
            Self::Batch(commands) => commands.iter().flat_map(|c| c.encode(pin)).collect(),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Move { action, channels } => write!(f, "{action} {channels:?}"),
            Self::Query(verb) => write!(f, "query {verb}"),
            Self::ActivateScenario(number) => write!(f, "scenario {number}"),
            Self::SyncTime(now) => write!(f, "time sync {now}"),
            Self::ReadLogbookEntry(number) => write!(f, "logbook entry {number}"),
            Self::ClearLogbook => f.write_str("clear logbook"),
            Self::Batch(commands) => write!(f, "batch of {}", commands.len()),
        }
    }
}
