// heytech-api: wire codec and TCP line transport for Heytech shutter controllers

pub mod error;
pub mod protocol;
pub mod transport;

pub use error::Error;
pub use protocol::{
    Action, Channel, ChannelKind, ClimateReading, DecodeError, DeviceEvent, GroupMembers,
    JalousieParams, LogbookRecord, RainParams, ShadingParams, WindParams, decode,
};
pub use transport::{LineReader, LineWriter, TransportConfig};
