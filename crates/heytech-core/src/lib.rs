//! Device communication engine for Heytech shutter/climate controllers.
//!
//! This crate sits between `heytech-api` (wire codec + socket) and whatever
//! drives the device (home-automation host, CLI):
//!
//! - **[`Controller`]** — Central facade owning the single TCP connection.
//!   [`connect()`](Controller::connect) opens the socket, sends the wake-up
//!   handshake and spawns the line reader and idle checker. Commands are
//!   enqueued and return immediately; a single dispatcher worker drains
//!   them, user commands first.
//!
//! - **[`DeviceState`]** — Lock-free snapshot store (`DashMap` +
//!   `tokio::sync::watch`). Written only by the line reader as frames
//!   arrive; everyone else reads snapshots or awaits change signals.
//!
//! - **[`Command`]** — Typed device operations, encoded to protocol lines at
//!   enqueue time and queued with a [`Priority`].
//!
//! - **Domain model** ([`model`]) — Shutters, scenarios, groups, climate,
//!   logbook and per-channel automation parameters.

pub mod command;
pub mod config;
pub mod connection;
pub mod controller;
pub mod error;
pub mod model;
pub mod store;

mod discovery;
mod dispatcher;
mod poller;
mod reader;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::{Command, Priority};
pub use config::{EngineConfig, Timings};
pub use connection::ConnectionState;
pub use controller::Controller;
pub use error::CoreError;
pub use store::DeviceState;

pub use model::{
    Channel, ClimateReading, DeviceInfo, Group, JalousieParams, LogbookEntry, RainParams,
    Scenario, ScenarioSource, ShadingParams, Shutter, ShutterPositions, WindParams,
};
