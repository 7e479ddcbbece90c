// ── Runtime engine configuration ──
//
// These types describe *how* to talk to one controller. They carry the
// PIN and timing budgets, but never touch disk. The CLI (or any other
// host) builds an `EngineConfig` and hands it in.

use std::time::Duration;

use secrecy::SecretString;

use heytech_api::TransportConfig;
use heytech_api::protocol::DEFAULT_PORT;

use crate::error::CoreError;

/// Fixed delays and budgets used by the engine.
///
/// Every wait in the engine reads from here so tests can shrink them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timings {
    /// Retries after the first failed attempt (connect, send).
    pub max_retries: u32,
    /// Pause between retries.
    pub retry_delay: Duration,
    /// Bound for a single TCP connect.
    pub connect_timeout: Duration,
    /// Pause between handshake lines.
    pub handshake_delay: Duration,
    /// Pause after each line of a user command.
    pub user_pacing: Duration,
    /// Pause after each line of a periodic command.
    pub periodic_pacing: Duration,
    /// How often the idle checker looks at the connection.
    pub idle_check_interval: Duration,
    pub position_poll_interval: Duration,
    pub climate_poll_interval: Duration,
    /// How long discovery waits for the channel count.
    pub max_channels_wait: Duration,
    /// Hard cap for collecting the name stream.
    pub discovery_timeout: Duration,
    /// Sampling period of the shutter-count stability fallback.
    pub stability_interval: Duration,
    /// Unchanged samples needed before the name stream counts as finished.
    pub stability_rounds: u32,
    /// How long a read operation waits for its answer frame.
    pub data_wait: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay: Duration::from_secs(1),
            connect_timeout: Duration::from_secs(5),
            handshake_delay: Duration::from_millis(100),
            user_pacing: Duration::from_millis(20),
            periodic_pacing: Duration::from_millis(50),
            idle_check_interval: Duration::from_secs(1),
            position_poll_interval: Duration::from_secs(120),
            climate_poll_interval: Duration::from_secs(300),
            max_channels_wait: Duration::from_secs(5),
            discovery_timeout: Duration::from_secs(10),
            stability_interval: Duration::from_millis(500),
            stability_rounds: 3,
            data_wait: Duration::from_secs(10),
        }
    }
}

/// Configuration for one controller.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Controller hostname or IP address.
    pub host: String,
    /// TCP port of the command interface.
    pub port: u16,
    /// Optional device PIN; sent before every command when set.
    pub pin: Option<SecretString>,
    /// Disconnect after this long without writes. Zero disables it.
    pub idle_timeout: Duration,
    /// Run the background position/climate poller.
    pub periodic_polling: bool,
    pub timings: Timings,
}

impl EngineConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }

    /// Reject configurations the engine cannot work with.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.host.trim().is_empty() {
            return Err(CoreError::Validation {
                message: "host must not be empty".into(),
            });
        }
        if self.port == 0 {
            return Err(CoreError::Validation {
                message: "port must not be 0".into(),
            });
        }
        if self.timings.position_poll_interval.is_zero()
            || self.timings.climate_poll_interval.is_zero()
        {
            return Err(CoreError::Validation {
                message: "poll intervals must be greater than zero".into(),
            });
        }
        Ok(())
    }

    pub(crate) fn transport(&self) -> TransportConfig {
        TransportConfig {
            host: self.host.clone(),
            port: self.port,
            connect_timeout: self.timings.connect_timeout,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: DEFAULT_PORT,
            pin: None,
            idle_timeout: Duration::from_secs(10),
            periodic_polling: true,
            timings: Timings::default(),
        }
    }
}
