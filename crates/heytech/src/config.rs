//! CLI-owned configuration: TOML profiles, PIN resolution, and
//! translation to `heytech_core::EngineConfig`.
//!
//! Core never sees these types -- it receives a pre-built `EngineConfig`.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use heytech_core::EngineConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── TOML config structs ──────────────────────────────────────────────

/// CLI-owned TOML configuration. Core never touches this type.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name (used when --profile is not specified).
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named controller profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    /// Seconds to wait for device answers when --timeout is not given.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    10
}

/// One controller on the network.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Host name or IP address of the controller.
    pub host: Option<String>,

    /// TCP port; the device listens on 1002 unless reconfigured.
    pub port: Option<u16>,

    /// Device PIN (plaintext -- prefer pin_env).
    pub pin: Option<String>,

    /// Environment variable name containing the PIN.
    pub pin_env: Option<String>,

    /// Seconds without traffic before the connection is dropped.
    pub idle_timeout: Option<u64>,
}

// ── Config file path ─────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "heytech", "heytech").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("heytech");
    p
}

// ── Config loading ───────────────────────────────────────────────────

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, CliError> {
    let path = config_path();

    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .merge(Env::prefixed("HEYTECH_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file is missing or unreadable.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

/// Write the config back to its file, creating the directory if needed.
pub fn save_config(cfg: &Config) -> Result<(), CliError> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(&path, toml_str)?;
    Ok(())
}

// ── Profile resolution ───────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Translate the active profile + global flags into an `EngineConfig`.
///
/// This is the single boundary where CLI config types cross into core
/// types. Flags and `HEYTECH_*` variables win over profile values.
pub fn resolve_engine_config(cfg: &Config, global: &GlobalOpts) -> Result<EngineConfig, CliError> {
    let profile_name = active_profile_name(global, cfg);
    let profile = match cfg.profiles.get(&profile_name) {
        Some(profile) => Some(profile),
        // An explicitly requested profile must exist.
        None if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: available_profiles(cfg),
            });
        }
        None => None,
    };

    // 1. Host (flag > env > profile)
    let host = global
        .host
        .clone()
        .or_else(|| profile.and_then(|p| p.host.clone()))
        .ok_or_else(|| CliError::NoHost {
            path: config_path().display().to_string(),
        })?;

    let mut config = EngineConfig::new(host);

    // 2. Port
    if let Some(port) = global.port.or_else(|| profile.and_then(|p| p.port)) {
        config.port = port;
    }

    // 3. PIN
    config.pin = resolve_pin(profile, global);

    // 4. Timeouts
    if let Some(secs) = profile.and_then(|p| p.idle_timeout) {
        config.idle_timeout = Duration::from_secs(secs);
    }
    let wait = global.timeout.unwrap_or(cfg.defaults.timeout);
    config.timings.data_wait = Duration::from_secs(wait);

    // One-shot invocations never need the background poller.
    config.periodic_polling = false;

    config.validate()?;
    Ok(config)
}

/// PIN from the credential chain: flag or `HEYTECH_PIN`, then the
/// profile's `pin_env` variable, then the plaintext profile value.
fn resolve_pin(profile: Option<&Profile>, global: &GlobalOpts) -> Option<SecretString> {
    if let Some(ref pin) = global.pin {
        return Some(SecretString::from(pin.clone()));
    }
    let profile = profile?;
    if let Some(ref env_name) = profile.pin_env {
        if let Ok(val) = std::env::var(env_name) {
            return Some(SecretString::from(val));
        }
    }
    profile.pin.clone().map(SecretString::from)
}

pub fn available_profiles(cfg: &Config) -> String {
    if cfg.profiles.is_empty() {
        "(none)".into()
    } else {
        cfg.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}
