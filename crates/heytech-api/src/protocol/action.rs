use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{FULLY_CLOSED, FULLY_OPEN};
use crate::error::Error;

/// A shutter action as accepted by the engine.
///
/// Parsed from the loose string form used by callers: `open`/`close`/`stop`,
/// a position `0..=100`, or any literal device verb (`sop`, `smn`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Open,
    Close,
    Stop,
    /// Intermediate position. Bounds are normalized to [`Open`](Self::Open)
    /// and [`Close`](Self::Close) during parsing.
    Position(u8),
    /// Literal device verb or raw query, sent as-is.
    Raw(String),
}

impl Action {
    /// The verb line sent to the device for this action (without CRLF).
    pub fn device_verb(&self) -> String {
        match self {
            Self::Open => "up".into(),
            Self::Close => "down".into(),
            Self::Stop => "off".into(),
            Self::Position(p) => p.to_string(),
            Self::Raw(verb) => verb.clone(),
        }
    }
}

impl FromStr for Action {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s {
            "" => Err(Error::InvalidAction {
                action: s.into(),
                reason: "empty action".into(),
            }),
            "open" => Ok(Self::Open),
            "close" => Ok(Self::Close),
            "stop" => Ok(Self::Stop),
            digits if digits.bytes().all(|b| b.is_ascii_digit()) => {
                let value: u32 = digits.parse().map_err(|_| Error::InvalidAction {
                    action: s.into(),
                    reason: "position is not a number".into(),
                })?;
                match u8::try_from(value) {
                    Ok(FULLY_CLOSED) => Ok(Self::Close),
                    Ok(FULLY_OPEN) => Ok(Self::Open),
                    Ok(p) if p < FULLY_OPEN => Ok(Self::Position(p)),
                    _ => Err(Error::InvalidAction {
                        action: s.into(),
                        reason: format!("position must be between {FULLY_CLOSED} and {FULLY_OPEN}"),
                    }),
                }
            }
            verb => Ok(Self::Raw(verb.to_owned())),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => f.write_str("open"),
            Self::Close => f.write_str("close"),
            Self::Stop => f.write_str("stop"),
            Self::Position(p) => write!(f, "{p}"),
            Self::Raw(verb) => f.write_str(verb),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn symbolic_verbs_map_to_device_verbs() {
        assert_eq!("open".parse::<Action>().unwrap().device_verb(), "up");
        assert_eq!("close".parse::<Action>().unwrap().device_verb(), "down");
        assert_eq!("stop".parse::<Action>().unwrap().device_verb(), "off");
    }

    #[test]
    fn position_bounds_alias_to_up_and_down() {
        assert_eq!("0".parse::<Action>().unwrap(), Action::Close);
        assert_eq!("100".parse::<Action>().unwrap(), Action::Open);
        assert_eq!("50".parse::<Action>().unwrap(), Action::Position(50));
        assert_eq!("50".parse::<Action>().unwrap().device_verb(), "50");
    }

    #[test]
    fn out_of_range_position_is_rejected() {
        assert!(matches!(
            "101".parse::<Action>(),
            Err(Error::InvalidAction { .. })
        ));
        assert!("99999999999".parse::<Action>().is_err());
        assert!("".parse::<Action>().is_err());
    }

    #[test]
    fn raw_queries_pass_through() {
        assert_eq!(
            "sop".parse::<Action>().unwrap(),
            Action::Raw("sop".into())
        );
        assert_eq!("smn".parse::<Action>().unwrap().device_verb(), "smn");
    }
}
