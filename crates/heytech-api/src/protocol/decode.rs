// ── Frame decoding ──
//
// A response line is `start_<tag><payload>ende_<tag>`. The tag is looked up
// once in `FRAMES`; the matching parser turns the interior payload into a
// `DeviceEvent`. Unknown tags are ignored, malformed payloads are logged
// and dropped. Nothing in here returns an error to the line router.

use std::collections::BTreeMap;
use std::str::FromStr;

use thiserror::Error;
use tracing::{debug, trace, warn};

use super::payload::{
    ClimateReading, DeviceEvent, GroupMembers, JalousieParams, LogbookRecord, RainParams,
    ShadingParams, WindParams,
};
use super::{ABSENT_SENTINEL, Channel, FULLY_OPEN, SCENARIO_CHANNEL_OFFSET};

const START_PREFIX: &str = "start_";
const END_PREFIX: &str = "ende_";
const TAG_LEN: usize = 3;
const CLIMATE_FIELDS: usize = 16;
const LOGBOOK_FIELDS: usize = 6;

/// Why a frame payload could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("{tag}: empty payload")]
    Empty { tag: &'static str },

    #[error("{tag}: expected at least {expected} fields, got {got}")]
    FieldCount {
        tag: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("{tag}: field {field} is not a valid number: '{value}'")]
    InvalidNumber {
        tag: &'static str,
        field: usize,
        value: String,
    },

    #[error("{tag}: invalid channel or index '{value}'")]
    InvalidChannel { tag: &'static str, value: String },

    #[error("{tag}: channel mask sets bits beyond channel {max}")]
    MaskOverflow { tag: &'static str, max: Channel },
}

type Parser = fn(&'static str, &str) -> Result<DeviceEvent, DecodeError>;

struct FrameSpec {
    tag: &'static str,
    parse: Parser,
    /// The firmware sometimes drops the `start_` marker on this frame.
    bare_allowed: bool,
}

const fn frame(tag: &'static str, parse: Parser) -> FrameSpec {
    FrameSpec {
        tag,
        parse,
        bare_allowed: false,
    }
}

static FRAMES: &[FrameSpec] = &[
    FrameSpec {
        tag: "sop",
        parse: parse_positions,
        bare_allowed: true,
    },
    frame("smn", parse_channel_name),
    frame("smc", parse_max_channels),
    frame("skd", parse_climate),
    frame("szn", parse_scenario_name),
    frame("rzn", parse_scenario_name),
    frame("sau", parse_automation),
    frame("rgz", parse_group_list),
    frame("sgz", parse_group_mask),
    frame("sld", parse_logbook_entry),
    frame("sla", parse_logbook_count),
    frame("sjp", parse_jalousie),
    frame("sbp", parse_shading),
    frame("swp", parse_wind),
    frame("srp", parse_rain),
    frame("smo", parse_model),
    frame("sfi", parse_firmware),
];

fn lookup(tag: &str) -> Option<&'static FrameSpec> {
    FRAMES.iter().find(|spec| spec.tag == tag)
}

/// Decode one received line.
///
/// Returns `None` for lines that are not frames, frames with unknown tags,
/// and malformed payloads (the latter are logged at `warn`).
pub fn decode(line: &str) -> Option<DeviceEvent> {
    match decode_frame(line)? {
        Ok(event) => Some(event),
        Err(e) => {
            warn!(error = %e, line = line.trim(), "dropping malformed frame");
            None
        }
    }
}

/// Like [`decode`], but hands back the payload error instead of logging it.
///
/// The outer `None` means "not a known frame".
pub fn decode_frame(line: &str) -> Option<Result<DeviceEvent, DecodeError>> {
    let line = line.trim();
    let (spec, payload) = locate_frame(line)?;
    Some((spec.parse)(spec.tag, payload))
}

/// Find the frame spec and the payload between the markers.
fn locate_frame(line: &str) -> Option<(&'static FrameSpec, &str)> {
    if let Some(start) = line.find(START_PREFIX) {
        let tag_start = start + START_PREFIX.len();
        let body_start = tag_start + TAG_LEN;
        let tag = line.get(tag_start..body_start)?;
        let Some(spec) = lookup(tag) else {
            trace!(tag, "ignoring unknown frame");
            return None;
        };
        let end = line.rfind(&format!("{END_PREFIX}{tag}"))?;
        let payload = line.get(body_start..end)?;
        return Some((spec, payload));
    }

    let end = line.find(END_PREFIX)?;
    let tag_start = end + END_PREFIX.len();
    let tag = line.get(tag_start..tag_start + TAG_LEN)?;
    let spec = lookup(tag).filter(|spec| spec.bare_allowed)?;
    debug!(tag, "frame without start marker");
    // The truncated form may keep the separator of a lost leading field.
    Some((spec, line.get(..end)?.trim_start_matches(',')))
}

// ── Field helpers ────────────────────────────────────────────────────

/// Split a payload on `sep`, dropping the single terminator the firmware
/// appends after the last field.
fn fields(payload: &str, sep: char) -> Vec<&str> {
    let body = payload.trim();
    let body = body.strip_suffix(sep).unwrap_or(body);
    if body.is_empty() {
        return Vec::new();
    }
    body.split(sep).map(str::trim).collect()
}

fn require(tag: &'static str, fields: &[&str], expected: usize) -> Result<(), DecodeError> {
    if fields.len() < expected {
        return Err(DecodeError::FieldCount {
            tag,
            expected,
            got: fields.len(),
        });
    }
    Ok(())
}

/// Parse a numeric field; an empty field reads as zero.
fn number<T>(tag: &'static str, field: usize, raw: &str) -> Result<T, DecodeError>
where
    T: FromStr + Default,
{
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(T::default());
    }
    raw.parse().map_err(|_| DecodeError::InvalidNumber {
        tag,
        field,
        value: raw.to_owned(),
    })
}

fn channel(tag: &'static str, raw: &str) -> Result<Channel, DecodeError> {
    match raw.trim().parse::<Channel>() {
        Ok(ch) if ch > 0 => Ok(ch),
        _ => Err(DecodeError::InvalidChannel {
            tag,
            value: raw.trim().to_owned(),
        }),
    }
}

/// Numeric payload of a parameter block: channel first, then values.
fn parameter_block(
    tag: &'static str,
    payload: &str,
    expected: usize,
) -> Result<(Channel, Vec<i64>), DecodeError> {
    let parts = fields(payload, ',');
    require(tag, &parts, expected)?;
    let ch = channel(tag, parts[0])?;
    let values = parts[1..]
        .iter()
        .enumerate()
        .map(|(i, raw)| number::<i64>(tag, i + 1, raw))
        .collect::<Result<Vec<_>, _>>()?;
    Ok((ch, values))
}

fn value_as<T: TryFrom<i64>>(tag: &'static str, field: usize, value: i64) -> Result<T, DecodeError> {
    T::try_from(value).map_err(|_| DecodeError::InvalidNumber {
        tag,
        field,
        value: value.to_string(),
    })
}

fn bounded_position(tag: &'static str, field: usize, value: i64) -> Result<u8, DecodeError> {
    let p: u8 = value_as(tag, field, value)?;
    if p > FULLY_OPEN {
        return Err(DecodeError::InvalidNumber {
            tag,
            field,
            value: value.to_string(),
        });
    }
    Ok(p)
}

// ── Parsers ──────────────────────────────────────────────────────────

fn parse_positions(tag: &'static str, payload: &str) -> Result<DeviceEvent, DecodeError> {
    let parts = fields(payload, ',');
    if parts.is_empty() {
        return Err(DecodeError::Empty { tag });
    }

    let mut positions = BTreeMap::new();
    for (idx, raw) in parts.iter().enumerate() {
        let Some(ch) = Channel::try_from(idx + 1)
            .ok()
            .filter(|ch| *ch <= SCENARIO_CHANNEL_OFFSET)
        else {
            debug!(fields = parts.len(), "ignoring positions beyond the shutter range");
            break;
        };

        let value = if raw.is_empty() {
            debug!(channel = ch, "empty position, assuming 0");
            0
        } else {
            match raw.parse::<i64>() {
                Ok(v) => u8::try_from(v)
                    .ok()
                    .filter(|p| *p <= FULLY_OPEN)
                    .unwrap_or_else(|| {
                        warn!(channel = ch, value = v, "position out of range (0-100), using 0");
                        0
                    }),
                Err(_) => {
                    warn!(channel = ch, value = raw, "invalid position value, using 0");
                    0
                }
            }
        };
        positions.insert(ch, value);
    }
    Ok(DeviceEvent::PositionsUpdated(positions))
}

fn parse_channel_name(tag: &'static str, payload: &str) -> Result<DeviceEvent, DecodeError> {
    let body = payload.trim();
    let body = body.strip_suffix(',').unwrap_or(body);
    let (raw_channel, rest) = body.split_once(',').ok_or(DecodeError::FieldCount {
        tag,
        expected: 3,
        got: 1,
    })?;
    let (name, flag) = rest.rsplit_once(',').ok_or(DecodeError::FieldCount {
        tag,
        expected: 3,
        got: 2,
    })?;
    let ch = channel(tag, raw_channel)?;
    number::<u32>(tag, 2, flag)?;

    let name = name.trim();
    if name.is_empty() {
        return Err(DecodeError::Empty { tag });
    }
    Ok(DeviceEvent::ChannelNamed {
        channel: ch,
        name: name.to_owned(),
    })
}

fn parse_max_channels(tag: &'static str, payload: &str) -> Result<DeviceEvent, DecodeError> {
    let raw = payload.trim().trim_end_matches(',');
    if raw.is_empty() {
        return Err(DecodeError::Empty { tag });
    }
    Ok(DeviceEvent::MaxChannelsKnown(number(tag, 0, raw)?))
}

fn parse_climate(tag: &'static str, payload: &str) -> Result<DeviceEvent, DecodeError> {
    let parts = fields(payload, ',');
    require(tag, &parts, CLIMATE_FIELDS)?;

    let value = |idx: usize| -> Result<Option<f64>, DecodeError> {
        let raw = parts[idx];
        if raw == ABSENT_SENTINEL {
            return Ok(None);
        }
        number::<f64>(tag, idx, raw).map(Some)
    };
    let flag = |idx: usize| -> Result<Option<bool>, DecodeError> {
        let raw = parts[idx];
        if raw == ABSENT_SENTINEL {
            return Ok(None);
        }
        number::<i64>(tag, idx, raw).map(|v| Some(v != 0))
    };
    // Temperatures arrive as separate integer and decimal fields.
    let temperature = |int_idx: usize, dec_idx: usize| -> Result<Option<f64>, DecodeError> {
        let (int, dec) = (parts[int_idx], parts[dec_idx]);
        if int == ABSENT_SENTINEL || dec == ABSENT_SENTINEL {
            return Ok(None);
        }
        let int = if int.is_empty() { "0" } else { int };
        let dec = if dec.is_empty() { "0" } else { dec };
        number::<f64>(tag, int_idx, &format!("{int}.{dec}")).map(Some)
    };

    Ok(DeviceEvent::ClimateUpdated(ClimateReading {
        brightness: value(0)?,
        indoor_temperature: temperature(1, 2)?,
        indoor_temperature_min: value(3)?,
        indoor_temperature_max: value(4)?,
        outdoor_temperature: temperature(5, 6)?,
        outdoor_temperature_min: value(7)?,
        outdoor_temperature_max: value(8)?,
        wind_speed: value(9)?,
        wind_speed_max: value(10)?,
        alarm: flag(11)?,
        rain: flag(12)?,
        brightness_average: value(14)?,
        relative_humidity: value(15)?,
    }))
}

fn parse_scenario_name(tag: &'static str, payload: &str) -> Result<DeviceEvent, DecodeError> {
    let body = payload.trim();
    let body = body.strip_suffix(',').unwrap_or(body);
    let (raw_number, name) = body.split_once(',').ok_or(DecodeError::FieldCount {
        tag,
        expected: 2,
        got: 1,
    })?;
    let number = channel(tag, raw_number)?;
    let name = name.trim();
    if name.is_empty() {
        return Err(DecodeError::Empty { tag });
    }
    Ok(DeviceEvent::ScenarioNamed {
        number,
        name: name.to_owned(),
        authoritative: tag == "rzn",
    })
}

fn parse_automation(tag: &'static str, payload: &str) -> Result<DeviceEvent, DecodeError> {
    let raw = payload.trim().trim_end_matches(',');
    if raw.is_empty() {
        return Err(DecodeError::Empty { tag });
    }
    let value: u8 = number(tag, 0, raw)?;
    Ok(DeviceEvent::AutomationStatusUpdated(value != 0))
}

fn parse_group_list(tag: &'static str, payload: &str) -> Result<DeviceEvent, DecodeError> {
    let parts = fields(payload, ',');
    require(tag, &parts, 1)?;
    let group = channel(tag, parts[0])?;

    let mut channels = Vec::new();
    for (idx, raw) in parts.iter().enumerate().skip(1) {
        let ch: Channel = number(tag, idx, raw)?;
        if ch > 0 {
            channels.push(ch);
        }
    }
    channels.sort_unstable();
    channels.dedup();
    Ok(DeviceEvent::GroupChannelsUpdated(GroupMembers {
        number: group,
        channels,
    }))
}

/// One mask byte per eight shutter channels.
const MASK_BYTES: usize = SCENARIO_CHANNEL_OFFSET as usize / 8;

fn parse_group_mask(tag: &'static str, payload: &str) -> Result<DeviceEvent, DecodeError> {
    let parts = fields(payload, ',');
    require(tag, &parts, 1)?;
    let group = channel(tag, parts[0])?;

    let mut channels = Vec::new();
    for (byte_idx, raw) in parts.iter().skip(1).enumerate() {
        let mask: u8 = number(tag, byte_idx + 1, raw)?;
        if byte_idx >= MASK_BYTES {
            if mask != 0 {
                return Err(DecodeError::MaskOverflow {
                    tag,
                    max: SCENARIO_CHANNEL_OFFSET,
                });
            }
            continue;
        }
        let base = Channel::try_from(byte_idx * 8).map_err(|_| DecodeError::InvalidChannel {
            tag,
            value: raw.to_string(),
        })?;
        for bit in 0..8u16 {
            if mask & (1 << bit) != 0 {
                channels.push(base + bit + 1);
            }
        }
    }
    Ok(DeviceEvent::GroupInfoUpdated(GroupMembers {
        number: group,
        channels,
    }))
}

fn parse_logbook_entry(tag: &'static str, payload: &str) -> Result<DeviceEvent, DecodeError> {
    let parts = fields(payload, ';');
    require(tag, &parts, LOGBOOK_FIELDS)?;
    let number: u32 = number(tag, 0, parts[0])?;
    if number == 0 {
        return Err(DecodeError::InvalidChannel {
            tag,
            value: parts[0].to_owned(),
        });
    }
    Ok(DeviceEvent::LogbookEntryAdded(LogbookRecord {
        number,
        room: parts[1].to_owned(),
        date: parts[2].to_owned(),
        time: parts[3].to_owned(),
        direction: parts[4].to_owned(),
        trigger: parts[5].to_owned(),
    }))
}

fn parse_logbook_count(tag: &'static str, payload: &str) -> Result<DeviceEvent, DecodeError> {
    let raw = payload.trim().trim_end_matches(',');
    if raw.is_empty() {
        return Err(DecodeError::Empty { tag });
    }
    Ok(DeviceEvent::LogbookCountUpdated(number(tag, 0, raw)?))
}

fn parse_jalousie(tag: &'static str, payload: &str) -> Result<DeviceEvent, DecodeError> {
    let (channel, values) = parameter_block(tag, payload, 3)?;
    Ok(DeviceEvent::JalousieParamsUpdated(JalousieParams {
        channel,
        enabled: values[0] != 0,
        tilt_time: value_as(tag, 2, values[1])?,
        extra: values[2..].to_vec(),
    }))
}

fn parse_shading(tag: &'static str, payload: &str) -> Result<DeviceEvent, DecodeError> {
    let (channel, values) = parameter_block(tag, payload, 4)?;
    Ok(DeviceEvent::ShadingParamsUpdated(ShadingParams {
        channel,
        enabled: values[0] != 0,
        brightness_threshold: value_as(tag, 2, values[1])?,
        position: bounded_position(tag, 3, values[2])?,
        extra: values[3..].to_vec(),
    }))
}

fn parse_wind(tag: &'static str, payload: &str) -> Result<DeviceEvent, DecodeError> {
    let (channel, values) = parameter_block(tag, payload, 4)?;
    Ok(DeviceEvent::WindParamsUpdated(WindParams {
        channel,
        enabled: values[0] != 0,
        wind_threshold: value_as(tag, 2, values[1])?,
        position: bounded_position(tag, 3, values[2])?,
        extra: values[3..].to_vec(),
    }))
}

fn parse_rain(tag: &'static str, payload: &str) -> Result<DeviceEvent, DecodeError> {
    let (channel, values) = parameter_block(tag, payload, 3)?;
    Ok(DeviceEvent::RainParamsUpdated(RainParams {
        channel,
        enabled: values[0] != 0,
        position: bounded_position(tag, 2, values[1])?,
        extra: values[2..].to_vec(),
    }))
}

fn text(tag: &'static str, payload: &str) -> Result<String, DecodeError> {
    let value = payload.trim();
    if value.is_empty() {
        return Err(DecodeError::Empty { tag });
    }
    Ok(value.to_owned())
}

fn parse_model(tag: &'static str, payload: &str) -> Result<DeviceEvent, DecodeError> {
    text(tag, payload).map(DeviceEvent::ModelReported)
}

fn parse_firmware(tag: &'static str, payload: &str) -> Result<DeviceEvent, DecodeError> {
    text(tag, payload).map(DeviceEvent::FirmwareReported)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::protocol::{Action, encode};

    fn positions(line: &str) -> BTreeMap<Channel, u8> {
        match decode(line) {
            Some(DeviceEvent::PositionsUpdated(p)) => p,
            other => panic!("expected positions, got {other:?}"),
        }
    }

    // ── Positions ──

    #[test]
    fn positions_frame() {
        let p = positions("start_sop10,0,100,ende_sop");
        assert_eq!(p, BTreeMap::from([(1, 10), (2, 0), (3, 100)]));
    }

    #[test]
    fn positions_out_of_range_and_empty_become_zero() {
        let p = positions("start_sop101,,abc,-3,55,ende_sop");
        assert_eq!(p, BTreeMap::from([(1, 0), (2, 0), (3, 0), (4, 0), (5, 55)]));
        assert!(p.values().all(|v| *v <= 100));
    }

    #[test]
    fn positions_without_start_marker() {
        let p = positions("20,30,ende_sop");
        assert_eq!(p, BTreeMap::from([(1, 20), (2, 30)]));

        let p = positions(",10,20,ende_sop");
        assert_eq!(p, BTreeMap::from([(1, 10), (2, 20)]));
    }

    #[test]
    fn positions_cap_at_shutter_range() {
        let payload = vec!["50"; 70].join(",");
        let p = positions(&format!("start_sop{payload},ende_sop"));
        assert_eq!(p.len(), 64);
    }

    #[test]
    fn close_command_round_trips_through_position_frame() {
        let lines = encode(&Action::Close, &[3, 4], None);
        assert!(lines.contains(&"down\r\n".to_string()));

        let p = positions("start_sop50,50,0,0,ende_sop");
        let closed: BTreeMap<Channel, u8> = [3, 4]
            .into_iter()
            .map(|ch| (ch, p[&ch]))
            .collect();
        assert_eq!(closed, BTreeMap::from([(3, 0), (4, 0)]));
    }

    // ── Names & channels ──

    #[test]
    fn channel_name_frame() {
        assert_eq!(
            decode("start_smn3,Living Room,0,ende_smn"),
            Some(DeviceEvent::ChannelNamed {
                channel: 3,
                name: "Living Room".into(),
            })
        );
    }

    #[test]
    fn channel_name_may_contain_commas() {
        assert_eq!(
            decode("start_smn12,Bad, oben,1,ende_smn"),
            Some(DeviceEvent::ChannelNamed {
                channel: 12,
                name: "Bad, oben".into(),
            })
        );
    }

    #[test]
    fn channel_name_is_idempotent() {
        let line = "start_smn65,Good Morning,0,ende_smn";
        assert_eq!(decode(line), decode(line));
    }

    #[test]
    fn malformed_name_frames_are_dropped() {
        assert_eq!(decode("start_smn0,Nobody,0,ende_smn"), None);
        assert_eq!(decode("start_smnx,Nobody,0,ende_smn"), None);
        assert_eq!(decode("start_smn4,ende_smn"), None);
        assert!(matches!(
            decode_frame("start_smn4,ende_smn"),
            Some(Err(DecodeError::FieldCount { .. }))
        ));
    }

    #[test]
    fn max_channels_frame() {
        assert_eq!(
            decode("start_smc32ende_smc"),
            Some(DeviceEvent::MaxChannelsKnown(32))
        );
        assert_eq!(decode("start_smcende_smc"), None);
    }

    // ── Climate ──

    #[test]
    fn climate_sentinel_is_absent() {
        let line = "start_skd0,999,999,999,999,999,999,999,999,0,0,0,0,1,0,0,ende_skd";
        let Some(DeviceEvent::ClimateUpdated(c)) = decode(line) else {
            panic!("expected climate");
        };
        assert_eq!(c.brightness, Some(0.0));
        assert_eq!(c.indoor_temperature, None);
        assert_eq!(c.outdoor_temperature_max, None);
        assert_eq!(c.alarm, Some(false));
        assert_eq!(c.relative_humidity, Some(0.0));
    }

    #[test]
    fn climate_temperatures_combine_integer_and_decimal() {
        let line = "start_skd12,21,5,18,24,-3,2,-6,4,7,15,1,0,0,10,55,ende_skd";
        let Some(DeviceEvent::ClimateUpdated(c)) = decode(line) else {
            panic!("expected climate");
        };
        assert_eq!(c.indoor_temperature, Some(21.5));
        assert_eq!(c.outdoor_temperature, Some(-3.2));
        assert_eq!(c.wind_speed, Some(7.0));
        assert_eq!(c.alarm, Some(true));
        assert_eq!(c.rain, Some(false));
        assert_eq!(c.brightness_average, Some(10.0));
        assert_eq!(c.relative_humidity, Some(55.0));
    }

    #[test]
    fn short_climate_frame_is_dropped() {
        assert!(matches!(
            decode_frame("start_skd1,2,3,ende_skd"),
            Some(Err(DecodeError::FieldCount {
                expected: 16,
                got: 3,
                ..
            }))
        ));
    }

    // ── Groups ──

    #[test]
    fn group_list_frame() {
        assert_eq!(
            decode("start_rgz2,1,2,3,0,0,ende_rgz"),
            Some(DeviceEvent::GroupChannelsUpdated(GroupMembers {
                number: 2,
                channels: vec![1, 2, 3],
            }))
        );
    }

    #[test]
    fn group_bitmask_frame() {
        assert_eq!(
            decode("start_sgz1,255,0,0,0,0,ende_sgz"),
            Some(DeviceEvent::GroupInfoUpdated(GroupMembers {
                number: 1,
                channels: (1..=8).collect(),
            }))
        );
    }

    #[test]
    fn group_bitmask_spans_bytes() {
        let Some(DeviceEvent::GroupInfoUpdated(g)) = decode("start_sgz3,0,5,128,ende_sgz") else {
            panic!("expected group");
        };
        assert_eq!(g.channels, vec![9, 11, 24]);
    }

    #[test]
    fn group_bitmask_beyond_shutter_range() {
        // Trailing zero bytes are padding.
        let Some(DeviceEvent::GroupInfoUpdated(g)) =
            decode("start_sgz2,0,0,0,0,0,0,0,128,0,0,ende_sgz")
        else {
            panic!("expected group");
        };
        assert_eq!(g.channels, vec![64]);

        let flood = vec!["255"; 8200].join(",");
        let result = decode_frame(&format!("start_sgz1,{flood},ende_sgz"));
        assert!(
            matches!(result, Some(Err(DecodeError::MaskOverflow { max: 64, .. }))),
            "{result:?}"
        );
    }

    #[test]
    fn group_bitmask_over_255_is_malformed() {
        assert_eq!(decode("start_sgz3,256,ende_sgz"), None);
    }

    // ── Misc frames ──

    #[test]
    fn scenario_names() {
        assert_eq!(
            decode("start_rzn2,Evening,ende_rzn"),
            Some(DeviceEvent::ScenarioNamed {
                number: 2,
                name: "Evening".into(),
                authoritative: true,
            })
        );
        assert!(matches!(
            decode("start_szn2,Evening,ende_szn"),
            Some(DeviceEvent::ScenarioNamed {
                authoritative: false,
                ..
            })
        ));
    }

    #[test]
    fn automation_and_logbook_count() {
        assert_eq!(
            decode("start_sau1ende_sau"),
            Some(DeviceEvent::AutomationStatusUpdated(true))
        );
        assert_eq!(
            decode("start_sla42ende_sla"),
            Some(DeviceEvent::LogbookCountUpdated(42))
        );
    }

    #[test]
    fn logbook_entry_frame() {
        assert_eq!(
            decode("start_sld7;Kitchen;12.03.24;08:15:00;down;Timer;ende_sld"),
            Some(DeviceEvent::LogbookEntryAdded(LogbookRecord {
                number: 7,
                room: "Kitchen".into(),
                date: "12.03.24".into(),
                time: "08:15:00".into(),
                direction: "down".into(),
                trigger: "Timer".into(),
            }))
        );
        assert_eq!(decode("start_sld7;Kitchen;ende_sld"), None);
    }

    #[test]
    fn parameter_blocks() {
        assert_eq!(
            decode("start_sjp4,1,15,ende_sjp"),
            Some(DeviceEvent::JalousieParamsUpdated(JalousieParams {
                channel: 4,
                enabled: true,
                tilt_time: 15,
                extra: vec![],
            }))
        );
        assert_eq!(
            decode("start_swp2,1,40,100,9,ende_swp"),
            Some(DeviceEvent::WindParamsUpdated(WindParams {
                channel: 2,
                enabled: true,
                wind_threshold: 40,
                position: 100,
                extra: vec![9],
            }))
        );
        assert!(matches!(
            decode("start_sbp1,1,20000,30,ende_sbp"),
            Some(DeviceEvent::ShadingParamsUpdated(ShadingParams { position: 30, .. }))
        ));
        assert!(matches!(
            decode("start_srp5,0,,ende_srp"),
            Some(DeviceEvent::RainParamsUpdated(RainParams {
                enabled: false,
                position: 0,
                ..
            }))
        ));
        assert_eq!(decode("start_srp5,0,140,ende_srp"), None);
        assert_eq!(decode("start_sjp0,1,15,ende_sjp"), None);
    }

    #[test]
    fn model_and_firmware_strings() {
        assert_eq!(
            decode("start_smoHEYtech RS879M  ende_smo"),
            Some(DeviceEvent::ModelReported("HEYtech RS879M".into()))
        );
        assert_eq!(
            decode("start_sfi8.027rende_sfi"),
            Some(DeviceEvent::FirmwareReported("8.027r".into()))
        );
    }

    #[test]
    fn unknown_and_unframed_lines_are_ignored() {
        assert_eq!(decode("start_xyz1,2,3ende_xyz"), None);
        assert_eq!(decode("hello"), None);
        assert_eq!(decode(""), None);
        assert_eq!(decode("start_sop1,2,3"), None);
        assert_eq!(decode("1,2,ende_smn"), None);
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        assert_eq!(
            decode("  start_smc8ende_smc\r\n"),
            Some(DeviceEvent::MaxChannelsKnown(8))
        );
    }
}
