// ── Command encoding ──
//
// Turns logical actions into the literal line sequences the firmware
// expects. Every returned line already carries its CRLF terminator.

use chrono::{Datelike, NaiveDateTime, Timelike};
use secrecy::{ExposeSecret, SecretString};

use super::{Action, Channel, LINE_END};

const AUTH: &str = "rsc";
const HAND_OPEN: &str = "rhi";
const HAND_CHANNEL: &str = "rhb";
const HAND_CLOSE: &str = "rhe";
const SCENARIO_ACTIVATE: &str = "rsa";
const TIME_SET: &str = "rdt";
const LOGBOOK_ENTRY: &str = "sld";
const LOGBOOK_CLEAR: &str = "sll";

fn line(text: &str) -> String {
    format!("{text}{LINE_END}")
}

/// Start a command list, prefixed with the PIN bracket when one is set.
fn authenticated(pin: Option<&SecretString>) -> Vec<String> {
    match pin.map(|p| p.expose_secret()) {
        Some(pin) if !pin.is_empty() => vec![line(AUTH), line(pin)],
        _ => Vec::new(),
    }
}

/// Encode a shutter action.
///
/// With no channels the verb is sent unscoped. Otherwise every channel gets
/// its own hand-control bracket; the firmware does not accept several
/// channels inside one bracket.
pub fn encode(action: &Action, channels: &[Channel], pin: Option<&SecretString>) -> Vec<String> {
    let verb = action.device_verb();
    let mut lines = authenticated(pin);

    if channels.is_empty() {
        lines.push(line(&verb));
        return lines;
    }

    for channel in channels {
        lines.extend([
            line(HAND_OPEN),
            line(""),
            line(HAND_CHANNEL),
            line(&channel.to_string()),
            line(&verb),
            line(""),
            line(HAND_CLOSE),
            line(""),
        ]);
    }
    lines
}

/// Encode a bare query verb such as `sop` or `smn`.
pub fn encode_query(verb: &str, pin: Option<&SecretString>) -> Vec<String> {
    let mut lines = authenticated(pin);
    lines.push(line(verb));
    lines
}

/// Activate a stored scenario by number.
pub fn encode_scenario(number: u16, pin: Option<&SecretString>) -> Vec<String> {
    let mut lines = authenticated(pin);
    lines.push(line(SCENARIO_ACTIVATE));
    lines.push(line(&number.to_string()));
    lines
}

/// Set the device clock.
///
/// Argument line is `day,month,yy,hour,minute,second,weekday` with the ISO
/// weekday (Monday = 1).
pub fn encode_time_sync(now: &NaiveDateTime, pin: Option<&SecretString>) -> Vec<String> {
    let stamp = format!(
        "{},{},{},{},{},{},{}",
        now.day(),
        now.month(),
        now.year().rem_euclid(100),
        now.hour(),
        now.minute(),
        now.second(),
        now.weekday().number_from_monday(),
    );
    let mut lines = authenticated(pin);
    lines.push(line(TIME_SET));
    lines.push(line(&stamp));
    lines
}

/// Request a single logbook entry.
pub fn encode_logbook_entry(number: u32, pin: Option<&SecretString>) -> Vec<String> {
    let mut lines = authenticated(pin);
    lines.push(line(LOGBOOK_ENTRY));
    lines.push(line(&number.to_string()));
    lines
}

/// Erase the device logbook.
pub fn encode_clear_logbook(pin: Option<&SecretString>) -> Vec<String> {
    encode_query(LOGBOOK_CLEAR, pin)
}

/// Wake-up sequence sent right after connecting.
///
/// After boot or an idle disconnect the firmware ignores queries until it
/// has seen two complete hand-control brackets.
pub fn handshake_lines() -> Vec<String> {
    let bracket = [line(HAND_OPEN), line(""), line(HAND_CLOSE), line("")];
    bracket.iter().chain(bracket.iter()).cloned().collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn unscoped_verb_is_a_single_line() {
        let lines = encode(&Action::Raw("sop".into()), &[], None);
        assert_eq!(lines, vec!["sop\r\n"]);
    }

    #[test]
    fn channels_are_wrapped_individually() {
        let lines = encode(&Action::Close, &[3, 4], None);
        assert_eq!(
            lines,
            vec![
                "rhi\r\n", "\r\n", "rhb\r\n", "3\r\n", "down\r\n", "\r\n", "rhe\r\n", "\r\n",
                "rhi\r\n", "\r\n", "rhb\r\n", "4\r\n", "down\r\n", "\r\n", "rhe\r\n", "\r\n",
            ]
        );
    }

    #[test]
    fn pin_prefixes_every_command() {
        let pin = SecretString::from("1234".to_string());
        let lines = encode(&Action::Position(40), &[7], Some(&pin));
        assert_eq!(&lines[..2], &["rsc\r\n", "1234\r\n"]);
        assert!(lines.contains(&"40\r\n".to_string()));

        let query = encode_query("skd", Some(&pin));
        assert_eq!(query, vec!["rsc\r\n", "1234\r\n", "skd\r\n"]);
    }

    #[test]
    fn empty_pin_is_ignored() {
        let pin = SecretString::from(String::new());
        assert_eq!(encode_query("sop", Some(&pin)), vec!["sop\r\n"]);
    }

    #[test]
    fn time_sync_uses_iso_weekday_and_two_digit_year() {
        // 2024-03-17 was a Sunday.
        let now = NaiveDate::from_ymd_opt(2024, 3, 17)
            .unwrap()
            .and_hms_opt(8, 5, 9)
            .unwrap();
        assert_eq!(
            encode_time_sync(&now, None),
            vec!["rdt\r\n", "17,3,24,8,5,9,7\r\n"]
        );
    }

    #[test]
    fn scenario_and_logbook_commands() {
        assert_eq!(encode_scenario(2, None), vec!["rsa\r\n", "2\r\n"]);
        assert_eq!(encode_logbook_entry(5, None), vec!["sld\r\n", "5\r\n"]);
        assert_eq!(encode_clear_logbook(None), vec!["sll\r\n"]);
    }

    #[test]
    fn handshake_is_two_brackets() {
        let lines = handshake_lines();
        assert_eq!(lines.len(), 8);
        assert_eq!(lines.iter().filter(|l| *l == "rhi\r\n").count(), 2);
        assert_eq!(lines.iter().filter(|l| *l == "rhe\r\n").count(), 2);
    }
}
