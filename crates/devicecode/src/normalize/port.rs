//! Serial console and JTAG descriptor parsing.
//!
//! Descriptors look like `yes, J2, 4-pin, 3.3V, 115200 8N1, populated`.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::device::{PortInfo, Tristate};

/// Baud rates seen on embedded consoles.
pub const BAUD_RATES: &[u32] = &[
    300, 600, 1200, 2400, 4800, 9600, 14400, 19200, 38400, 57600, 115200, 230400, 460800,
    921600, 1500000,
];

/// Connector types with their canonical spelling.
const CONNECTOR_TYPES: &[(&str, &str)] = &[
    ("rj11", "RJ11"),
    ("rj-11", "RJ11"),
    ("rj45", "RJ45"),
    ("rj-45", "RJ45"),
    ("de-9", "DE-9"),
    ("de9", "DE-9"),
    ("db9", "DE-9"),
    ("db-9", "DE-9"),
    ("usb", "USB"),
    ("micro usb", "micro USB"),
    ("he10", "HE10"),
];

static DESIGNATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:J|JP|CN|CON|P|H|TP)\d{1,3}$").unwrap());
static PINS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^(\d{1,2})[- ]?pins?$").unwrap());
static VOLTAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(\d(?:\.\d{1,2})?)\s*v(?:olts?)?$").unwrap());
static DATA_PARITY_STOP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^([5-8])([NEOMS])([12])$").unwrap());
static NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(\d{3,7})\s*(?:baud|bps)?$").unwrap());

/// Result of interpreting a baud rate candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Baud {
    Known(u32),
    /// A number that is not a standard rate.
    Unknown(u32),
}

/// Interpret a token as a baud rate.
pub fn parse_baud(token: &str) -> Option<Baud> {
    let caps = NUMBER.captures(token.trim())?;
    let rate: u32 = caps[1].parse().ok()?;
    if BAUD_RATES.contains(&rate) {
        Some(Baud::Known(rate))
    } else {
        Some(Baud::Unknown(rate))
    }
}

/// A parsed port descriptor plus what could not be interpreted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedPort {
    pub port: PortInfo,
    /// Numbers that looked like (non-standard) baud rates.
    pub unknown_bauds: Vec<u32>,
}

/// Parse a serial/JTAG descriptor.
pub fn parse_port(value: &str) -> ParsedPort {
    let mut parsed = ParsedPort::default();
    let mut understood = false;

    let fragments = value
        .split([',', ';'])
        .map(str::trim)
        .filter(|f| !f.is_empty());

    for (idx, fragment) in fragments.enumerate() {
        let lower = fragment.to_lowercase();
        if idx == 0 {
            match lower.as_str() {
                "yes" => {
                    parsed.port.present = Tristate::Yes;
                    continue;
                }
                "no" | "none" => {
                    parsed.port.present = Tristate::No;
                    continue;
                }
                "unknown" | "?" => continue,
                _ => {}
            }
        }

        if apply_token(&mut parsed, fragment) {
            understood = true;
            continue;
        }
        if !fragment.contains(char::is_whitespace) {
            parsed.port.extra.push(fragment.to_string());
            continue;
        }

        // "115200 8N1" and similar: interpret word by word
        let mut leftover = Vec::new();
        for word in fragment.split_whitespace() {
            if apply_token(&mut parsed, word) {
                understood = true;
            } else {
                leftover.push(word);
            }
        }
        if !leftover.is_empty() {
            parsed.port.extra.push(leftover.join(" "));
        }
    }

    if parsed.port.present == Tristate::Unknown && (understood || !parsed.port.extra.is_empty()) {
        parsed.port.present = Tristate::Yes;
    }
    parsed
}

/// Apply one token to the port; false if the token was not understood.
fn apply_token(parsed: &mut ParsedPort, token: &str) -> bool {
    let lower = token.to_lowercase();
    let port = &mut parsed.port;

    match lower.as_str() {
        "populated" => {
            port.populated = Tristate::Yes;
            return true;
        }
        "unpopulated" | "not populated" => {
            port.populated = Tristate::No;
            return true;
        }
        _ => {}
    }

    if let Some((_, canonical)) = CONNECTOR_TYPES.iter().find(|(name, _)| *name == lower) {
        port.connector = Some(canonical.to_string());
        return true;
    }
    if DESIGNATOR.is_match(token) {
        port.connector = Some(token.to_uppercase());
        return true;
    }
    if let Some(caps) = PINS.captures(token) {
        port.pins = caps[1].parse().ok();
        return port.pins.is_some();
    }
    if let Some(caps) = VOLTAGE.captures(token) {
        port.voltage = caps[1].parse().ok();
        return port.voltage.is_some();
    }
    if DATA_PARITY_STOP.is_match(token) {
        port.data_parity_stop = Some(token.to_uppercase());
        return true;
    }
    match parse_baud(token) {
        Some(Baud::Known(rate)) => {
            port.baud_rate = Some(rate);
            true
        }
        Some(Baud::Unknown(rate)) => {
            parsed.unknown_bauds.push(rate);
            false
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_descriptor() {
        let parsed = parse_port("yes, J2, 4-pin, 3.3V, 115200 8N1, populated");
        let port = parsed.port;
        assert_eq!(port.present, Tristate::Yes);
        assert_eq!(port.connector.as_deref(), Some("J2"));
        assert_eq!(port.pins, Some(4));
        assert_eq!(port.voltage, Some(3.3));
        assert_eq!(port.baud_rate, Some(115200));
        assert_eq!(port.data_parity_stop.as_deref(), Some("8N1"));
        assert_eq!(port.populated, Tristate::Yes);
        assert!(port.extra.is_empty());
    }

    #[test]
    fn test_no_port() {
        let parsed = parse_port("no");
        assert_eq!(parsed.port.present, Tristate::No);
        let parsed = parse_port("None");
        assert_eq!(parsed.port.present, Tristate::No);
    }

    #[test]
    fn test_presence_implied_by_details() {
        let parsed = parse_port("RJ45; 9600");
        assert_eq!(parsed.port.present, Tristate::Yes);
        assert_eq!(parsed.port.connector.as_deref(), Some("RJ45"));
        assert_eq!(parsed.port.baud_rate, Some(9600));
    }

    #[test]
    fn test_baud_is_not_substring_matched() {
        // 57600 must not be read as 600
        let parsed = parse_port("yes, 57600");
        assert_eq!(parsed.port.baud_rate, Some(57600));
    }

    #[test]
    fn test_unknown_fragment_kept() {
        let parsed = parse_port("yes, behind the label, 38400");
        assert_eq!(parsed.port.extra, vec!["behind the label"]);
        assert_eq!(parsed.port.baud_rate, Some(38400));
    }

    #[test]
    fn test_nonstandard_baud() {
        let parsed = parse_port("yes, 12345");
        assert_eq!(parsed.port.baud_rate, None);
        assert_eq!(parsed.unknown_bauds, vec![12345]);
        assert_eq!(parsed.port.extra, vec!["12345"]);
    }

    #[test]
    fn test_parse_baud() {
        assert_eq!(parse_baud("115200"), Some(Baud::Known(115200)));
        assert_eq!(parse_baud("115200 baud"), Some(Baud::Known(115200)));
        assert_eq!(parse_baud("1234"), Some(Baud::Unknown(1234)));
        assert_eq!(parse_baud("fast"), None);
    }
}
