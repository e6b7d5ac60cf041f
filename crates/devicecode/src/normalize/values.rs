//! Small value parsers: dates, lists, FCC ids, addresses and passwords.

use std::net::Ipv4Addr;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::device::{FccId, FccType, PasswordState};
use crate::reference::ReferenceData;

static IPV4: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\d{1,3}(?:\.\d{1,3}){3})\b").unwrap());
static YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(19|20)\d{2}$").unwrap());

/// Password values meaning "the device has no password".
const NO_PASSWORD: &[&str] = &["none", "(none)", "blank", "(blank)", "<blank>", "no password", "empty"];

/// Parse the date formats found on device pages.
///
/// Month-only and year-only dates resolve to the first day of the period.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if let Some(date) = parse_date_exact(text) {
        return Some(date);
    }
    // "2012-06-01 (announced)"
    text.split_whitespace().next().and_then(parse_date_exact)
}

fn parse_date_exact(text: &str) -> Option<NaiveDate> {
    const FULL: &[&str] = &["%m/%d/%Y", "%d/%m/%Y", "%Y-%m-%d", "%Y/%m/%d"];
    for format in FULL {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Some(date);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(&format!("{}-01", text), "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(&format!("01/{}", text), "%d/%m/%Y") {
        return Some(date);
    }
    if YEAR.is_match(text) {
        return NaiveDate::from_ymd_opt(text.parse().ok()?, 1, 1);
    }
    None
}

/// Split a comma-separated list, trimming and dropping empty or repeated items.
pub fn split_list(text: &str) -> Vec<String> {
    let mut items: Vec<String> = Vec::new();
    for item in text.split(',').map(str::trim).filter(|i| !i.is_empty()) {
        if !items.iter().any(|i| i == item) {
            items.push(item.to_string());
        }
    }
    items
}

/// Grantee code of an FCC id: five characters for ids starting with `2`,
/// otherwise three characters starting with a letter.
pub fn fcc_grantee_code(id: &str) -> Option<String> {
    let first = id.chars().next()?;
    let len = if first == '2' {
        5
    } else if first.is_ascii_alphabetic() {
        3
    } else {
        return None;
    };
    let code: String = id.chars().take(len).collect();
    (code.chars().count() == len && code.chars().all(|c| c.is_ascii_alphanumeric())).then_some(code)
}

/// Parse an FCC id field into tagged ids.
pub fn parse_fcc_ids(text: &str, fcc_type: FccType, reference: &ReferenceData) -> Vec<FccId> {
    let mut ids: Vec<FccId> = Vec::new();
    for raw in text.split(|c: char| c == ',' || c.is_whitespace()) {
        let id = raw.trim().trim_matches(|c: char| !c.is_ascii_alphanumeric() && c != '-');
        if id.is_empty() {
            continue;
        }
        let id = id.to_uppercase();
        if ids.iter().any(|f| f.id == id) {
            continue;
        }
        let grantee_code = fcc_grantee_code(&id).unwrap_or_default();
        let grantee = reference.grantee_name(&grantee_code).map(String::from);
        ids.push(FccId {
            id,
            fcc_type,
            grantee_code,
            grantee,
            date: None,
        });
    }
    ids
}

/// Extract an IPv4 address, e.g. from `http://192.168.1.1/`.
pub fn parse_ip(text: &str) -> Option<String> {
    IPV4.captures_iter(text)
        .filter_map(|caps| caps[1].parse::<Ipv4Addr>().ok())
        .map(|ip| ip.to_string())
        .next()
}

/// Interpret `yes`/`no` answers.
pub fn parse_yes_no(text: &str) -> Option<bool> {
    match text.trim().to_lowercase().as_str() {
        "yes" | "y" | "true" => Some(true),
        "no" | "n" | "false" => Some(false),
        _ => None,
    }
}

/// Classify a password field value into the tri-state plus optional comment.
pub fn classify_password(value: &str, reference: &ReferenceData) -> (PasswordState, Option<String>) {
    let value = value.trim();
    if value.is_empty() {
        return (PasswordState::Unknown, None);
    }
    if reference.is_password_comment(value) {
        return (PasswordState::Unknown, Some(value.to_string()));
    }
    if NO_PASSWORD.contains(&value.to_lowercase().as_str()) {
        return (PasswordState::No, None);
    }
    (PasswordState::Present(value.to_string()), None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2012, 6, 21);
        assert_eq!(parse_date("06/21/2012"), expected);
        assert_eq!(parse_date("21/06/2012"), expected);
        assert_eq!(parse_date("2012-06-21"), expected);
        assert_eq!(parse_date("2012-06-21 (announced)"), expected);
        assert_eq!(parse_date("2012-06"), NaiveDate::from_ymd_opt(2012, 6, 1));
        assert_eq!(parse_date("06/2012"), NaiveDate::from_ymd_opt(2012, 6, 1));
        assert_eq!(parse_date("2012"), NaiveDate::from_ymd_opt(2012, 1, 1));
        assert_eq!(parse_date("soon"), None);
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list("router, access point,,router "), vec!["router", "access point"]);
    }

    #[test]
    fn test_grantee_code() {
        assert_eq!(fcc_grantee_code("MSQ-RTN66U").as_deref(), Some("MSQ"));
        assert_eq!(fcc_grantee_code("2AG87-RX1").as_deref(), Some("2AG87"));
        assert_eq!(fcc_grantee_code("1AB"), None);
        assert_eq!(fcc_grantee_code("2AG"), None);
    }

    #[test]
    fn test_parse_fcc_ids() {
        let reference = ReferenceData::builtin();
        let ids = parse_fcc_ids("msq-rtn66u, MSQ-RTN66U  PY3-12345", FccType::Unknown, &reference);
        assert_eq!(ids.len(), 2);
        assert_eq!(ids[0].id, "MSQ-RTN66U");
        assert_eq!(ids[0].grantee.as_deref(), Some("ASUSTeK Computer Inc."));
        assert_eq!(ids[1].grantee_code, "PY3");
    }

    #[test]
    fn test_parse_ip() {
        assert_eq!(parse_ip("http://192.168.1.1/").as_deref(), Some("192.168.1.1"));
        assert_eq!(parse_ip("999.1.1.1"), None);
        assert_eq!(parse_ip("dhcp"), None);
    }

    #[test]
    fn test_classify_password() {
        let reference = ReferenceData::builtin();
        assert_eq!(
            classify_password("admin", &reference),
            (PasswordState::Present("admin".into()), None)
        );
        assert_eq!(classify_password("(none)", &reference), (PasswordState::No, None));
        assert_eq!(
            classify_password("Randomly generated", &reference),
            (PasswordState::Unknown, Some("Randomly generated".into()))
        );
        assert_eq!(classify_password("", &reference), (PasswordState::Unknown, None));
    }
}
