//! HTML-comment stripping with template-residue handling.
//!
//! Wiki templates pre-fill fields with `<!-- hint -->` comments. Editors
//! type next to them, inside them, or leave them alone, so a raw value can be
//! a pure default, live text plus residue, or live text inside the markers.

use crate::reference::DefaultValueTable;

const OPEN: &str = "<!--";
const CLOSE: &str = "-->";

/// A raw value split into text outside and inside comment markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stripped {
    pub outside: String,
    pub inside: Vec<String>,
}

/// Where a cleaned value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSource {
    /// No comment markers were involved.
    Plain,
    /// Text outside the markers; the commented residue was dropped.
    ResidueStripped,
    /// Text found inside comment markers.
    RecoveredFromComment,
}

/// A field value after comment handling and default filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanValue {
    pub text: String,
    pub source: ValueSource,
}

/// Split a value on comment markers. Unterminated comments run to the end;
/// stray closing markers are dropped.
pub fn strip_comments(raw: &str) -> Stripped {
    let mut outside = String::new();
    let mut inside = Vec::new();
    let mut rest = raw;

    while let Some(start) = rest.find(OPEN) {
        outside.push_str(&rest[..start]);
        let body = &rest[start + OPEN.len()..];
        match body.find(CLOSE) {
            Some(end) => {
                push_inner(&mut inside, &body[..end]);
                rest = &body[end + CLOSE.len()..];
            }
            None => {
                push_inner(&mut inside, body);
                rest = "";
            }
        }
    }
    outside.push_str(rest);

    Stripped {
        outside: outside.replace(CLOSE, "").trim().to_string(),
        inside,
    }
}

fn push_inner(inside: &mut Vec<String>, text: &str) {
    let text = text.trim();
    if !text.is_empty() {
        inside.push(text.to_string());
    }
}

/// Clean one raw field value.
///
/// Returns `None` when the field carries no data: empty, a known default,
/// or something that is a known default once the markers are gone.
pub fn clean_value(defaults: &DefaultValueTable, identifier: &str, raw: &str) -> Option<CleanValue> {
    let raw = raw.trim();
    if raw.is_empty() || defaults.is_default(identifier, raw) {
        return None;
    }

    if !raw.contains(OPEN) && !raw.contains(CLOSE) {
        return Some(CleanValue {
            text: raw.to_string(),
            source: ValueSource::Plain,
        });
    }

    let stripped = strip_comments(raw);
    if !stripped.outside.is_empty() {
        if defaults.is_default(identifier, &stripped.outside)
            || defaults.is_stripped_default(identifier, &stripped.outside)
        {
            return None;
        }
        return Some(CleanValue {
            text: stripped.outside,
            source: ValueSource::ResidueStripped,
        });
    }

    let inner = stripped.inside.join(" ");
    if inner.is_empty()
        || defaults.is_default(identifier, &inner)
        || defaults.is_stripped_default(identifier, &inner)
    {
        return None;
    }
    Some(CleanValue {
        text: inner,
        source: ValueSource::RecoveredFromComment,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> DefaultValueTable {
        let mut table = DefaultValueTable::new();
        table.insert("cpu1chip1", "<!-- manuf;model;extra -->");
        table.insert("cpu1chip1", "manuf;model;extra");
        table.insert("cpu1spd", "<!-- e.g. 400 MHz -->");
        table
    }

    #[test]
    fn test_strip_comments() {
        let s = strip_comments("1.2 GHz<!-- 1.2 GHz -->");
        assert_eq!(s.outside, "1.2 GHz");
        assert_eq!(s.inside, vec!["1.2 GHz"]);
    }

    #[test]
    fn test_strip_unterminated_and_stray() {
        let s = strip_comments("abc <!-- never closed");
        assert_eq!(s.outside, "abc");
        assert_eq!(s.inside, vec!["never closed"]);

        let s = strip_comments("value -->");
        assert_eq!(s.outside, "value");
        assert!(s.inside.is_empty());
    }

    #[test]
    fn test_outside_text_wins() {
        let value = clean_value(&table(), "cpu1spd", "1.2 GHz<!-- 1.2 GHz -->").unwrap();
        assert_eq!(value.text, "1.2 GHz");
        assert_eq!(value.source, ValueSource::ResidueStripped);
    }

    #[test]
    fn test_pure_default_is_absent() {
        assert_eq!(clean_value(&table(), "cpu1chip1", "<!-- manuf;model;extra -->"), None);
        assert_eq!(clean_value(&table(), "cpu1chip1", "  "), None);
    }

    #[test]
    fn test_inner_default_after_stripping_is_absent() {
        // different spacing than the registered raw default
        assert_eq!(clean_value(&table(), "cpu1chip1", "<!--manuf;model;extra-->"), None);
    }

    #[test]
    fn test_respaced_field_defaults_are_absent() {
        let builtin = DefaultValueTable::builtin();
        assert_eq!(clean_value(&builtin, "cpu1spd", "<!--e.g. 400 MHz-->"), None);
        assert_eq!(clean_value(&builtin, "fla1amt", "<!--  MiB -->"), None);
        assert_eq!(clean_value(&builtin, "serial", "<!--yes/no-->"), None);
        assert_eq!(clean_value(&builtin, "fccapprovaldate", "<!--mm/dd/yyyy-->"), None);
        assert_eq!(clean_value(&builtin, "manuf", "ODM <!-- ODM -->"), None);

        let value = clean_value(&builtin, "fla1amt", "<!-- 16 MiB -->").unwrap();
        assert_eq!(value.text, "16 MiB");
        assert_eq!(value.source, ValueSource::RecoveredFromComment);
    }

    #[test]
    fn test_text_inside_markers_is_kept() {
        let value = clean_value(&table(), "cpu1chip1", "<!-- Atheros;AR9344 -->").unwrap();
        assert_eq!(value.text, "Atheros;AR9344");
        assert_eq!(value.source, ValueSource::RecoveredFromComment);
    }

    #[test]
    fn test_substring_of_default_is_data() {
        let value = clean_value(&table(), "cpu1chip1", "manuf;model;extra;v2").unwrap();
        assert_eq!(value.text, "manuf;model;extra;v2");
        assert_eq!(value.source, ValueSource::Plain);
    }
}
