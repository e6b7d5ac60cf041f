//! Raw per-page key/value data, as handed to the record builder.

use serde::{Deserialize, Serialize};

use crate::device::Origin;

/// A single template key and its raw value. May still carry comment residue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawField {
    pub key: String,
    pub value: String,
}

impl RawField {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A titled block of free text (boot log, console dump, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSection {
    pub heading: String,
    pub body: String,
}

impl RawSection {
    /// Whether the section holds console output worth mining.
    pub fn is_log(&self) -> bool {
        let heading = self.heading.to_lowercase();
        ["log", "boot", "serial", "console", "dmesg", "uart"]
            .iter()
            .any(|word| heading.contains(word))
    }
}

/// One source page before normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPage {
    pub origin: Origin,
    pub title: String,
    /// Name of the device infobox template, if the page has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(default)]
    pub fields: Vec<RawField>,
    #[serde(default)]
    pub sections: Vec<RawSection>,
}

impl RawPage {
    pub fn new(origin: Origin, title: impl Into<String>) -> Self {
        Self {
            origin,
            title: title.into(),
            template: None,
            fields: Vec::new(),
            sections: Vec::new(),
        }
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push(RawField::new(key, value));
        self
    }

    pub fn with_section(mut self, heading: impl Into<String>, body: impl Into<String>) -> Self {
        self.sections.push(RawSection {
            heading: heading.into(),
            body: body.into(),
        });
        self
    }

    /// All raw values for a key (case-insensitive), in page order.
    pub fn values<'a, 'k>(
        &'a self,
        key: &'k str,
    ) -> impl Iterator<Item = &'a str> + use<'a, 'k> {
        self.fields
            .iter()
            .filter(move |f| f.key.eq_ignore_ascii_case(key))
            .map(|f| f.value.as_str())
    }

    /// First raw value for a key.
    pub fn first(&self, key: &str) -> Option<&str> {
        self.values(key).next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_case_insensitive() {
        let page = RawPage::new(Origin::TechInfoDepot, "X")
            .with_field("Brand", "Asus")
            .with_field("type", "router")
            .with_field("TYPE", "access point");
        assert_eq!(page.first("brand"), Some("Asus"));
        assert_eq!(page.values("type").collect::<Vec<_>>(), vec!["router", "access point"]);
        assert_eq!(page.first("model"), None);
    }

    #[test]
    fn test_value_outlives_lookup_key() {
        let page = RawPage::new(Origin::WikiDevi, "X").with_field("brand", "Asus");
        let brand = {
            let key = String::from("BRAND");
            page.first(&key)
        };
        assert_eq!(brand, Some("Asus"));
    }

    #[test]
    fn test_section_is_log() {
        let page = RawPage::new(Origin::WikiDevi, "X")
            .with_section("Boot log", "...")
            .with_section("Photos", "...");
        assert!(page.sections[0].is_log());
        assert!(!page.sections[1].is_log());
    }
}
