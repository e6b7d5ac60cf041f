//! Minimal wikitext reader: top-level templates and `== headed ==` sections.

use crate::device::Origin;

use super::page::{RawField, RawPage, RawSection};

/// Infobox templates that describe a device.
const DEVICE_TEMPLATES: &[&str] = &[
    "wireless embedded system",
    "wired embedded system",
    "infobox embedded system",
    "infobox network device",
];

/// Collapsible text blocks, used for boot logs.
const COLLAPSE_TEMPLATES: &[&str] = &["scollapse", "scollapse2"];

/// A template invocation with its parameters in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub name: String,
    pub params: Vec<TemplateParam>,
    /// Everything between the braces, untouched.
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateParam {
    /// `None` for positional parameters.
    pub name: Option<String>,
    pub value: String,
}

impl Template {
    /// Positional parameters only.
    pub fn positional(&self) -> impl Iterator<Item = &str> {
        self.params
            .iter()
            .filter(|p| p.name.is_none())
            .map(|p| p.value.as_str())
    }
}

/// Nesting-aware scanner state shared by the splitting helpers.
struct Scan<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Scan<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            bytes: text.as_bytes(),
            pos: 0,
        }
    }

    fn starts_with(&self, marker: &[u8]) -> bool {
        self.bytes[self.pos..].starts_with(marker)
    }

    /// Skip an HTML comment at the current position; true if one was skipped.
    fn skip_comment(&mut self) -> bool {
        if !self.starts_with(b"<!--") {
            return false;
        }
        let rest = &self.bytes[self.pos + 4..];
        self.pos = match rest.windows(3).position(|w| w == b"-->") {
            Some(end) => self.pos + 4 + end + 3,
            None => self.bytes.len(),
        };
        true
    }
}

/// Split on `sep` where it is not nested in `{{ }}`, `[[ ]]` or a comment.
fn split_top_level(text: &str, sep: u8) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut scan = Scan::new(text);
    let mut depth = 0usize;
    let mut start = 0;

    while scan.pos < scan.bytes.len() {
        if scan.skip_comment() {
            continue;
        }
        if scan.starts_with(b"{{") || scan.starts_with(b"[[") {
            depth += 1;
            scan.pos += 2;
            continue;
        }
        if (scan.starts_with(b"}}") || scan.starts_with(b"]]")) && depth > 0 {
            depth -= 1;
            scan.pos += 2;
            continue;
        }
        if depth == 0 && scan.bytes[scan.pos] == sep {
            parts.push(&text[start..scan.pos]);
            start = scan.pos + 1;
        }
        scan.pos += 1;
    }
    parts.push(&text[start..]);
    parts
}

/// Find all top-level templates in a page.
pub fn templates(text: &str) -> Vec<Template> {
    let mut found = Vec::new();
    let mut scan = Scan::new(text);

    while scan.pos < scan.bytes.len() {
        if scan.skip_comment() {
            continue;
        }
        if !scan.starts_with(b"{{") {
            scan.pos += 1;
            continue;
        }

        let body_start = scan.pos + 2;
        let mut depth = 1usize;
        scan.pos += 2;
        while scan.pos < scan.bytes.len() && depth > 0 {
            if scan.skip_comment() {
                continue;
            }
            if scan.starts_with(b"{{") {
                depth += 1;
                scan.pos += 2;
            } else if scan.starts_with(b"}}") {
                depth -= 1;
                scan.pos += 2;
            } else {
                scan.pos += 1;
            }
        }
        if depth > 0 {
            // unterminated template
            break;
        }
        found.push(parse_template(&text[body_start..scan.pos - 2]));
    }
    found
}

fn parse_template(body: &str) -> Template {
    let mut parts = split_top_level(body, b'|').into_iter();
    let name = parts.next().unwrap_or("").trim().to_string();

    let params = parts
        .map(|part| {
            let pieces = split_top_level(part, b'=');
            if pieces.len() > 1 && is_param_name(pieces[0]) {
                let value = &part[pieces[0].len() + 1..];
                TemplateParam {
                    name: Some(pieces[0].trim().to_string()),
                    value: value.trim().to_string(),
                }
            } else {
                TemplateParam {
                    name: None,
                    value: part.trim().to_string(),
                }
            }
        })
        .collect();

    Template {
        name,
        params,
        body: body.to_string(),
    }
}

fn is_param_name(text: &str) -> bool {
    let name = text.trim();
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == ' ' || c == '-')
}

/// Split `== Heading ==` sections. Text before the first heading is skipped.
pub fn sections(text: &str) -> Vec<RawSection> {
    let mut found = Vec::new();
    let mut current: Option<(String, Vec<&str>)> = None;

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.len() > 4 && trimmed.starts_with("==") && trimmed.ends_with("==") {
            if let Some((heading, body)) = current.take() {
                found.push(RawSection {
                    heading,
                    body: body.join("\n").trim().to_string(),
                });
            }
            current = Some((trimmed.trim_matches('=').trim().to_string(), Vec::new()));
        } else if let Some((_, body)) = current.as_mut() {
            body.push(line);
        }
    }
    if let Some((heading, body)) = current {
        found.push(RawSection {
            heading,
            body: body.join("\n").trim().to_string(),
        });
    }
    found
}

fn strip_pre(text: &str) -> String {
    text.replace("<pre>", "").replace("</pre>", "").trim().to_string()
}

/// Build a raw page from wikitext.
///
/// The device infobox becomes one [`RawField`] per value line. Collapsible
/// blocks and headed sections become [`RawSection`]s.
pub fn page_from_wikitext(origin: Origin, title: &str, text: &str) -> RawPage {
    let mut page = RawPage::new(origin, title);

    for template in templates(text) {
        let lower = template.name.to_lowercase();
        if DEVICE_TEMPLATES.contains(&lower.as_str()) {
            if page.template.is_none() {
                page.template = Some(template.name.clone());
            }
            for param in &template.params {
                let Some(key) = &param.name else { continue };
                let key = key.to_lowercase();
                for line in split_top_level(&param.value, b'\n') {
                    let line = line.trim();
                    if !line.is_empty() {
                        page.fields.push(RawField::new(key.clone(), line));
                    }
                }
            }
        } else if COLLAPSE_TEMPLATES.contains(&lower.as_str()) {
            // log text may contain '|', so take the raw remainder
            let parts = split_top_level(&template.body, b'|');
            if parts.len() >= 3 {
                let offset = parts[0].len() + parts[1].len() + 2;
                page.sections.push(RawSection {
                    heading: parts[1].trim().to_string(),
                    body: strip_pre(&template.body[offset..]),
                });
            }
        } else if lower == "techinfodepot" || lower == "wikidevi" {
            if let Some(target) = template.positional().next() {
                page.fields.push(RawField::new(lower, target));
            }
        } else if lower == "tagline" {
            if let Some(tagline) = template.positional().next() {
                page.fields.push(RawField::new("tagline", tagline));
            }
        } else if lower == "wificert" {
            let mut positional = template.positional();
            if let Some(id) = positional.next() {
                page.fields.push(RawField::new("wifi_cert_id", id));
            }
            if let Some(date) = positional.next() {
                page.fields.push(RawField::new("wifi_cert_date", date));
            }
        }
    }

    for mut section in sections(text) {
        section.body = strip_pre(&section.body);
        page.sections.push(section);
    }
    page
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "\
{{Wireless embedded system
|brand=Asus
|model=RT-N66U
|cpu1chip1=Broadcom;BCM4706<!-- manuf;model;extra -->
|type=router
access point
|fcc_id=MSQ-RTN66U
|wikidevi=[[wd:ASUS RT-N66U|ASUS RT-N66U]]
|serial=yes, J2, {{Pin|4}}
}}
{{TagLine|Dual band gigabit router}}

== Boot log ==
{{SCollapse|Serial console output|<pre>CFE version 5.100 | x</pre>}}
<pre>Linux version 2.6.22</pre>
";

    #[test]
    fn test_templates_top_level_only() {
        let found = templates(PAGE);
        let names: Vec<_> = found.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Wireless embedded system", "TagLine", "SCollapse"]);
    }

    #[test]
    fn test_params_respect_nesting() {
        let found = templates(PAGE);
        let infobox = &found[0];
        let wikidevi = infobox
            .params
            .iter()
            .find(|p| p.name.as_deref() == Some("wikidevi"))
            .unwrap();
        assert_eq!(wikidevi.value, "[[wd:ASUS RT-N66U|ASUS RT-N66U]]");
        let serial = infobox
            .params
            .iter()
            .find(|p| p.name.as_deref() == Some("serial"))
            .unwrap();
        assert_eq!(serial.value, "yes, J2, {{Pin|4}}");
    }

    #[test]
    fn test_page_fields_one_per_line() {
        let page = page_from_wikitext(Origin::TechInfoDepot, "Asus RT-N66U", PAGE);
        assert_eq!(page.template.as_deref(), Some("Wireless embedded system"));
        assert_eq!(page.values("type").collect::<Vec<_>>(), vec!["router", "access point"]);
        assert_eq!(page.first("cpu1chip1"), Some("Broadcom;BCM4706<!-- manuf;model;extra -->"));
        assert_eq!(page.first("tagline"), Some("Dual band gigabit router"));
    }

    #[test]
    fn test_sections_and_collapse() {
        let page = page_from_wikitext(Origin::TechInfoDepot, "Asus RT-N66U", PAGE);
        let collapse = page
            .sections
            .iter()
            .find(|s| s.heading == "Serial console output")
            .unwrap();
        assert_eq!(collapse.body, "CFE version 5.100 | x");
        let boot = page.sections.iter().find(|s| s.heading == "Boot log").unwrap();
        assert!(boot.body.contains("Linux version 2.6.22"));
    }

    #[test]
    fn test_comment_hides_separators() {
        let found = templates("{{Infobox Embedded System|brand=<!-- a|b }} -->Netgear}}");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].params.len(), 1);
        assert_eq!(found[0].params[0].value, "<!-- a|b }} -->Netgear");
    }

    #[test]
    fn test_unterminated_template_ignored() {
        assert!(templates("{{Wireless embedded system|brand=Asus").is_empty());
    }
}
