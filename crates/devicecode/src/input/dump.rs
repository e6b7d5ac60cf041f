//! MediaWiki XML export reader.
//!
//! Only article pages (namespace 0) are kept. Category and list pages are
//! skipped, and helper pages (`<Parent>/boot log` and friends) are folded
//! into their parent page's sections.

use std::collections::HashMap;
use std::path::Path;

use quick_xml::Reader;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::Event;
use tracing::debug;

use crate::device::{normalize_title, Origin};
use crate::error::{DeviceCodeError, Result};

use super::page::{RawPage, RawSection};
use super::source::{read_with_hash, SourceMetadata};
use super::wikitext::{page_from_wikitext, sections};

/// Title suffixes of pages that only carry logs for a parent device.
pub const HELPER_PAGE_SUFFIXES: &[&str] = &[
    "/boot log",
    "/boot logs",
    "/bootlog",
    "/serial",
    "/serial console",
    "/console",
    "/dmesg",
    "/uart",
];

/// One article from a dump, before template extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpPage {
    pub title: String,
    pub namespace: i64,
    /// Wikitext of the last revision in the dump.
    pub text: String,
}

impl DumpPage {
    /// Whether this page holds device data rather than wiki furniture.
    pub fn is_article(&self) -> bool {
        self.namespace == 0
            && !self.title.starts_with("Category:")
            && !self.title.starts_with("List of ")
    }

    /// Parent title when this is a helper page.
    pub fn helper_parent(&self) -> Option<&str> {
        let lower = self.title.to_lowercase();
        HELPER_PAGE_SUFFIXES
            .iter()
            .find(|suffix| lower.ends_with(*suffix))
            .map(|suffix| &self.title[..self.title.len() - suffix.len()])
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Element {
    Other,
    Title,
    Namespace,
    Text,
}

/// Read every page of a dump file.
pub fn read_dump(path: impl AsRef<Path>) -> Result<(Vec<DumpPage>, SourceMetadata)> {
    let path = path.as_ref();
    let (contents, hash) = read_with_hash(path)?;
    let text = String::from_utf8_lossy(&contents);

    let pages = parse_dump(&text).map_err(|message| DeviceCodeError::Dump {
        path: path.to_path_buf(),
        message,
    })?;

    let metadata = SourceMetadata::new(
        path.to_path_buf(),
        hash,
        contents.len() as u64,
        "mediawiki-xml",
        pages.len(),
    );
    debug!(file = %metadata.file, pages = pages.len(), "read dump");
    Ok((pages, metadata))
}

/// Parse dump XML held in memory. Errors are reported as plain messages.
pub fn parse_dump(xml: &str) -> std::result::Result<Vec<DumpPage>, String> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();

    let mut pages = Vec::new();
    let mut current: Option<DumpPage> = None;
    let mut element = Element::Other;
    let mut value = String::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"page" => {
                    current = Some(DumpPage {
                        title: String::new(),
                        namespace: 0,
                        text: String::new(),
                    })
                }
                b"title" => start(&mut element, &mut value, Element::Title),
                b"ns" => start(&mut element, &mut value, Element::Namespace),
                b"text" => start(&mut element, &mut value, Element::Text),
                _ => {}
            },
            Ok(Event::Text(ref e)) if element != Element::Other => {
                let text = e.decode().map_err(|e| e.to_string())?;
                value.push_str(&text);
            }
            Ok(Event::CData(ref e)) if element != Element::Other => {
                value.push_str(&String::from_utf8_lossy(e.as_ref()));
            }
            Ok(Event::GeneralRef(ref e)) if element != Element::Other => {
                if let Some(ch) = e.resolve_char_ref().map_err(|e| e.to_string())? {
                    value.push(ch);
                } else {
                    let name = e.decode().map_err(|e| e.to_string())?;
                    match resolve_predefined_entity(&name) {
                        Some(resolved) => value.push_str(resolved),
                        None => {
                            value.push('&');
                            value.push_str(&name);
                            value.push(';');
                        }
                    }
                }
            }
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"page" => {
                    if let Some(page) = current.take() {
                        pages.push(page);
                    }
                }
                b"title" | b"ns" | b"text" => {
                    if let Some(page) = current.as_mut() {
                        match element {
                            Element::Title => page.title = value.trim().to_string(),
                            Element::Namespace => {
                                page.namespace = value.trim().parse().map_err(|_| {
                                    format!("bad namespace '{}' for page '{}'", value.trim(), page.title)
                                })?
                            }
                            // later revisions replace earlier ones
                            Element::Text => page.text = std::mem::take(&mut value),
                            Element::Other => {}
                        }
                    }
                    element = Element::Other;
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(format!(
                    "XML error at position {}: {}",
                    reader.buffer_position(),
                    e
                ))
            }
            _ => {}
        }
        buf.clear();
    }

    if current.is_some() {
        return Err("dump ends inside a page".to_string());
    }
    Ok(pages)
}

fn start(element: &mut Element, value: &mut String, next: Element) {
    *element = next;
    value.clear();
}

/// Turn dump pages into raw pages, folding helper pages into their parent.
///
/// Helper pages whose parent is missing from the dump are dropped. With
/// `skip_helpers`, helper pages are dropped unconditionally.
pub fn pages_from_dump(dump: &[DumpPage], origin: Origin, skip_helpers: bool) -> Vec<RawPage> {
    let mut pages = Vec::new();
    let mut by_title: HashMap<String, usize> = HashMap::new();
    let mut helpers = Vec::new();

    for page in dump.iter().filter(|p| p.is_article()) {
        if page.helper_parent().is_some() {
            helpers.push(page);
            continue;
        }
        by_title.insert(normalize_title(&page.title), pages.len());
        pages.push(page_from_wikitext(origin, &page.title, &page.text));
    }

    if skip_helpers {
        return pages;
    }

    for helper in helpers {
        let Some(parent) = helper.helper_parent() else { continue };
        let Some(&index) = by_title.get(&normalize_title(parent)) else {
            debug!(title = %helper.title, "helper page without parent");
            continue;
        };

        let mut found = sections(&helper.text);
        if found.is_empty() {
            let heading = helper.title[parent.len()..].trim_start_matches('/').to_string();
            found.push(RawSection {
                heading,
                body: helper.text.trim().to_string(),
            });
        }
        for mut section in found {
            section.body = section.body.replace("<pre>", "").replace("</pre>", "");
            pages[index].sections.push(section);
        }
    }
    pages
}

#[cfg(test)]
mod tests {
    use super::*;

    const DUMP: &str = r#"<mediawiki xmlns="http://www.mediawiki.org/xml/export-0.10/">
  <siteinfo><sitename>WikiDevi</sitename></siteinfo>
  <page>
    <title>ASUS RT-N66U</title>
    <ns>0</ns>
    <id>1</id>
    <revision>
      <id>10</id>
      <text xml:space="preserve">{{Wireless embedded system
|brand=ASUS
|model=RT-N66U &amp; more
}}</text>
    </revision>
  </page>
  <page>
    <title>ASUS RT-N66U/boot log</title>
    <ns>0</ns>
    <revision><text>&lt;pre&gt;BusyBox v1.17.4 (2012-01-01)&lt;/pre&gt;</text></revision>
  </page>
  <page>
    <title>Category:Routers</title>
    <ns>14</ns>
    <revision><text>x</text></revision>
  </page>
  <page>
    <title>List of Broadcom devices</title>
    <ns>0</ns>
    <revision><text>x</text></revision>
  </page>
</mediawiki>"#;

    #[test]
    fn test_parse_dump_pages() {
        let pages = parse_dump(DUMP).unwrap();
        assert_eq!(pages.len(), 4);
        assert_eq!(pages[0].title, "ASUS RT-N66U");
        assert!(pages[0].text.contains("RT-N66U & more"));
        assert_eq!(pages[2].namespace, 14);
    }

    #[test]
    fn test_article_filter() {
        let pages = parse_dump(DUMP).unwrap();
        let articles: Vec<_> = pages.iter().filter(|p| p.is_article()).collect();
        assert_eq!(articles.len(), 2);
    }

    #[test]
    fn test_helper_page_folded_into_parent() {
        let dump = parse_dump(DUMP).unwrap();
        let pages = pages_from_dump(&dump, Origin::WikiDevi, false);
        assert_eq!(pages.len(), 1);
        let page = &pages[0];
        assert_eq!(page.first("model"), Some("RT-N66U & more"));
        let log = page.sections.iter().find(|s| s.heading == "boot log").unwrap();
        assert!(log.body.starts_with("BusyBox v1.17.4"));
        assert!(log.is_log());
    }

    #[test]
    fn test_skip_helpers() {
        let dump = parse_dump(DUMP).unwrap();
        let pages = pages_from_dump(&dump, Origin::WikiDevi, true);
        assert!(pages[0].sections.is_empty());
    }

    #[test]
    fn test_truncated_dump_is_error() {
        assert!(parse_dump("<mediawiki><page><title>X</title>").is_err());
    }

    #[test]
    fn test_read_dump_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wikidevi.xml");
        std::fs::write(&path, DUMP).unwrap();
        let (pages, metadata) = read_dump(&path).unwrap();
        assert_eq!(pages.len(), 4);
        assert_eq!(metadata.format, "mediawiki-xml");
        assert_eq!(metadata.page_count, 4);
    }
}
