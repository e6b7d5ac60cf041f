//! Cross-wiki link targets.

use crate::device::{normalize_title, CrossLink, Origin};

/// Interwiki prefixes used inside `[[...]]` links.
const INTERWIKI_PREFIXES: &[(&str, Origin)] = &[
    ("wd", Origin::WikiDevi),
    ("wikidevi", Origin::WikiDevi),
    ("tid", Origin::TechInfoDepot),
    ("techinfodepot", Origin::TechInfoDepot),
];

/// Host fragments identifying each wiki in full URLs.
const HOSTS: &[(&str, Origin)] = &[
    ("wikidevi", Origin::WikiDevi),
    ("techinfodepot", Origin::TechInfoDepot),
];

/// Extract the page title from a link field value.
///
/// Accepts a bare title, `[[prefix:Title|label]]` or a URL into the wiki.
pub fn link_target(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    let title = if let Some(inner) = value.strip_prefix("[[") {
        let inner = inner.split("]]").next().unwrap_or(inner);
        let target = inner.split('|').next().unwrap_or(inner);
        strip_interwiki(target).to_string()
    } else if let Some((_, rest)) = value.split_once("://") {
        let path = rest.split_once('/').map(|(_, path)| path)?;
        let path = path
            .trim_start_matches("index.php/")
            .trim_start_matches("index.php?title=")
            .trim_start_matches("wiki/");
        let path = path.split('&').next().unwrap_or(path);
        path.replace("%20", " ")
    } else {
        strip_interwiki(value).to_string()
    };

    let title = normalize_title(&title);
    (!title.is_empty()).then_some(title)
}

fn strip_interwiki(target: &str) -> &str {
    if let Some((prefix, rest)) = target.split_once(':') {
        let prefix = prefix.trim().to_lowercase();
        if INTERWIKI_PREFIXES.iter().any(|(p, _)| *p == prefix) {
            return rest.trim();
        }
    }
    target.trim()
}

/// Which wiki a URL points into, if recognizable.
pub fn url_origin(value: &str) -> Option<Origin> {
    let (_, rest) = value.trim().split_once("://")?;
    let host = rest.split('/').next()?.to_lowercase();
    HOSTS
        .iter()
        .find(|(fragment, _)| host.contains(fragment))
        .map(|(_, origin)| *origin)
}

/// Build a link from a field value, ignoring links back into the own wiki.
pub fn cross_link(own: Origin, target_origin: Origin, value: &str) -> Option<CrossLink> {
    if own == target_origin {
        return None;
    }
    link_target(value).map(|title| CrossLink::new(target_origin, title))
}
