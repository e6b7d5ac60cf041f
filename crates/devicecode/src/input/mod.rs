//! Raw page sources.
//!
//! Wiki dumps and the OpenWrt table of hardware are read into [`RawPage`]s:
//! flat key/value fields plus free-text sections, before any normalization.

mod dump;
mod openwrt;
mod page;
mod source;
mod wikitext;

pub use dump::{pages_from_dump, parse_dump, read_dump, DumpPage, HELPER_PAGE_SUFFIXES};
pub use openwrt::{pages_from_table, TableConfig, TableReader, HWDATA_PREFIX};
pub use page::{RawField, RawPage, RawSection};
pub use source::{hash_bytes, DataTable, SourceMetadata};
pub use wikitext::{page_from_wikitext, sections, templates, Template, TemplateParam};
