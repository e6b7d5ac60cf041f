//! DeviceCode: normalize, reconcile and query crowdsourced device wiki data.
//!
//! Device pages from TechInfoDepot and WikiDevi dumps and rows from the
//! OpenWrt table of hardware are turned into one [`CanonicalDevice`] each.
//! Records from different wikis describing the same hardware are grouped by
//! the reconciliation engine, and a small filter language selects records.
//!
//! # Core Principles
//!
//! - **Lossless**: messy values are kept with a quality note, never dropped
//! - **Read-only records**: reconciliation and overlays work on copies
//! - **Explainable merges**: every merge group carries its evidence
//!
//! # Example
//!
//! ```no_run
//! use devicecode::{DeviceCode, Origin};
//!
//! let dc = DeviceCode::new();
//! let result = dc.process("wikidevi.xml", Origin::WikiDevi).unwrap();
//!
//! println!("Devices: {}", result.summary.devices);
//! let asus = dc.search(&result.report.devices, "brand=asus serial=yes").unwrap();
//! println!("Asus with serial port: {}", asus.len());
//! ```

pub mod builder;
pub mod device;
pub mod error;
pub mod input;
pub mod normalize;
pub mod query;
pub mod reconcile;
pub mod reference;
pub mod store;

mod devicecode;

pub use crate::devicecode::{BuildResult, BuildSummary, DeviceCode, DeviceCodeConfig};
pub use builder::{BuildReport, PageFailure, RecordBuilder};
pub use device::{CanonicalDevice, DeviceKey, Origin};
pub use error::{DeviceCodeError, Result};
pub use input::{RawPage, SourceMetadata};
pub use normalize::{NoteKind, QualityNote, Severity};
pub use query::Query;
pub use reconcile::{MergeGroup, ReconciliationReport};
pub use reference::ReferenceData;
pub use store::{DeviceStore, Overlay};
