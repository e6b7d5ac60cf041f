//! Persistence of canonical records and overlays.
//!
//! Every record is one pretty-printed JSON file. Overlays live next to the
//! records and are composed onto them when loading; the stored base records
//! are never rewritten by an overlay.

mod device_store;
mod overlay;

pub use device_store::{file_stem, DeviceStore, StoreSummary, WriteStatus};
pub use overlay::{compose, deep_merge, Overlay, OVERLAY_TYPE};
