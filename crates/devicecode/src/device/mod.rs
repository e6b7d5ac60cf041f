//! Canonical device data model.
//!
//! One [`CanonicalDevice`] exists per (origin, wiki page). Records are
//! immutable once built; reconciliation and overlays work on copies.

mod chip;
mod origin;
mod record;

pub use chip::{ChipCategory, ChipInfo, ChipSlot};
pub use origin::{normalize_title, DeviceKey, Origin};
pub use record::{
    Bootloader, CanonicalDevice, Connectivity, Credentials, CrossLink, FccId, FccType, Identity,
    Manufacturer, ModuleLicense, Package, PasswordState, PortInfo, Regulatory, Sdk, Software,
    Tristate,
};
