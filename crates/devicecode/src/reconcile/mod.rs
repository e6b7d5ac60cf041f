//! Cross-origin reconciliation.
//!
//! Declared cross-wiki links form a directed [`LinkGraph`]. Each linked
//! TechInfoDepot/WikiDevi pair is classified:
//!
//! - **bidirectional**: both pages link to each other, merged with high
//!   confidence
//! - **inconsistent**: the target links to some other record, reported and
//!   never merged
//! - **one-way**: merged with medium confidence only when a model name, a
//!   product FCC id or a PCB id matches as well
//!
//! Unlinked pairs with matching attributes are only ever suggestions.
//! OpenWrt rows never anchor a group; they join one the other two origins
//! already formed when they link to a member and are corroborated.

mod engine;
mod graph;
mod report;
mod squash;

pub use engine::{attribute_matches, model_key, reconcile, Reconciler};
pub use graph::LinkGraph;
pub use report::{
    Ambiguity, AmbiguityKind, AttributeMatch, Confidence, Evidence, LinkDirection, MergeGroup,
    ReconciliationReport,
};
pub use squash::{squash, squash_all, FieldConflict, SquashResult};
