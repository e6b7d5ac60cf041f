//! Reconciliation output: merge groups, evidence and ambiguities.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::device::DeviceKey;

/// How sure the engine is that a group denotes one physical device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn label(&self) -> &'static str {
        match self {
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::High => "high",
        }
    }
}

/// Which way a declared link points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkDirection {
    /// Both pages link to each other.
    Bidirectional,
    /// Only `from` links to `to`.
    OneWay,
}

/// An attribute two records share.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "attribute", content = "value")]
pub enum AttributeMatch {
    /// Same brand and model after normalization.
    Model(String),
    /// Same FCC id identifying the product.
    FccId(String),
    PcbId(String),
}

/// Why two records were put together (or considered).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Evidence {
    Link {
        from: DeviceKey,
        to: DeviceKey,
        direction: LinkDirection,
    },
    Attribute {
        a: DeviceKey,
        b: DeviceKey,
        matched: AttributeMatch,
    },
}

/// A set of records believed to describe the same device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeGroup {
    pub id: String,
    pub members: Vec<DeviceKey>,
    pub confidence: Confidence,
    pub evidence: Vec<Evidence>,
}

impl MergeGroup {
    pub fn contains(&self, key: &DeviceKey) -> bool {
        self.members.contains(key)
    }
}

/// Kind of case left for a human (or an overlay) to decide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmbiguityKind {
    /// A links to B, but B links to a different record.
    InconsistentLink,
    /// One-way link without any attribute backing it up.
    UncorroboratedLink,
    /// No link, but attributes match.
    Suggestion,
    /// Link to a page that is not in the record set.
    DanglingLink,
    /// Merging would put two records of one origin in a group.
    OriginCollision,
    /// OpenWrt record that could not be attached to an established group.
    UnanchoredOpenWrt,
}

impl AmbiguityKind {
    pub fn label(&self) -> &'static str {
        match self {
            AmbiguityKind::InconsistentLink => "inconsistent_link",
            AmbiguityKind::UncorroboratedLink => "uncorroborated_link",
            AmbiguityKind::Suggestion => "suggestion",
            AmbiguityKind::DanglingLink => "dangling_link",
            AmbiguityKind::OriginCollision => "origin_collision",
            AmbiguityKind::UnanchoredOpenWrt => "unanchored_openwrt",
        }
    }
}

/// One case the engine refused to decide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ambiguity {
    pub kind: AmbiguityKind,
    pub members: Vec<DeviceKey>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub evidence: Vec<Evidence>,
    pub note: String,
}

impl Ambiguity {
    pub fn new(kind: AmbiguityKind, members: Vec<DeviceKey>, note: impl Into<String>) -> Self {
        Self {
            kind,
            members,
            evidence: Vec::new(),
            note: note.into(),
        }
    }

    pub fn with_evidence(mut self, evidence: Vec<Evidence>) -> Self {
        self.evidence = evidence;
        self
    }
}

/// Full engine output. Recomputed on demand, never the source of truth.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReconciliationReport {
    pub device_count: usize,
    pub groups: Vec<MergeGroup>,
    pub ambiguities: Vec<Ambiguity>,
}

impl ReconciliationReport {
    /// Group holding a record, if any.
    pub fn group_of(&self, key: &DeviceKey) -> Option<&MergeGroup> {
        self.groups.iter().find(|g| g.contains(key))
    }

    pub fn ambiguities_of(&self, kind: AmbiguityKind) -> impl Iterator<Item = &Ambiguity> {
        self.ambiguities.iter().filter(move |a| a.kind == kind)
    }

    pub fn ambiguity_counts(&self) -> BTreeMap<AmbiguityKind, usize> {
        let mut counts = BTreeMap::new();
        for ambiguity in &self.ambiguities {
            *counts.entry(ambiguity.kind).or_insert(0) += 1;
        }
        counts
    }

    /// Number of records placed in some group.
    pub fn merged_count(&self) -> usize {
        self.groups.iter().map(|g| g.members.len()).sum()
    }
}
