//! Link classification and grouping.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::{debug, info};

use crate::device::{CanonicalDevice, DeviceKey, Origin};

use super::graph::LinkGraph;
use super::report::{
    Ambiguity, AmbiguityKind, AttributeMatch, Confidence, Evidence, LinkDirection, MergeGroup,
    ReconciliationReport,
};

/// Attributes two records share, in a stable order.
pub fn attribute_matches(a: &CanonicalDevice, b: &CanonicalDevice) -> Vec<AttributeMatch> {
    let mut matches = Vec::new();

    if let (Some(ka), Some(kb)) = (model_key(a), model_key(b)) {
        if ka == kb {
            matches.push(AttributeMatch::Model(ka));
        }
    }

    let b_ids: BTreeSet<String> = b.product_fcc_ids().map(str::to_uppercase).collect();
    let mut shared: Vec<String> = a
        .product_fcc_ids()
        .map(str::to_uppercase)
        .filter(|id| b_ids.contains(id))
        .collect();
    shared.sort();
    shared.dedup();
    matches.extend(shared.into_iter().map(AttributeMatch::FccId));

    if let (Some(pa), Some(pb)) = (pcb_key(a), pcb_key(b)) {
        if pa == pb {
            matches.push(AttributeMatch::PcbId(pa));
        }
    }

    matches
}

/// Brand and model reduced to lowercase alphanumerics, e.g. `tplink archerc7`.
pub fn model_key(device: &CanonicalDevice) -> Option<String> {
    let squash = |s: &str| -> String {
        s.chars()
            .filter(|c| c.is_alphanumeric())
            .flat_map(char::to_lowercase)
            .collect()
    };
    let brand = squash(&device.identity.brand);
    let model = squash(&device.identity.model);
    if brand.is_empty() || model.is_empty() {
        return None;
    }
    Some(format!("{} {}", brand, model))
}

fn pcb_key(device: &CanonicalDevice) -> Option<String> {
    device
        .regulatory
        .pcb_id
        .as_deref()
        .map(|p| p.trim().to_uppercase())
        .filter(|p| !p.is_empty())
}

/// A pair the classifier accepted for merging.
struct Edge {
    a: usize,
    b: usize,
    confidence: Confidence,
    evidence: Vec<Evidence>,
}

/// Union-find over record indices that never lets two records of one
/// origin share a set.
struct Partition {
    parent: Vec<usize>,
    origins: Vec<u8>,
    size: Vec<usize>,
    confidence: Vec<Confidence>,
    evidence: Vec<Vec<Evidence>>,
}

fn origin_bit(origin: Origin) -> u8 {
    match origin {
        Origin::TechInfoDepot => 1,
        Origin::WikiDevi => 2,
        Origin::OpenWrt => 4,
    }
}

impl Partition {
    fn new(devices: &[CanonicalDevice]) -> Self {
        let n = devices.len();
        Self {
            parent: (0..n).collect(),
            origins: devices.iter().map(|d| origin_bit(d.origin)).collect(),
            size: vec![1; n],
            confidence: vec![Confidence::High; n],
            evidence: vec![Vec::new(); n],
        }
    }

    fn find(&mut self, mut i: usize) -> usize {
        let mut root = i;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        while self.parent[i] != root {
            let next = self.parent[i];
            self.parent[i] = root;
            i = next;
        }
        root
    }

    fn origins_of(&mut self, i: usize) -> u8 {
        let root = self.find(i);
        self.origins[root]
    }

    fn group_size(&mut self, i: usize) -> usize {
        let root = self.find(i);
        self.size[root]
    }

    /// Join the sets of `edge.a` and `edge.b`. Returns false when both sets
    /// already hold a record of the same origin.
    fn union(&mut self, edge: Edge) -> bool {
        let ra = self.find(edge.a);
        let rb = self.find(edge.b);
        if ra == rb {
            self.evidence[ra].extend(edge.evidence);
            return true;
        }
        if self.origins[ra] & self.origins[rb] != 0 {
            return false;
        }
        let (root, child) = if self.size[ra] >= self.size[rb] { (ra, rb) } else { (rb, ra) };
        self.parent[child] = root;
        self.size[root] += self.size[child];
        self.origins[root] |= self.origins[child];
        self.confidence[root] = self.confidence[root]
            .min(self.confidence[child])
            .min(edge.confidence);
        let moved = std::mem::take(&mut self.evidence[child]);
        self.evidence[root].extend(moved);
        self.evidence[root].extend(edge.evidence);
        true
    }
}

/// Groups records of different origins that describe the same device.
///
/// The reconciler only reads its input. Its output is a fresh
/// [`ReconciliationReport`] every time.
pub struct Reconciler<'a> {
    devices: &'a [CanonicalDevice],
    keys: Vec<DeviceKey>,
    index: HashMap<DeviceKey, usize>,
    graph: LinkGraph,
    suggestions: bool,
}

impl<'a> Reconciler<'a> {
    pub fn new(devices: &'a [CanonicalDevice]) -> Self {
        let keys: Vec<DeviceKey> = devices.iter().map(CanonicalDevice::key).collect();
        let mut index = HashMap::with_capacity(keys.len());
        for (i, key) in keys.iter().enumerate() {
            index.entry(key.clone()).or_insert(i);
        }
        Self {
            devices,
            keys,
            index,
            graph: LinkGraph::from_devices(devices),
            suggestions: true,
        }
    }

    /// Enable or disable attribute-only suggestions.
    pub fn with_suggestions(mut self, enabled: bool) -> Self {
        self.suggestions = enabled;
        self
    }

    pub fn graph(&self) -> &LinkGraph {
        &self.graph
    }

    /// Run the full classification.
    pub fn run(&self) -> ReconciliationReport {
        let mut ambiguities = self.dangling();
        let mut edges = self.classify_anchor_pairs(&mut ambiguities);

        // Strong links claim records first.
        edges.sort_by(|x, y| {
            y.confidence
                .cmp(&x.confidence)
                .then_with(|| self.keys[x.a].cmp(&self.keys[y.a]))
                .then_with(|| self.keys[x.b].cmp(&self.keys[y.b]))
        });

        let mut partition = Partition::new(self.devices);
        for edge in edges {
            let (a, b) = (edge.a, edge.b);
            let evidence = edge.evidence.clone();
            if !partition.union(edge) {
                ambiguities.push(
                    Ambiguity::new(
                        AmbiguityKind::OriginCollision,
                        vec![self.keys[a].clone(), self.keys[b].clone()],
                        "merging would put two records of one origin in a group",
                    )
                    .with_evidence(evidence),
                );
            }
        }

        self.attach_openwrt(&mut partition, &mut ambiguities);

        if self.suggestions {
            ambiguities.extend(self.suggest());
        }

        let groups = self.collect_groups(&mut partition);
        info!(
            devices = self.devices.len(),
            groups = groups.len(),
            ambiguities = ambiguities.len(),
            "reconciliation finished"
        );

        ReconciliationReport {
            device_count: self.devices.len(),
            groups,
            ambiguities,
        }
    }

    fn dangling(&self) -> Vec<Ambiguity> {
        self.graph
            .dangling()
            .into_iter()
            // Without any record of the target origin every link dangles.
            .filter(|(_, to)| self.graph.has_origin(to.origin))
            .map(|(from, to)| {
                Ambiguity::new(
                    AmbiguityKind::DanglingLink,
                    vec![from.clone()],
                    format!("links to missing page {}", to),
                )
            })
            .collect()
    }

    /// Classify every linked TechInfoDepot/WikiDevi pair.
    fn classify_anchor_pairs(&self, ambiguities: &mut Vec<Ambiguity>) -> Vec<Edge> {
        let mut pairs: BTreeSet<(usize, usize)> = BTreeSet::new();
        for (from, to) in self.graph.edges() {
            let (Some(&i), Some(&j)) = (self.index.get(from), self.index.get(to)) else {
                continue;
            };
            match (from.origin, to.origin) {
                (Origin::TechInfoDepot, Origin::WikiDevi) => {
                    pairs.insert((i, j));
                }
                (Origin::WikiDevi, Origin::TechInfoDepot) => {
                    pairs.insert((j, i));
                }
                _ => {}
            }
        }

        let mut edges = Vec::new();
        for (tid, wd) in pairs {
            let (tk, wk) = (&self.keys[tid], &self.keys[wd]);
            let forward = self.graph.links(tk, wk);
            let backward = self.graph.links(wk, tk);

            if forward && backward {
                edges.push(Edge {
                    a: tid,
                    b: wd,
                    confidence: Confidence::High,
                    evidence: vec![Evidence::Link {
                        from: tk.clone(),
                        to: wk.clone(),
                        direction: LinkDirection::Bidirectional,
                    }],
                });
                continue;
            }

            let (from, to) = if forward { (tid, wd) } else { (wd, tid) };
            let (fk, tk) = (&self.keys[from], &self.keys[to]);
            let link = Evidence::Link {
                from: fk.clone(),
                to: tk.clone(),
                direction: LinkDirection::OneWay,
            };

            let conflicting: Vec<&DeviceKey> = self
                .graph
                .targets_in(tk, fk.origin)
                .into_iter()
                .filter(|t| *t != fk && self.index.contains_key(*t))
                .collect();
            if !conflicting.is_empty() {
                let mut members = vec![fk.clone(), tk.clone()];
                let mut evidence = vec![link];
                for other in &conflicting {
                    members.push((*other).clone());
                    evidence.push(Evidence::Link {
                        from: tk.clone(),
                        to: (*other).clone(),
                        direction: LinkDirection::OneWay,
                    });
                }
                let targets: Vec<String> = conflicting.iter().map(|k| k.to_string()).collect();
                ambiguities.push(
                    Ambiguity::new(
                        AmbiguityKind::InconsistentLink,
                        members,
                        format!("{} links to {}, which links to {}", fk, tk, targets.join(", ")),
                    )
                    .with_evidence(evidence),
                );
                continue;
            }

            let matches = attribute_matches(&self.devices[from], &self.devices[to]);
            if matches.is_empty() {
                ambiguities.push(
                    Ambiguity::new(
                        AmbiguityKind::UncorroboratedLink,
                        vec![fk.clone(), tk.clone()],
                        "one-way link without a matching model, FCC id or PCB id",
                    )
                    .with_evidence(vec![link]),
                );
                continue;
            }

            let mut evidence = vec![link];
            evidence.extend(matches.into_iter().map(|matched| Evidence::Attribute {
                a: fk.clone(),
                b: tk.clone(),
                matched,
            }));
            edges.push(Edge {
                a: tid,
                b: wd,
                confidence: Confidence::Medium,
                evidence,
            });
        }

        // Records named in an inconsistent link only merge over a mutual link.
        let contested: BTreeSet<usize> = ambiguities
            .iter()
            .filter(|a| a.kind == AmbiguityKind::InconsistentLink)
            .flat_map(|a| a.members.iter())
            .filter_map(|k| self.index.get(k).copied())
            .collect();
        edges.retain(|edge| {
            if edge.confidence == Confidence::High
                || !(contested.contains(&edge.a) || contested.contains(&edge.b))
            {
                return true;
            }
            debug!(
                a = %self.keys[edge.a],
                b = %self.keys[edge.b],
                "one-way link touches a contested record, not merging"
            );
            false
        });
        edges
    }

    /// OpenWrt rows only join groups the anchor origins already formed.
    fn attach_openwrt(&self, partition: &mut Partition, ambiguities: &mut Vec<Ambiguity>) {
        // Members per group before any OpenWrt row joins.
        let mut members: HashMap<usize, Vec<usize>> = HashMap::new();
        for i in 0..self.devices.len() {
            let root = partition.find(i);
            members.entry(root).or_default().push(i);
        }

        for (o, device) in self.devices.iter().enumerate() {
            if device.origin != Origin::OpenWrt {
                continue;
            }
            let ok = &self.keys[o];
            let targets: Vec<usize> = self
                .graph
                .targets(ok)
                .filter(|t| t.origin.is_anchor())
                .filter_map(|t| self.index.get(t).copied())
                .collect();
            if targets.is_empty() {
                ambiguities.push(Ambiguity::new(
                    AmbiguityKind::UnanchoredOpenWrt,
                    vec![ok.clone()],
                    "no link to an existing anchor record",
                ));
                continue;
            }

            for t in targets {
                let tk = &self.keys[t];
                if partition.group_size(t) < 2 {
                    ambiguities.push(Ambiguity::new(
                        AmbiguityKind::UnanchoredOpenWrt,
                        vec![ok.clone(), tk.clone()],
                        format!("{} is not part of any merge group", tk),
                    ));
                    continue;
                }

                let root = partition.find(t);
                let group = members.get(&root).map(Vec::as_slice).unwrap_or(&[]);
                let mut evidence = vec![Evidence::Link {
                    from: ok.clone(),
                    to: tk.clone(),
                    direction: LinkDirection::OneWay,
                }];
                for &m in group {
                    for matched in attribute_matches(device, &self.devices[m]) {
                        evidence.push(Evidence::Attribute {
                            a: ok.clone(),
                            b: self.keys[m].clone(),
                            matched,
                        });
                    }
                }
                if evidence.len() == 1 {
                    ambiguities.push(
                        Ambiguity::new(
                            AmbiguityKind::UnanchoredOpenWrt,
                            vec![ok.clone(), tk.clone()],
                            "link to a merge group is not corroborated",
                        )
                        .with_evidence(evidence),
                    );
                    continue;
                }

                if partition.origins_of(t) & origin_bit(Origin::OpenWrt) != 0 {
                    ambiguities.push(
                        Ambiguity::new(
                            AmbiguityKind::OriginCollision,
                            vec![ok.clone(), tk.clone()],
                            "group already holds an OpenWrt record",
                        )
                        .with_evidence(evidence),
                    );
                    continue;
                }

                debug!(openwrt = %ok, target = %tk, "attaching OpenWrt record");
                partition.union(Edge {
                    a: t,
                    b: o,
                    confidence: Confidence::Medium,
                    evidence,
                });
                break;
            }
        }
    }

    /// Unlinked anchor pairs sharing an attribute.
    fn suggest(&self) -> Vec<Ambiguity> {
        let mut by_model: HashMap<String, Vec<usize>> = HashMap::new();
        let mut by_fcc: HashMap<String, Vec<usize>> = HashMap::new();
        let mut by_pcb: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, device) in self.devices.iter().enumerate() {
            if device.origin != Origin::WikiDevi {
                continue;
            }
            if let Some(key) = model_key(device) {
                by_model.entry(key).or_default().push(i);
            }
            for id in device.product_fcc_ids() {
                by_fcc.entry(id.to_uppercase()).or_default().push(i);
            }
            if let Some(pcb) = pcb_key(device) {
                by_pcb.entry(pcb).or_default().push(i);
            }
        }

        let mut suggestions = Vec::new();
        for (t, device) in self.devices.iter().enumerate() {
            if device.origin != Origin::TechInfoDepot {
                continue;
            }
            let mut candidates: BTreeSet<usize> = BTreeSet::new();
            if let Some(key) = model_key(device) {
                candidates.extend(by_model.get(&key).into_iter().flatten());
            }
            for id in device.product_fcc_ids() {
                candidates.extend(by_fcc.get(&id.to_uppercase()).into_iter().flatten());
            }
            if let Some(pcb) = pcb_key(device) {
                candidates.extend(by_pcb.get(&pcb).into_iter().flatten());
            }

            let tk = &self.keys[t];
            for w in candidates {
                let wk = &self.keys[w];
                if self.graph.links(tk, wk) || self.graph.links(wk, tk) {
                    continue;
                }
                let evidence = attribute_matches(device, &self.devices[w])
                    .into_iter()
                    .map(|matched| Evidence::Attribute {
                        a: tk.clone(),
                        b: wk.clone(),
                        matched,
                    })
                    .collect();
                suggestions.push(
                    Ambiguity::new(
                        AmbiguityKind::Suggestion,
                        vec![tk.clone(), wk.clone()],
                        "no recorded link, attributes match",
                    )
                    .with_evidence(evidence),
                );
            }
        }
        suggestions
    }

    fn collect_groups(&self, partition: &mut Partition) -> Vec<MergeGroup> {
        let mut sets: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for i in 0..self.devices.len() {
            let root = partition.find(i);
            sets.entry(root).or_default().push(i);
        }

        let mut groups: Vec<MergeGroup> = sets
            .into_iter()
            .filter(|(_, members)| members.len() > 1)
            .map(|(root, members)| {
                let mut keys: Vec<DeviceKey> = members.iter().map(|&i| self.keys[i].clone()).collect();
                keys.sort();
                MergeGroup {
                    id: String::new(),
                    members: keys,
                    confidence: partition.confidence[root],
                    evidence: std::mem::take(&mut partition.evidence[root]),
                }
            })
            .collect();

        groups.sort_by(|a, b| a.members.cmp(&b.members));
        for (i, group) in groups.iter_mut().enumerate() {
            group.id = format!("grp_{:04}", i + 1);
        }
        groups
    }
}

/// Reconcile a record set with default settings.
pub fn reconcile(devices: &[CanonicalDevice]) -> ReconciliationReport {
    Reconciler::new(devices).run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{CrossLink, FccId, FccType, Identity};

    fn device(origin: Origin, title: &str, model: &str, links: &[(Origin, &str)]) -> CanonicalDevice {
        let mut d = CanonicalDevice::new(origin, title, Identity::new("Netgear", model));
        d.cross_links = links.iter().map(|(o, t)| CrossLink::new(*o, *t)).collect();
        d
    }

    fn key(origin: Origin, title: &str) -> DeviceKey {
        DeviceKey::new(origin, title)
    }

    #[test]
    fn test_bidirectional_links_merge() {
        let devices = vec![
            device(Origin::TechInfoDepot, "Netgear WNR3500L", "WNR3500L", &[(Origin::WikiDevi, "Netgear_WNR3500L")]),
            device(Origin::WikiDevi, "Netgear WNR3500L", "X", &[(Origin::TechInfoDepot, "netgear WNR3500L")]),
        ];
        let report = reconcile(&devices);

        assert_eq!(report.groups.len(), 1);
        assert_eq!(report.groups[0].id, "grp_0001");
        assert_eq!(report.groups[0].confidence, Confidence::High);
        assert_eq!(report.groups[0].members.len(), 2);
        assert!(report.ambiguities.is_empty());
    }

    #[test]
    fn test_conflicting_links_are_ambiguous() {
        let devices = vec![
            device(Origin::TechInfoDepot, "A", "WNR3500L", &[(Origin::WikiDevi, "B")]),
            device(Origin::WikiDevi, "B", "WNR3500L", &[(Origin::TechInfoDepot, "C")]),
            device(Origin::TechInfoDepot, "C", "WNR3500L", &[]),
        ];
        let report = reconcile(&devices);

        // B's counterpart is disputed, so neither A nor C merges with it.
        assert!(report.groups.is_empty());
        let inconsistent: Vec<_> = report.ambiguities_of(AmbiguityKind::InconsistentLink).collect();
        assert_eq!(inconsistent.len(), 1);
        assert_eq!(inconsistent[0].members.len(), 3);
        assert!(inconsistent[0].members.contains(&key(Origin::TechInfoDepot, "C")));
    }

    #[test]
    fn test_mutual_link_survives_a_conflicting_one_way_link() {
        let devices = vec![
            device(Origin::TechInfoDepot, "A", "WNR3500L", &[(Origin::WikiDevi, "B")]),
            device(Origin::WikiDevi, "B", "WNR3500L", &[(Origin::TechInfoDepot, "C")]),
            device(Origin::TechInfoDepot, "C", "WNR3500L", &[(Origin::WikiDevi, "B")]),
        ];
        let report = reconcile(&devices);

        assert_eq!(report.groups.len(), 1);
        assert_eq!(report.groups[0].confidence, Confidence::High);
        assert!(report.groups[0].contains(&key(Origin::TechInfoDepot, "C")));
        assert!(!report.groups[0].contains(&key(Origin::TechInfoDepot, "A")));
        assert_eq!(report.ambiguities_of(AmbiguityKind::InconsistentLink).count(), 1);
    }

    #[test]
    fn test_one_way_link_needs_corroboration() {
        let corroborated = vec![
            device(Origin::TechInfoDepot, "A", "WNR3500L", &[]),
            device(Origin::WikiDevi, "B", "wnr-3500l", &[(Origin::TechInfoDepot, "A")]),
        ];
        let report = reconcile(&corroborated);
        assert_eq!(report.groups.len(), 1);
        assert_eq!(report.groups[0].confidence, Confidence::Medium);

        let bare = vec![
            device(Origin::TechInfoDepot, "A", "WNR3500L", &[(Origin::WikiDevi, "B")]),
            device(Origin::WikiDevi, "B", "R7000", &[]),
        ];
        let report = reconcile(&bare);
        assert!(report.groups.is_empty());
        assert_eq!(report.ambiguities_of(AmbiguityKind::UncorroboratedLink).count(), 1);
    }

    #[test]
    fn test_unlinked_pairs_are_only_suggested() {
        let mut a = device(Origin::TechInfoDepot, "A", "WNR3500L", &[]);
        let mut b = device(Origin::WikiDevi, "B", "Something else", &[]);
        let fcc = FccId {
            id: "PY3-WNR3500L".to_string(),
            fcc_type: FccType::Main,
            grantee_code: "PY3".to_string(),
            grantee: None,
            date: None,
        };
        a.regulatory.fcc_ids.push(fcc.clone());
        b.regulatory.fcc_ids.push(fcc);

        let report = reconcile(&[a.clone(), b.clone()]);
        assert!(report.groups.is_empty());
        let suggestions: Vec<_> = report.ambiguities_of(AmbiguityKind::Suggestion).collect();
        assert_eq!(suggestions.len(), 1);
        assert!(matches!(
            &suggestions[0].evidence[0],
            Evidence::Attribute { matched: AttributeMatch::FccId(id), .. } if id == "PY3-WNR3500L"
        ));

        let report = Reconciler::new(&[a, b]).with_suggestions(false).run();
        assert!(report.ambiguities.is_empty());
    }

    #[test]
    fn test_origin_collision_is_refused() {
        let devices = vec![
            device(Origin::TechInfoDepot, "A", "WNR3500L", &[(Origin::WikiDevi, "B"), (Origin::WikiDevi, "C")]),
            device(Origin::WikiDevi, "B", "WNR3500L", &[(Origin::TechInfoDepot, "A")]),
            device(Origin::WikiDevi, "C", "WNR3500L", &[]),
        ];
        let report = reconcile(&devices);

        assert_eq!(report.groups.len(), 1);
        assert!(report.groups[0].contains(&key(Origin::WikiDevi, "B")));
        assert_eq!(report.ambiguities_of(AmbiguityKind::OriginCollision).count(), 1);
    }

    #[test]
    fn test_openwrt_attaches_to_established_group() {
        let devices = vec![
            device(Origin::TechInfoDepot, "A", "WNR3500L", &[(Origin::WikiDevi, "B")]),
            device(Origin::WikiDevi, "B", "WNR3500L", &[(Origin::TechInfoDepot, "A")]),
            device(Origin::OpenWrt, "netgear_wnr3500l", "WNR3500L", &[(Origin::WikiDevi, "B")]),
            device(Origin::OpenWrt, "netgear_r7000", "R7000", &[(Origin::WikiDevi, "B")]),
            device(Origin::OpenWrt, "netgear_r6000", "R6000", &[]),
        ];
        let report = reconcile(&devices);

        assert_eq!(report.groups.len(), 1);
        assert_eq!(report.groups[0].members.len(), 3);
        assert_eq!(report.groups[0].confidence, Confidence::Medium);
        assert!(report.groups[0].contains(&key(Origin::OpenWrt, "netgear_wnr3500l")));
        assert_eq!(report.ambiguities_of(AmbiguityKind::UnanchoredOpenWrt).count(), 2);
    }

    #[test]
    fn test_openwrt_never_anchors() {
        let devices = vec![
            device(Origin::WikiDevi, "B", "WNR3500L", &[]),
            device(Origin::OpenWrt, "netgear_wnr3500l", "WNR3500L", &[(Origin::WikiDevi, "B")]),
        ];
        let report = reconcile(&devices);
        assert!(report.groups.is_empty());
        assert_eq!(report.ambiguities_of(AmbiguityKind::UnanchoredOpenWrt).count(), 1);
    }

    #[test]
    fn test_dangling_links_reported() {
        let devices = vec![
            device(Origin::TechInfoDepot, "A", "WNR3500L", &[(Origin::WikiDevi, "Gone")]),
            device(Origin::WikiDevi, "B", "R7000", &[(Origin::OpenWrt, "nowhere")]),
        ];
        let report = reconcile(&devices);
        let dangling: Vec<_> = report.ambiguities_of(AmbiguityKind::DanglingLink).collect();
        // No OpenWrt records are loaded, so only the WikiDevi link counts.
        assert_eq!(dangling.len(), 1);
        assert_eq!(dangling[0].members, vec![key(Origin::TechInfoDepot, "A")]);
    }

    #[test]
    fn test_input_is_untouched() {
        let devices = vec![
            device(Origin::TechInfoDepot, "A", "WNR3500L", &[(Origin::WikiDevi, "B")]),
            device(Origin::WikiDevi, "B", "WNR3500L", &[(Origin::TechInfoDepot, "A")]),
        ];
        let before = devices.clone();
        let _ = reconcile(&devices);
        assert_eq!(devices, before);
    }
}
