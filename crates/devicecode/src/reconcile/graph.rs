//! Directed graph of declared cross-wiki links.

use std::collections::{BTreeMap, BTreeSet};

use crate::device::{CanonicalDevice, DeviceKey, Origin};

/// Nodes are record identities, edges are "this page corresponds to that
/// page" links as recorded by the source wiki.
#[derive(Debug, Clone, Default)]
pub struct LinkGraph {
    nodes: BTreeSet<DeviceKey>,
    edges: BTreeMap<DeviceKey, BTreeSet<DeviceKey>>,
}

impl LinkGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the graph from a record set.
    pub fn from_devices(devices: &[CanonicalDevice]) -> Self {
        let mut graph = Self::new();
        for device in devices {
            graph.add_node(device.key());
        }
        for device in devices {
            let from = device.key();
            for link in &device.cross_links {
                graph.add_edge(from.clone(), link.target());
            }
        }
        graph
    }

    pub fn add_node(&mut self, key: DeviceKey) {
        self.nodes.insert(key);
    }

    pub fn add_edge(&mut self, from: DeviceKey, to: DeviceKey) {
        self.edges.entry(from).or_default().insert(to);
    }

    pub fn contains(&self, key: &DeviceKey) -> bool {
        self.nodes.contains(key)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(BTreeSet::len).sum()
    }

    /// Whether `from` declares a link to `to`.
    pub fn links(&self, from: &DeviceKey, to: &DeviceKey) -> bool {
        self.edges.get(from).is_some_and(|targets| targets.contains(to))
    }

    /// All declared targets of `from`, existing or not.
    pub fn targets(&self, from: &DeviceKey) -> impl Iterator<Item = &DeviceKey> {
        self.edges.get(from).into_iter().flatten()
    }

    /// Declared targets of `from` inside one origin.
    pub fn targets_in(&self, from: &DeviceKey, origin: Origin) -> Vec<&DeviceKey> {
        self.targets(from).filter(|t| t.origin == origin).collect()
    }

    /// Every edge, in key order.
    pub fn edges(&self) -> impl Iterator<Item = (&DeviceKey, &DeviceKey)> {
        self.edges
            .iter()
            .flat_map(|(from, targets)| targets.iter().map(move |to| (from, to)))
    }

    /// Whether any node of this origin exists.
    pub fn has_origin(&self, origin: Origin) -> bool {
        self.nodes.iter().any(|n| n.origin == origin)
    }

    /// Edges whose target is not a known node.
    pub fn dangling(&self) -> Vec<(&DeviceKey, &DeviceKey)> {
        self.edges().filter(|(_, to)| !self.nodes.contains(*to)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{CrossLink, Identity};

    fn device(origin: Origin, title: &str, links: &[(Origin, &str)]) -> CanonicalDevice {
        let mut d = CanonicalDevice::new(origin, title, Identity::new("Acme", title));
        d.cross_links = links.iter().map(|(o, t)| CrossLink::new(*o, *t)).collect();
        d
    }

    #[test]
    fn test_graph_edges() {
        let devices = vec![
            device(Origin::TechInfoDepot, "A", &[(Origin::WikiDevi, "b")]),
            device(Origin::WikiDevi, "B", &[(Origin::TechInfoDepot, "A"), (Origin::TechInfoDepot, "Gone")]),
        ];
        let graph = LinkGraph::from_devices(&devices);
        let a = DeviceKey::new(Origin::TechInfoDepot, "A");
        let b = DeviceKey::new(Origin::WikiDevi, "B");

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 3);
        assert!(graph.links(&a, &b));
        assert!(graph.links(&b, &a));
        assert_eq!(graph.targets_in(&b, Origin::TechInfoDepot).len(), 2);
        assert_eq!(graph.dangling().len(), 1);
    }
}
