// ── Local topology index ──
//
// In-memory mirror of the nodes and links known to exist in the remote
// project. Nodes are indexed by name and by id through one
// `EntityCollection`; links are indexed by their deduplication key.
// Mutations happen only after the controller has accepted a change.

mod collection;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

use crate::model::{Link, LinkKey, Node, NodeId, NodeStatus};

use self::collection::EntityCollection;

pub(crate) struct TopologyStore {
    nodes: EntityCollection<NodeId, Node>,
    links: DashMap<LinkKey, Arc<Link>>,
    link_version: AtomicU64,
}

impl TopologyStore {
    pub(crate) fn new() -> Self {
        Self {
            nodes: EntityCollection::new(),
            links: DashMap::new(),
            link_version: AtomicU64::new(0),
        }
    }

    /// Replace the whole index with a freshly fetched snapshot.
    pub(crate) fn apply_fetch(&self, nodes: Vec<Node>, links: Vec<Link>) {
        self.nodes.replace_all(
            nodes
                .into_iter()
                .map(|n| (n.name.clone(), n.id.clone(), n)),
        );
        self.links.clear();
        for link in links {
            self.links.insert(link.key(), Arc::new(link));
        }
        self.bump_links();
    }

    // ── Nodes ────────────────────────────────────────────────────────

    pub(crate) fn node(&self, name: &str) -> Option<Arc<Node>> {
        self.nodes.get_by_key(name)
    }

    pub(crate) fn node_by_id(&self, id: &NodeId) -> Option<Arc<Node>> {
        self.nodes.get_by_id(id)
    }

    /// Every known node, ordered by name.
    pub(crate) fn nodes(&self) -> Vec<Arc<Node>> {
        let mut nodes = self.nodes.snapshot();
        nodes.sort_by(|a, b| a.name.cmp(&b.name));
        nodes
    }

    #[cfg(test)]
    pub(crate) fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Insert or replace a node. A node whose name changed (same id) is
    /// moved to its new name.
    pub(crate) fn upsert_node(&self, node: Node) {
        self.nodes.upsert(node.name.clone(), node.id.clone(), node);
    }

    /// Drop a node and every link attached to it. Links are purged even
    /// when the node itself was not indexed.
    pub(crate) fn remove_node(&self, id: &NodeId) -> Option<Arc<Node>> {
        let removed = self.nodes.remove_by_id(id);
        let before = self.links.len();
        self.links.retain(|_, link| !link.touches(id));
        if self.links.len() != before {
            self.bump_links();
        }
        removed
    }

    pub(crate) fn set_status(&self, id: &NodeId, status: NodeStatus) {
        if let Some(node) = self.nodes.get_by_id(id) {
            if node.status != status {
                let mut updated = (*node).clone();
                updated.status = status;
                self.upsert_node(updated);
            }
        }
    }

    pub(crate) fn set_all_status(&self, status: NodeStatus) {
        for node in self.nodes.snapshot() {
            self.set_status(&node.id, status);
        }
    }

    // ── Links ────────────────────────────────────────────────────────

    pub(crate) fn contains_link(&self, key: &LinkKey) -> bool {
        self.links.contains_key(key)
    }

    /// Every known link, ordered by key.
    pub(crate) fn links(&self) -> Vec<Arc<Link>> {
        let mut links: Vec<(LinkKey, Arc<Link>)> = self
            .links
            .iter()
            .map(|entry| (entry.key().clone(), Arc::clone(entry.value())))
            .collect();
        links.sort_by(|a, b| a.0.cmp(&b.0));
        links.into_iter().map(|(_, link)| link).collect()
    }

    #[cfg(test)]
    pub(crate) fn link_count(&self) -> usize {
        self.links.len()
    }

    pub(crate) fn insert_link(&self, link: Link) {
        self.links.insert(link.key(), Arc::new(link));
        self.bump_links();
    }

    /// Changes every time the index is mutated.
    pub(crate) fn revision(&self) -> u64 {
        self.nodes.version() + self.link_version.load(Ordering::Acquire)
    }

    fn bump_links(&self) {
        self.link_version.fetch_add(1, Ordering::AcqRel);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::device::Position;
    use crate::model::Port;

    fn node(id: &str, name: &str) -> Node {
        Node {
            id: NodeId::from(id),
            node_type: "dynamips".into(),
            name: name.into(),
            position: Position::default(),
            z: 0,
            status: NodeStatus::Stopped,
        }
    }

    fn link(a: &str, b: &str, port: u32) -> Link {
        Link::ethernet(
            Port::new(NodeId::from(a), 0, 0),
            Port::new(NodeId::from(b), 0, port),
        )
    }

    #[test]
    fn fetch_indexes_nodes_by_name_and_id() {
        let store = TopologyStore::new();
        store.apply_fetch(vec![node("n1", "Switch1"), node("n2", "1")], vec![]);

        assert_eq!(store.node("Switch1").unwrap().id, NodeId::from("n1"));
        assert_eq!(store.node_by_id(&NodeId::from("n2")).unwrap().name, "1");
        assert_eq!(store.node_count(), 2);
    }

    #[test]
    fn fetch_keeps_every_link() {
        let store = TopologyStore::new();
        store.apply_fetch(
            vec![],
            vec![link("r1", "s", 1), link("r2", "s", 2), link("r3", "s", 3)],
        );
        assert_eq!(store.link_count(), 3);
    }

    #[test]
    fn rename_moves_name_projection() {
        let store = TopologyStore::new();
        store.upsert_node(node("n1", "c7200-1"));
        store.upsert_node(node("n1", "42"));

        assert!(store.node("c7200-1").is_none());
        assert_eq!(store.node("42").unwrap().id, NodeId::from("n1"));
        assert_eq!(store.node_count(), 1);
    }

    #[test]
    fn removing_node_drops_attached_links() {
        let store = TopologyStore::new();
        store.apply_fetch(
            vec![node("r1", "1"), node("r2", "2"), node("s", "Switch1")],
            vec![link("r1", "s", 1), link("r2", "s", 2)],
        );

        store.remove_node(&NodeId::from("r1")).unwrap();

        assert!(store.node("1").is_none());
        assert_eq!(store.link_count(), 1);
        assert!(store.contains_link(&link("r2", "s", 2).key()));
    }

    #[test]
    fn status_updates_are_visible() {
        let store = TopologyStore::new();
        store.apply_fetch(vec![node("n1", "1"), node("n2", "2")], vec![]);

        store.set_status(&NodeId::from("n1"), NodeStatus::Started);
        assert!(store.node("1").unwrap().is_started());

        store.set_all_status(NodeStatus::Suspended);
        assert!(store.nodes().iter().all(|n| n.status == NodeStatus::Suspended));
    }

    #[test]
    fn revision_changes_on_link_insert() {
        let store = TopologyStore::new();
        let before = store.revision();
        store.insert_link(link("r1", "s", 1));
        assert!(store.revision() > before);
        assert!(store.contains_link(&link("r1", "s", 1).key()));
    }
}
