// ── Link domain types ──
//
// A link joins exactly two ports. Its identity for deduplication is the
// pair of ports in canonical (sorted) order, so the same cable described
// from either end yields the same key.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::node::NodeId;

/// Controller-assigned link identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkId(String);

impl LinkId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for LinkId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// `(node, adapter, port)` triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Port {
    pub node_id: NodeId,
    pub adapter_number: u32,
    pub port_number: u32,
}

impl Port {
    pub fn new(node_id: NodeId, adapter_number: u32, port_number: u32) -> Self {
        Self {
            node_id,
            adapter_number,
            port_number,
        }
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}/{}", self.node_id, self.adapter_number, self.port_number)
    }
}

/// Order-independent deduplication key of a link.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkKey {
    low: Port,
    high: Port,
}

impl LinkKey {
    pub fn new(a: Port, b: Port) -> Self {
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }
}

impl fmt::Display for LinkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <-> {}", self.low, self.high)
    }
}

/// A cable between two ports. Links are created or deleted, never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// `None` until the controller has accepted the link.
    pub id: Option<LinkId>,
    pub link_type: String,
    ports: [Port; 2],
}

impl Link {
    /// An ethernet link that does not exist on the controller yet.
    pub fn ethernet(a: Port, b: Port) -> Self {
        Self {
            id: None,
            link_type: "ethernet".into(),
            ports: [a, b],
        }
    }

    pub fn with_id(mut self, id: LinkId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn ports(&self) -> &[Port; 2] {
        &self.ports
    }

    pub fn first_port(&self) -> &Port {
        &self.ports[0]
    }

    pub fn second_port(&self) -> &Port {
        &self.ports[1]
    }

    pub fn key(&self) -> LinkKey {
        LinkKey::new(self.ports[0].clone(), self.ports[1].clone())
    }

    /// Whether either end of the link sits on `node`.
    pub fn touches(&self, node: &NodeId) -> bool {
        self.ports.iter().any(|p| &p.node_id == node)
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.key().fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn port(node: &str, adapter: u32, port: u32) -> Port {
        Port::new(NodeId::from(node), adapter, port)
    }

    #[test]
    fn key_is_symmetric() {
        let pairs = [
            (port("router", 0, 0), port("switch", 0, 5)),
            (port("a", 1, 2), port("a", 1, 3)),
            (port("z", 0, 0), port("b", 9, 9)),
        ];
        for (a, b) in pairs {
            assert_eq!(LinkKey::new(a.clone(), b.clone()), LinkKey::new(b, a));
        }
    }

    #[test]
    fn different_switch_ports_are_different_links() {
        let a = Link::ethernet(port("r", 0, 0), port("s", 0, 1));
        let b = Link::ethernet(port("r", 0, 0), port("s", 0, 2));
        assert_ne!(a.key(), b.key());
    }

    #[test]
    fn reversed_link_has_same_key() {
        let a = Link::ethernet(port("r", 0, 0), port("s", 0, 1));
        let b = Link::ethernet(port("s", 0, 1), port("r", 0, 0));
        assert_eq!(a.key(), b.key());
        assert_eq!(a.to_string(), "r:0/0 <-> s:0/1");
    }

    #[test]
    fn touches_either_end() {
        let link = Link::ethernet(port("r", 0, 0), port("s", 0, 1));
        assert!(link.touches(&NodeId::from("s")));
        assert!(!link.touches(&NodeId::from("x")));
    }
}
