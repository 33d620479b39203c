// ── API-to-domain type conversions ──
//
// Bridges raw `labfleet_api` wire types into canonical domain types.

use labfleet_api::{LinkCreate, LinkEndpoint, LinkResponse, NodeResponse};

use crate::device::Position;
use crate::error::CoreError;
use crate::model::{Link, LinkId, Node, NodeId, NodeStatus, Port};

impl TryFrom<NodeResponse> for Node {
    type Error = CoreError;

    fn try_from(raw: NodeResponse) -> Result<Self, Self::Error> {
        let status: NodeStatus = raw.status.parse().map_err(|_| CoreError::Decode {
            message: format!("node '{}' has unknown status '{}'", raw.name, raw.status),
        })?;
        Ok(Node {
            id: NodeId::from(raw.node_id),
            node_type: raw.node_type,
            name: raw.name,
            position: Position::new(raw.x, raw.y),
            z: raw.z,
            status,
        })
    }
}

impl From<LinkEndpoint> for Port {
    fn from(raw: LinkEndpoint) -> Self {
        Port::new(NodeId::from(raw.node_id), raw.adapter_number, raw.port_number)
    }
}

impl From<&Port> for LinkEndpoint {
    fn from(port: &Port) -> Self {
        LinkEndpoint {
            node_id: port.node_id.as_str().to_owned(),
            adapter_number: port.adapter_number,
            port_number: port.port_number,
        }
    }
}

impl TryFrom<LinkResponse> for Link {
    type Error = CoreError;

    fn try_from(raw: LinkResponse) -> Result<Self, Self::Error> {
        let link_id = raw.link_id;
        let mut ends = raw.nodes.into_iter().map(Port::from);
        let (Some(a), Some(b), None) = (ends.next(), ends.next(), ends.next()) else {
            return Err(CoreError::Decode {
                message: format!("link '{link_id}' does not join exactly two ports"),
            });
        };
        let mut link = Link::ethernet(a, b).with_id(LinkId::from(link_id));
        if let Some(link_type) = raw.link_type {
            link.link_type = link_type;
        }
        Ok(link)
    }
}

impl From<&Link> for LinkCreate {
    fn from(link: &Link) -> Self {
        LinkCreate {
            link_type: link.link_type.clone(),
            nodes: link.ports().iter().map(LinkEndpoint::from).collect(),
        }
    }
}
