// Wire types for the controller's node, link and template endpoints.
//
// Only the fields this crate acts on are modelled; everything else in the
// controller's payloads is ignored on the way in.

use serde::{Deserialize, Serialize};

// ── Nodes ───────────────────────────────────────────────────────────

/// A node as returned by `GET nodes`, template instantiation and node update.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NodeResponse {
    pub node_id: String,
    pub node_type: String,
    pub name: String,
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub z: i32,
    /// `started`, `stopped` or `suspended`.
    pub status: String,
}

/// Body of `POST templates/{template_id}`: where to drop the new node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateInstance {
    pub x: i32,
    pub y: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compute_id: Option<String>,
}

impl TemplateInstance {
    pub fn at(x: i32, y: i32) -> Self {
        Self {
            x,
            y,
            compute_id: None,
        }
    }
}

/// Text label drawn next to a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub text: String,
    pub x: i32,
    pub y: i32,
    pub rotation: i32,
    pub style: String,
}

impl Label {
    /// Bold label placed above the router symbol.
    pub fn above(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            x: 13,
            y: -25,
            rotation: 0,
            style: "font-family: TypeWriter;font-size: 10.0;font-weight: bold;fill: #000000; \
                    fill-opacity: 1.0;"
                .into(),
        }
    }
}

/// Body of `PUT nodes/{node_id}`: rename and reposition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeUpdate {
    pub node_id: String,
    pub name: String,
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub label: Label,
}

impl NodeUpdate {
    /// Rename a node and move it, keeping the label in sync with the name.
    pub fn rename_and_move(node_id: impl Into<String>, name: impl Into<String>, x: i32, y: i32) -> Self {
        let name = name.into();
        Self {
            node_id: node_id.into(),
            label: Label::above(name.clone()),
            name,
            x,
            y,
            z: 1,
        }
    }
}

// ── Links ───────────────────────────────────────────────────────────

/// One side of a link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkEndpoint {
    pub node_id: String,
    pub adapter_number: u32,
    pub port_number: u32,
}

/// A link as returned by `GET links` and link creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkResponse {
    pub link_id: String,
    #[serde(default)]
    pub link_type: Option<String>,
    pub nodes: Vec<LinkEndpoint>,
}

/// Body of `POST nodes/links`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkCreate {
    pub link_type: String,
    pub nodes: Vec<LinkEndpoint>,
}

impl LinkCreate {
    pub fn ethernet(a: LinkEndpoint, b: LinkEndpoint) -> Self {
        Self {
            link_type: "ethernet".into(),
            nodes: vec![a, b],
        }
    }
}
