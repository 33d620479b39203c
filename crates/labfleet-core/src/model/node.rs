// ── Node domain types ──

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::device::{Position, SWITCH_NAME_PREFIX};

/// Controller-assigned node identifier, stable for the node's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Node run state as reported by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    Started,
    Stopped,
    Suspended,
}

/// A provisioned entity (router, switch, core router) in the project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub node_type: String,
    /// Hostname. Changes once after template instantiation (provisional
    /// name -> desired hostname).
    pub name: String,
    pub position: Position,
    pub z: i32,
    pub status: NodeStatus,
}

impl Node {
    pub fn is_started(&self) -> bool {
        self.status == NodeStatus::Started
    }

    /// Access switches are recognised by their `Switch{n}` name.
    pub fn is_switch(&self) -> bool {
        self.name.starts_with(SWITCH_NAME_PREFIX)
    }
}
