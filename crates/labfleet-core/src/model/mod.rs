// ── Domain model ──
//
// Value objects for entities that live on the controller.

mod link;
mod node;

pub use link::{Link, LinkId, LinkKey, Port};
pub use node::{Node, NodeId, NodeStatus};
