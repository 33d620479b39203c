// ── Router deletion sweep ──
//
// Finds every node hanging off an access-switch port other than 0 (port 0
// is the switch uplink) by walking the links, then deletes them.

use std::sync::Arc;

use indexmap::IndexSet;
use tracing::info;

use crate::error::CoreError;
use crate::model::{Link, Node, NodeId};
use crate::project::Project;

/// Port reserved for the switch's own uplink.
const SWITCH_UPLINK_PORT: u32 = 0;

/// Nodes attached to a switch on a non-uplink port, in link order.
///
/// For each link, if the first end sits on a switch with a non-zero port
/// the second end is selected; otherwise the same check runs the other
/// way round.
pub fn switch_attached_nodes(nodes: &[Arc<Node>], links: &[Arc<Link>]) -> Vec<NodeId> {
    let switches: IndexSet<&NodeId> = nodes
        .iter()
        .filter(|n| n.is_switch())
        .map(|n| &n.id)
        .collect();

    let mut doomed: IndexSet<NodeId> = IndexSet::new();
    for link in links {
        let (a, b) = (link.first_port(), link.second_port());
        if switches.contains(&a.node_id) && a.port_number != SWITCH_UPLINK_PORT {
            doomed.insert(b.node_id.clone());
        } else if switches.contains(&b.node_id) && b.port_number != SWITCH_UPLINK_PORT {
            doomed.insert(a.node_id.clone());
        }
    }
    doomed.into_iter().collect()
}

/// Outcome of a sweep.
#[derive(Debug, Default)]
pub struct SweepReport {
    pub deleted: Vec<String>,
    pub failed: Vec<(String, CoreError)>,
}

/// Delete every node attached to an access-switch port.
pub async fn delete_switch_attached(project: &Project) -> SweepReport {
    let targets = switch_attached_nodes(&project.nodes(), &project.links());
    info!(count = targets.len(), "deleting switch-attached nodes");

    let mut report = SweepReport::default();
    for (name, result) in project.delete_nodes(&targets).await {
        match result {
            Ok(()) => report.deleted.push(name),
            Err(e) => report.failed.push((name, e)),
        }
    }
    report
}
