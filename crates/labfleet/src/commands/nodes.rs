//! `labfleet nodes`: list the project's nodes.

use std::sync::Arc;

use labfleet_core::{Node, Project};
use tabled::Tabled;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct NodeRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    node_type: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Position")]
    position: String,
    #[tabled(rename = "ID")]
    id: String,
}

fn to_row(node: &Arc<Node>, color: bool) -> NodeRow {
    NodeRow {
        name: node.name.clone(),
        node_type: node.node_type.clone(),
        status: output::paint_status(&node.status.to_string(), color),
        position: format!("{}, {}", node.position.x, node.position.y),
        id: node.id.to_string(),
    }
}

pub fn handle(project: &Project, global: &GlobalOpts) -> Result<(), CliError> {
    let nodes = project.nodes();
    let color = output::color_enabled(global);
    let out = output::render_list(
        output::format(global),
        &nodes,
        |n| to_row(n, color),
        |n| n.name.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
