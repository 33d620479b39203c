//! `labfleet links`: list the project's links with node names resolved.

use std::sync::Arc;

use labfleet_core::{Link, Port, Project};
use tabled::Tabled;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct LinkRow {
    #[tabled(rename = "A")]
    a: String,
    #[tabled(rename = "B")]
    b: String,
    #[tabled(rename = "Type")]
    link_type: String,
    #[tabled(rename = "ID")]
    id: String,
}

/// `name adapter/port`, falling back to the node id for unknown nodes.
fn endpoint(project: &Project, port: &Port) -> String {
    let node = project
        .node_by_id(&port.node_id)
        .map_or_else(|| port.node_id.to_string(), |n| n.name.clone());
    format!("{node} {}/{}", port.adapter_number, port.port_number)
}

pub fn handle(project: &Project, global: &GlobalOpts) -> Result<(), CliError> {
    let links = project.links();
    let out = output::render_list(
        output::format(global),
        &links,
        |l: &Arc<Link>| LinkRow {
            a: endpoint(project, l.first_port()),
            b: endpoint(project, l.second_port()),
            link_type: l.link_type.clone(),
            id: l.id.as_ref().map(ToString::to_string).unwrap_or_default(),
        },
        |l| l.id.as_ref().map_or_else(|| l.key().to_string(), ToString::to_string),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
