//! `labfleet stop`: bulk stop of every node.

use labfleet_core::Project;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

pub async fn handle(project: &Project, global: &GlobalOpts) -> Result<(), CliError> {
    project.stop_all_nodes().await?;
    output::print_output("stop requested for all nodes", global.quiet);
    Ok(())
}
