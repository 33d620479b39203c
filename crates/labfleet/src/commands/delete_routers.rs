//! `labfleet delete-routers`: remove every node cabled to an access-switch port.

use labfleet_core::{Project, delete_switch_attached, switch_attached_nodes};

use super::util;
use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

pub async fn handle(project: &Project, global: &GlobalOpts) -> Result<(), CliError> {
    let targets = switch_attached_nodes(&project.nodes(), &project.links());
    if targets.is_empty() {
        output::print_output("nothing to delete", global.quiet);
        return Ok(());
    }

    let prompt = format!(
        "Delete {} nodes from project {}?",
        targets.len(),
        project.id()
    );
    if !util::confirm(&prompt, "delete-routers", global.yes)? {
        return Ok(());
    }

    let report = delete_switch_attached(project).await;
    for (name, err) in &report.failed {
        eprintln!("  ✗ {name}: {err}");
    }
    let summary = format!("{} deleted, {} failed", report.deleted.len(), report.failed.len());
    let color = output::color_enabled(global);
    output::print_output(
        &output::paint_summary(&summary, !report.failed.is_empty(), color),
        global.quiet,
    );

    if report.failed.is_empty() {
        Ok(())
    } else {
        Err(CliError::PartialFailure {
            operation: "delete-routers".into(),
            failed: report.failed.len(),
            total: report.failed.len() + report.deleted.len(),
        })
    }
}
