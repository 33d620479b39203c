//! `labfleet build`: converge the project to the configured fleet.

use labfleet_config::Config;
use labfleet_core::{Project, reconcile};

use super::util;
use crate::cli::GlobalOpts;
use crate::error::CliError;

pub async fn handle(project: &Project, cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    // Addressing and template errors abort before any remote call.
    let devices = cfg.devices()?;
    let options = cfg.provision_options()?;
    let renderer = util::router_renderer(cfg)?;

    tracing::info!(
        devices = devices.len(),
        always_reconfigure = options.always_reconfigure,
        "building fleet"
    );
    let report = reconcile(project, &devices, &renderer, &options).await;
    if !global.quiet {
        eprintln!(
            "{} nodes created, {} links created, {} configured",
            report.nodes_created(),
            report.links_created(),
            report.configured()
        );
    }
    util::finish_batch("build", &report, global)
}
