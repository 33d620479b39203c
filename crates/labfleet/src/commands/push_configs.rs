//! `labfleet push-configs`: re-render and push configuration to existing routers.

use labfleet_config::Config;
use labfleet_core::{Project, push_configs};

use super::util;
use crate::cli::GlobalOpts;
use crate::error::CliError;

pub async fn handle(project: &Project, cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    let devices = cfg.devices()?;
    let renderer = util::router_renderer(cfg)?;
    let report = push_configs(project, &devices, &renderer).await;
    util::finish_batch("push-configs", &report, global)
}
