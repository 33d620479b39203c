//! `labfleet start`: staggered or bulk start.

use labfleet_config::Config;
use labfleet_core::{PostDelay, Project, start_all};

use crate::cli::{GlobalOpts, StartArgs};
use crate::error::CliError;
use crate::output;

pub async fn handle(
    project: &Project,
    cfg: &Config,
    args: &StartArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if args.bulk {
        project.start_all_nodes().await?;
        output::print_output("start requested for all nodes", global.quiet);
        return Ok(());
    }

    let pool = args.pool.unwrap_or(cfg.provision.stagger_pool_size);
    if pool == 0 {
        return Err(CliError::Validation {
            field: "pool".into(),
            reason: "must be at least 1".into(),
        });
    }
    let delay = args.max_jitter.map_or_else(|| cfg.post_delay(), PostDelay::jitter_secs);

    let report = start_all(project, pool, delay).await;
    for (name, err) in &report.failed {
        eprintln!("  ✗ {name}: {err}");
    }
    let color = output::color_enabled(global);
    output::print_output(
        &output::paint_summary(&report.summary(), !report.failed.is_empty(), color),
        global.quiet,
    );

    if report.failed.is_empty() {
        Ok(())
    } else {
        Err(CliError::PartialFailure {
            operation: "start".into(),
            failed: report.failed.len(),
            total: report.failed.len() + report.started.len(),
        })
    }
}
