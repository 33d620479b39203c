//! Command dispatch: bridges CLI args -> core operations -> output formatting.

pub mod build;
pub mod config_cmd;
pub mod delete_routers;
pub mod dhcp;
pub mod inventory;
pub mod links;
pub mod nodes;
pub mod push_configs;
pub mod start;
pub mod stop;
pub mod util;

use labfleet_config::Config;

use crate::cli::{Command, GlobalOpts};
use crate::config;
use crate::error::CliError;

/// Dispatch a config-bound command to the appropriate handler. Offline
/// commands never contact the controller.
pub async fn dispatch(cmd: Command, cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Inventory(args) => inventory::handle(cfg, &args, global),
        Command::Dhcp(args) => dhcp::handle(cfg, &args, global),
        cmd => {
            let project = config::connect(cfg).await?;
            match cmd {
                Command::Build => build::handle(&project, cfg, global).await,
                Command::Start(args) => start::handle(&project, cfg, &args, global).await,
                Command::Stop => stop::handle(&project, global).await,
                Command::DeleteRouters => delete_routers::handle(&project, global).await,
                Command::PushConfigs => push_configs::handle(&project, cfg, global).await,
                Command::Nodes => nodes::handle(&project, global),
                Command::Links => links::handle(&project, global),
                other => Err(CliError::Internal(format!(
                    "{other:?} is handled before dispatch"
                ))),
            }
        }
    }
}
