// labfleet-core: Fleet addressing, topology cache and provisioning engine.

pub mod config;
mod convert;
pub mod device;
pub mod dhcp;
pub mod error;
pub mod inventory;
pub mod model;
pub mod project;
pub mod provision;
pub mod render;
pub mod stagger;
mod store;
pub mod sweep;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{ControllerConfig, LabSettings};
pub use device::{Device, FleetLayout, GridLayout, ManagementInterface, ManagementScheme, Position, fleet};
pub use error::CoreError;
pub use project::Project;
pub use provision::{
    BatchReport, DeviceFailure, DeviceOutcome, ProvisionOptions, ProvisionStage, StartReport,
    push_configs, reconcile, start_all,
};
pub use render::{ConfigRenderer, TeraRenderer};
pub use stagger::{PostDelay, run_bounded};
pub use sweep::{SweepReport, delete_switch_attached, switch_attached_nodes};

// Domain model at the crate root for ergonomics.
pub use model::{Link, LinkId, LinkKey, Node, NodeId, NodeStatus, Port};
