// ── Provisioning engine ──
//
// Converges the remote project to the desired device set. Devices are
// handled one after another; the steps for a single device are strictly
// ordered (switch, router node, link, configuration). A failure ends the
// current device only: it is recorded in the batch report and the next
// device proceeds.

use std::fmt;
use std::sync::Arc;

use strum::Display;
use tracing::{debug, info, warn};

use crate::device::{Device, GridLayout};
use crate::error::CoreError;
use crate::model::{Link, Node, NodeStatus, Port};
use crate::project::Project;
use crate::render::ConfigRenderer;
use crate::stagger::{PostDelay, run_bounded};

/// Router-side port wired to the access switch.
const ROUTER_UPLINK_ADAPTER: u32 = 0;
const ROUTER_UPLINK_PORT: u32 = 0;
/// Access switches expose a single adapter.
const SWITCH_ADAPTER: u32 = 0;

/// Knobs for a reconciliation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionOptions {
    /// Template routers are instantiated from.
    pub template_id: String,
    /// Push configuration to routers that already existed.
    pub always_reconfigure: bool,
    pub grid: GridLayout,
}

impl ProvisionOptions {
    pub fn new(template_id: impl Into<String>) -> Self {
        Self {
            template_id: template_id.into(),
            always_reconfigure: false,
            grid: GridLayout::default(),
        }
    }
}

// ── Batch reporting ──────────────────────────────────────────────────

/// Step at which a device failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ProvisionStage {
    ResolveSwitch,
    CreateNode,
    RenameNode,
    CreateLink,
    RenderConfig,
    PushConfig,
}

/// What happened to one device that went through all steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceOutcome {
    pub hostname: String,
    pub node_created: bool,
    pub link_created: bool,
    pub configured: bool,
}

#[derive(Debug)]
pub struct DeviceFailure {
    pub hostname: String,
    pub stage: ProvisionStage,
    pub error: CoreError,
}

impl fmt::Display for DeviceFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.hostname, self.stage, self.error)
    }
}

/// Per-device results of a batch. Successful devices keep their changes
/// even when others fail.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub succeeded: Vec<DeviceOutcome>,
    pub failed: Vec<DeviceFailure>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn nodes_created(&self) -> usize {
        self.succeeded.iter().filter(|o| o.node_created).count()
    }

    pub fn links_created(&self) -> usize {
        self.succeeded.iter().filter(|o| o.link_created).count()
    }

    pub fn configured(&self) -> usize {
        self.succeeded.iter().filter(|o| o.configured).count()
    }

    /// One-line summary, e.g. `48 succeeded, 2 failed`.
    pub fn summary(&self) -> String {
        format!("{} succeeded, {} failed", self.succeeded.len(), self.failed.len())
    }

    fn record(&mut self, hostname: &str, result: Result<DeviceOutcome, (ProvisionStage, CoreError)>) {
        match result {
            Ok(outcome) => self.succeeded.push(outcome),
            Err((stage, error)) => {
                warn!(device = hostname, %stage, error = %error, "device failed");
                self.failed.push(DeviceFailure {
                    hostname: hostname.to_owned(),
                    stage,
                    error,
                });
            }
        }
    }
}

// ── Reconciliation ───────────────────────────────────────────────────

/// Converge `project` to `devices`.
///
/// Existing router nodes are reused and existing links are skipped, so a
/// second run over a provisioned fleet issues no mutations (unless
/// `always_reconfigure` is set, which re-pushes configuration).
pub async fn reconcile(
    project: &Project,
    devices: &[Device],
    renderer: &dyn ConfigRenderer,
    options: &ProvisionOptions,
) -> BatchReport {
    let mut report = BatchReport::default();
    for device in devices {
        let result = reconcile_device(project, device, renderer, options).await;
        report.record(device.hostname(), result);
    }
    info!(
        devices = devices.len(),
        nodes_created = report.nodes_created(),
        links_created = report.links_created(),
        configured = report.configured(),
        "{}",
        report.summary()
    );
    report
}

async fn reconcile_device(
    project: &Project,
    device: &Device,
    renderer: &dyn ConfigRenderer,
    options: &ProvisionOptions,
) -> Result<DeviceOutcome, (ProvisionStage, CoreError)> {
    let hostname = device.hostname();

    // 1. The switch fleet is built out-of-band.
    let switch_name = device.connected_switch();
    let switch = project.node(&switch_name).ok_or_else(|| {
        (
            ProvisionStage::ResolveSwitch,
            CoreError::SwitchNotFound { name: switch_name.clone() },
        )
    })?;

    // 2. Router node: reuse, or instantiate then rename.
    let (router, node_created) = match project.node(hostname) {
        Some(existing) => {
            debug!(device = hostname, id = %existing.id, "router exists");
            (existing, false)
        }
        None => (create_router(project, device, &switch, options).await?, true),
    };

    // 3. Uplink to the switch, unless already wired.
    let link = Link::ethernet(
        Port::new(router.id.clone(), ROUTER_UPLINK_ADAPTER, ROUTER_UPLINK_PORT),
        Port::new(switch.id.clone(), SWITCH_ADAPTER, device.sequence_in_group()),
    );
    let link_created = if project.contains_link(&link.key()) {
        debug!(device = hostname, link = %link, "link exists");
        false
    } else {
        project
            .create_link(&link)
            .await
            .map_err(|e| (ProvisionStage::CreateLink, e))?;
        true
    };

    // 4. Configuration for new routers, or for all when forced.
    let configured = if node_created || options.always_reconfigure {
        configure(project, device, &router, renderer).await?;
        true
    } else {
        false
    };

    Ok(DeviceOutcome {
        hostname: hostname.to_owned(),
        node_created,
        link_created,
        configured,
    })
}

/// Two calls: instantiate the template (the controller picks a name), then
/// rename and position the new node.
async fn create_router(
    project: &Project,
    device: &Device,
    switch: &Node,
    options: &ProvisionOptions,
) -> Result<Arc<Node>, (ProvisionStage, CoreError)> {
    let position = device.position_in_group_grid(switch.position, &options.grid);
    let provisional = project
        .create_node_from_template(&options.template_id, position)
        .await
        .map_err(|e| (ProvisionStage::CreateNode, e))?;
    let router = project
        .rename_and_move(&provisional.id, device.hostname(), position)
        .await
        .map_err(|e| (ProvisionStage::RenameNode, e))?;

    // The controller may keep or mangle the name; the router would then be
    // invisible to the next run's lookup by hostname.
    if router.name != device.hostname() {
        warn!(
            device = device.hostname(),
            id = %router.id,
            actual = %router.name,
            "node kept a different name after rename"
        );
        return Err((
            ProvisionStage::RenameNode,
            CoreError::RenameMismatch {
                id: router.id.to_string(),
                expected: device.hostname().to_owned(),
                actual: router.name.clone(),
            },
        ));
    }
    Ok(router)
}

async fn configure(
    project: &Project,
    device: &Device,
    router: &Node,
    renderer: &dyn ConfigRenderer,
) -> Result<(), (ProvisionStage, CoreError)> {
    let config = renderer
        .render(device)
        .map_err(|e| (ProvisionStage::RenderConfig, e))?;
    project
        .push_config(router, &config)
        .await
        .map_err(|e| (ProvisionStage::PushConfig, e))
}

// ── Configuration push ───────────────────────────────────────────────

/// Render and push configuration to every device whose router exists.
/// Devices without a router node are reported as failures.
pub async fn push_configs(
    project: &Project,
    devices: &[Device],
    renderer: &dyn ConfigRenderer,
) -> BatchReport {
    let mut report = BatchReport::default();
    for device in devices {
        let result = match project.node(device.hostname()) {
            Some(router) => configure(project, device, &router, renderer)
                .await
                .map(|()| DeviceOutcome {
                    hostname: device.hostname().to_owned(),
                    node_created: false,
                    link_created: false,
                    configured: true,
                }),
            None => Err((
                ProvisionStage::PushConfig,
                CoreError::NodeNotFound {
                    name: device.hostname().to_owned(),
                },
            )),
        };
        report.record(device.hostname(), result);
    }
    info!(devices = devices.len(), "{}", report.summary());
    report
}

// ── Staggered start ──────────────────────────────────────────────────

/// Result of a staggered start.
#[derive(Debug, Default)]
pub struct StartReport {
    pub started: Vec<String>,
    /// Nodes that were already running.
    pub skipped: usize,
    pub failed: Vec<(String, CoreError)>,
}

impl StartReport {
    pub fn summary(&self) -> String {
        format!(
            "{} started, {} already running, {} failed",
            self.started.len(),
            self.skipped,
            self.failed.len()
        )
    }
}

/// Start every node not already started, at most `pool_size` at a time.
/// After each successful start the slot is held for `post_delay` before
/// the next waiting node may go.
pub async fn start_all(project: &Project, pool_size: usize, post_delay: PostDelay) -> StartReport {
    let nodes = project.nodes();
    let total = nodes.len();
    let pending: Vec<Arc<Node>> = nodes
        .into_iter()
        .filter(|n| n.status != NodeStatus::Started)
        .collect();

    let mut report = StartReport {
        skipped: total - pending.len(),
        ..StartReport::default()
    };
    info!(pending = pending.len(), pool_size, "starting nodes");

    let results = run_bounded(pending.iter().cloned(), pool_size, post_delay, |node| async move {
        project.start_node(&node.id).await.map(|()| node)
    })
    .await;

    for (node, result) in pending.iter().zip(results) {
        match result {
            Ok(_) => report.started.push(node.name.clone()),
            Err(e) => report.failed.push((node.name.clone(), e)),
        }
    }
    info!("{}", report.summary());
    report
}
