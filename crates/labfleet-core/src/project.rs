// ── Remote project with local topology cache ──
//
// `Project` pairs the HTTP client with an in-memory index of the project's
// nodes and links. Every mutation goes to the controller first; the index
// is updated only once the controller has answered 2xx, so after a failure
// callers still see the pre-mutation state.

use std::sync::Arc;

use futures_util::future::join_all;
use labfleet_api::{LinkCreate, NodeUpdate, ProjectClient, TemplateInstance};
use tracing::{error, info, warn};

use crate::device::Position;
use crate::error::CoreError;
use crate::model::{Link, LinkKey, Node, NodeId, NodeStatus};
use crate::store::TopologyStore;

/// A controller project and everything known to exist in it.
pub struct Project {
    client: ProjectClient,
    store: TopologyStore,
}

impl Project {
    /// Connect to a project and load its current nodes and links.
    pub async fn fetch(client: ProjectClient) -> Result<Self, CoreError> {
        let project = Self {
            client,
            store: TopologyStore::new(),
        };
        project.refresh().await?;
        Ok(project)
    }

    /// Re-read nodes and links, replacing the local index.
    ///
    /// Both lists are requested concurrently. A failure leaves the index as
    /// it was.
    pub async fn refresh(&self) -> Result<(), CoreError> {
        let (raw_nodes, raw_links) =
            tokio::try_join!(self.client.list_nodes(), self.client.list_links())?;

        let nodes = raw_nodes
            .into_iter()
            .map(Node::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let links = raw_links
            .into_iter()
            .map(Link::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        info!(
            project = self.id(),
            nodes = nodes.len(),
            links = links.len(),
            "project topology loaded"
        );
        self.store.apply_fetch(nodes, links);
        Ok(())
    }

    // ── Read access ──────────────────────────────────────────────────

    pub fn id(&self) -> &str {
        self.client.project_id()
    }

    /// Look up a node by name.
    pub fn node(&self, name: &str) -> Option<Arc<Node>> {
        self.store.node(name)
    }

    pub fn node_by_id(&self, id: &NodeId) -> Option<Arc<Node>> {
        self.store.node_by_id(id)
    }

    /// All known nodes, ordered by name.
    pub fn nodes(&self) -> Vec<Arc<Node>> {
        self.store.nodes()
    }

    /// All known links, ordered by key.
    pub fn links(&self) -> Vec<Arc<Link>> {
        self.store.links()
    }

    /// Whether a link with this deduplication key already exists.
    pub fn contains_link(&self, key: &LinkKey) -> bool {
        self.store.contains_link(key)
    }

    /// Changes whenever the local index is mutated.
    pub fn revision(&self) -> u64 {
        self.store.revision()
    }

    // ── Nodes ────────────────────────────────────────────────────────

    /// Instantiate a template at `position`. The returned node carries the
    /// controller's provisional name until [`rename_and_move`](Self::rename_and_move).
    pub async fn create_node_from_template(
        &self,
        template_id: &str,
        position: Position,
    ) -> Result<Arc<Node>, CoreError> {
        let result = self
            .client
            .create_node_from_template(template_id, &TemplateInstance::at(position.x, position.y))
            .await
            .map_err(CoreError::from)
            .and_then(Node::try_from);

        match result {
            Ok(node) => {
                info!(node = %node.name, id = %node.id, template_id, "node created");
                self.store.upsert_node(node.clone());
                Ok(Arc::new(node))
            }
            Err(e) => {
                log_failure("create node", template_id, &e);
                Err(e)
            }
        }
    }

    /// Give a node its final name and position (label follows the name).
    pub async fn rename_and_move(
        &self,
        id: &NodeId,
        name: &str,
        position: Position,
    ) -> Result<Arc<Node>, CoreError> {
        let update = NodeUpdate::rename_and_move(id.as_str(), name, position.x, position.y);
        let result = self
            .client
            .update_node(id.as_str(), &update)
            .await
            .map_err(CoreError::from)
            .and_then(Node::try_from);

        match result {
            Ok(node) => {
                info!(node = %node.name, id = %node.id, "node renamed");
                self.store.upsert_node(node.clone());
                Ok(Arc::new(node))
            }
            Err(e) => {
                log_failure("rename node", name, &e);
                Err(e)
            }
        }
    }

    /// Delete a node. Links attached to it disappear with it.
    pub async fn delete_node(&self, id: &NodeId) -> Result<(), CoreError> {
        let name = self.display_name(id);
        match self.client.delete_node(id.as_str()).await {
            Ok(()) => {
                info!(node = %name, id = %id, "node deleted");
                self.store.remove_node(id);
                Ok(())
            }
            Err(e) => {
                let e = CoreError::from(e);
                log_failure("delete node", &name, &e);
                Err(e)
            }
        }
    }

    /// Delete nodes by id, concurrently within the client's connection cap.
    /// Ids missing from the index are still sent to the controller. Each
    /// result carries the node's name, or its id when the name is unknown.
    pub async fn delete_nodes(&self, ids: &[NodeId]) -> Vec<(String, Result<(), CoreError>)> {
        let futs = ids
            .iter()
            .map(|id| async move { (self.display_name(id), self.delete_node(id).await) });
        join_all(futs).await
    }

    /// Upload a startup configuration to a node.
    pub async fn push_config(&self, node: &Node, config: &str) -> Result<(), CoreError> {
        match self.client.upload_startup_config(node.id.as_str(), config).await {
            Ok(()) => {
                info!(node = %node.name, bytes = config.len(), "startup config pushed");
                Ok(())
            }
            Err(e) => {
                let e = CoreError::from(e);
                log_failure("push config", &node.name, &e);
                Err(e)
            }
        }
    }

    /// Start one node and mark it started.
    pub async fn start_node(&self, id: &NodeId) -> Result<(), CoreError> {
        let name = self.display_name(id);
        match self.client.start_node(id.as_str()).await {
            Ok(()) => {
                info!(node = %name, "node started");
                self.store.set_status(id, NodeStatus::Started);
                Ok(())
            }
            Err(e) => {
                let e = CoreError::from(e);
                log_failure("start node", &name, &e);
                Err(e)
            }
        }
    }

    /// Ask the controller to start every node at once.
    pub async fn start_all_nodes(&self) -> Result<(), CoreError> {
        self.bulk_status_change(NodeStatus::Started).await
    }

    /// Ask the controller to stop every node at once.
    pub async fn stop_all_nodes(&self) -> Result<(), CoreError> {
        self.bulk_status_change(NodeStatus::Stopped).await
    }

    // ── Links ────────────────────────────────────────────────────────

    /// Create a link. The controller has no "create if absent", so check
    /// [`contains_link`](Self::contains_link) first.
    pub async fn create_link(&self, link: &Link) -> Result<Arc<Link>, CoreError> {
        let result = self
            .client
            .create_link(&LinkCreate::from(link))
            .await
            .map_err(CoreError::from)
            .and_then(Link::try_from);

        match result {
            Ok(created) => {
                info!(link = %created, id = ?created.id, "link created");
                let created = Arc::new(created);
                self.store.insert_link((*created).clone());
                Ok(created)
            }
            Err(e) => {
                log_failure("create link", &link.to_string(), &e);
                Err(e)
            }
        }
    }

    // ── Private helpers ──────────────────────────────────────────────

    async fn bulk_status_change(&self, status: NodeStatus) -> Result<(), CoreError> {
        let result = match status {
            NodeStatus::Started => self.client.start_all_nodes().await,
            NodeStatus::Stopped | NodeStatus::Suspended => self.client.stop_all_nodes().await,
        };
        match result {
            Ok(()) => {
                info!(project = self.id(), %status, "all nodes updated");
                self.store.set_all_status(status);
                Ok(())
            }
            Err(e) => {
                let e = CoreError::from(e);
                log_failure("bulk status change", self.id(), &e);
                Err(e)
            }
        }
    }

    fn display_name(&self, id: &NodeId) -> String {
        self.store
            .node_by_id(id)
            .map_or_else(|| id.to_string(), |n| n.name.clone())
    }
}

fn log_failure(action: &str, entity: &str, err: &CoreError) {
    match err {
        CoreError::RemoteRejected { status, body } => {
            error!(action, entity, status, body = %body, "controller rejected request");
        }
        CoreError::RemoteUnavailable { reason } => {
            error!(action, entity, reason = %reason, "controller unreachable");
        }
        other => warn!(action, entity, error = %other, "request failed"),
    }
}
