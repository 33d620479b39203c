// Node endpoints
//
// Listing, template instantiation, rename/move, deletion, startup-config
// upload and start/stop (single and bulk).

use tracing::debug;

use crate::client::{Payload, ProjectClient};
use crate::error::Error;
use crate::models::{NodeResponse, NodeUpdate, TemplateInstance};

impl ProjectClient {
    /// List every node in the project.
    ///
    /// `GET /projects/{id}/nodes`
    pub async fn list_nodes(&self) -> Result<Vec<NodeResponse>, Error> {
        debug!("listing nodes");
        self.get("nodes").await
    }

    /// Instantiate a template at a position. The controller picks a
    /// provisional name; rename it with [`update_node`](Self::update_node).
    ///
    /// `POST /projects/{id}/templates/{template_id}`
    pub async fn create_node_from_template(
        &self,
        template_id: &str,
        at: &TemplateInstance,
    ) -> Result<NodeResponse, Error> {
        debug!(template_id, x = at.x, y = at.y, "instantiating template");
        self.post(&format!("templates/{template_id}"), at).await
    }

    /// Rename and/or move a node.
    ///
    /// `PUT /projects/{id}/nodes/{node_id}`
    pub async fn update_node(&self, node_id: &str, update: &NodeUpdate) -> Result<NodeResponse, Error> {
        debug!(node_id, name = %update.name, "updating node");
        self.put(&format!("nodes/{node_id}"), update).await
    }

    /// Delete a node (the controller drops its links too).
    ///
    /// `DELETE /projects/{id}/nodes/{node_id}`
    pub async fn delete_node(&self, node_id: &str) -> Result<(), Error> {
        debug!(node_id, "deleting node");
        self.delete(&format!("nodes/{node_id}")).await
    }

    /// Replace a node's startup configuration with raw config text.
    ///
    /// `POST /projects/{id}/nodes/{node_id}/files/startup-config.cfg`
    pub async fn upload_startup_config(&self, node_id: &str, config: &str) -> Result<(), Error> {
        debug!(node_id, bytes = config.len(), "uploading startup config");
        self.post_no_response(
            &format!("nodes/{node_id}/files/startup-config.cfg"),
            &Payload::Text(config),
        )
        .await
    }

    /// Start one node.
    ///
    /// `POST /projects/{id}/nodes/{node_id}/start`
    pub async fn start_node(&self, node_id: &str) -> Result<(), Error> {
        debug!(node_id, "starting node");
        self.post_no_response(&format!("nodes/{node_id}/start"), &Payload::Empty)
            .await
    }

    /// Start every node in the project in one controller-side operation.
    ///
    /// `POST /projects/{id}/nodes/start`
    pub async fn start_all_nodes(&self) -> Result<(), Error> {
        debug!("starting all nodes");
        self.post_no_response("nodes/start", &Payload::Empty).await
    }

    /// Stop every node in the project.
    ///
    /// `POST /projects/{id}/nodes/stop`
    pub async fn stop_all_nodes(&self) -> Result<(), Error> {
        debug!("stopping all nodes");
        self.post_no_response("nodes/stop", &Payload::Empty).await
    }
}
