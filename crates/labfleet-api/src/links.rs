// Link endpoints
//
// The controller has no "create if absent" for links; callers must check
// their own index before calling `create_link`.

use tracing::debug;

use crate::client::ProjectClient;
use crate::error::Error;
use crate::models::{LinkCreate, LinkResponse};

impl ProjectClient {
    /// List every link in the project.
    ///
    /// `GET /projects/{id}/links`
    pub async fn list_links(&self) -> Result<Vec<LinkResponse>, Error> {
        debug!("listing links");
        self.get("links").await
    }

    /// Create a link between two ports.
    ///
    /// `POST /projects/{id}/nodes/links`
    pub async fn create_link(&self, link: &LinkCreate) -> Result<LinkResponse, Error> {
        debug!(endpoints = link.nodes.len(), "creating link");
        self.post("nodes/links", link).await
    }
}
