// labfleet-api: Async Rust client for a network-emulation controller's project API

pub mod client;
pub mod error;
pub mod links;
pub mod models;
pub mod nodes;
pub mod retry;
pub mod transport;

pub use client::ProjectClient;
pub use error::Error;
pub use models::{Label, LinkCreate, LinkEndpoint, LinkResponse, NodeResponse, NodeUpdate, TemplateInstance};
pub use retry::RetryPolicy;
pub use transport::{BasicAuth, DEFAULT_MAX_CONNECTIONS, TransportConfig};
