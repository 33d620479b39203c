// Project-scoped HTTP client
//
// Wraps `reqwest::Client` with project URL construction, a cap on in-flight
// requests, status translation and retry. Endpoint groups (nodes, links)
// are implemented as inherent methods in separate files to keep this module
// focused on transport mechanics.

use reqwest::Method;
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::Semaphore;
use tracing::{debug, warn};
use url::Url;

use crate::error::Error;
use crate::retry::RetryPolicy;
use crate::transport::{BasicAuth, TransportConfig};

/// Request body variants the controller accepts.
pub(crate) enum Payload<'a> {
    Empty,
    Json(serde_json::Value),
    Text(&'a str),
}

/// Raw HTTP client for one project on the controller.
///
/// Every call waits for a slot in the connection limiter before it is sent,
/// so no more than `max_connections` requests are ever outstanding,
/// regardless of how many futures are polled concurrently.
#[derive(Debug)]
pub struct ProjectClient {
    http: reqwest::Client,
    base_url: Url,
    project_id: String,
    limiter: Semaphore,
    retry: RetryPolicy,
    basic_auth: Option<BasicAuth>,
}

impl ProjectClient {
    /// Create a client from a `TransportConfig`.
    ///
    /// `base_url` is the controller API root, e.g. `http://10.0.0.5:3080/v2`.
    pub fn new(base_url: Url, project_id: impl Into<String>, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url,
            project_id: project_id.into(),
            limiter: Semaphore::new(transport.connection_cap()),
            retry: RetryPolicy::default(),
            basic_auth: transport.basic_auth.clone(),
        })
    }

    /// Create a client around a pre-built `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        base_url: Url,
        project_id: impl Into<String>,
        max_connections: usize,
    ) -> Self {
        Self {
            http,
            base_url,
            project_id: project_id.into(),
            limiter: Semaphore::new(max_connections.max(1)),
            retry: RetryPolicy::default(),
            basic_auth: None,
        }
    }

    /// Replace the retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// The project this client is scoped to.
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// The controller API root.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Number of request slots currently free.
    pub fn available_slots(&self) -> usize {
        self.limiter.available_permits()
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Build `{base}/projects/{project_id}/{path}`.
    pub(crate) fn project_url(&self, path: &str) -> Result<Url, Error> {
        let full = format!(
            "{}/projects/{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            self.project_id,
            path
        );
        Ok(Url::parse(&full)?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let body = self.request(Method::GET, path, &Payload::Empty).await?;
        decode(&body)
    }

    pub(crate) async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T, Error> {
        let payload = Payload::Json(encode(body)?);
        let body = self.request(Method::POST, path, &payload).await?;
        decode(&body)
    }

    pub(crate) async fn put<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T, Error> {
        let payload = Payload::Json(encode(body)?);
        let body = self.request(Method::PUT, path, &payload).await?;
        decode(&body)
    }

    /// POST whose response body is irrelevant.
    pub(crate) async fn post_no_response(&self, path: &str, payload: &Payload<'_>) -> Result<(), Error> {
        self.request(Method::POST, path, payload).await.map(drop)
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<(), Error> {
        self.request(Method::DELETE, path, &Payload::Empty).await.map(drop)
    }

    /// Send a request, retrying per the policy. Only GET counts as
    /// idempotent; mutations are repeated solely after transport failures.
    async fn request(&self, method: Method, path: &str, payload: &Payload<'_>) -> Result<String, Error> {
        let url = self.project_url(path)?;
        let idempotent = method == Method::GET;
        let mut attempt = 1;

        loop {
            match self.send_once(method.clone(), url.clone(), payload).await {
                Ok(body) => return Ok(body),
                Err(err) if self.retry.allows_another(attempt) && err.is_retryable(idempotent) => {
                    let delay = self.retry.delay_for(attempt);
                    warn!(
                        %method,
                        %url,
                        attempt,
                        max_attempts = self.retry.max_attempts,
                        delay_ms = delay.as_millis(),
                        error = %err,
                        "request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn send_once(&self, method: Method, url: Url, payload: &Payload<'_>) -> Result<String, Error> {
        let _slot = self.limiter.acquire().await.map_err(|_| Error::LimiterClosed)?;
        debug!("{method} {url}");

        let mut req = self.http.request(method, url);
        if let Some(auth) = &self.basic_auth {
            req = req.basic_auth(&auth.username, Some(auth.password.expose_secret()));
        }
        req = match payload {
            Payload::Empty => req,
            Payload::Json(value) => req.json(value),
            Payload::Text(text) => req.body((*text).to_owned()),
        };

        let resp = req.send().await?;
        let status = resp.status();
        let body = resp.text().await.map_err(|source| Error::Body {
            status: status.as_u16(),
            source,
        })?;

        if status.is_success() {
            Ok(body)
        } else {
            Err(Error::Api {
                status: status.as_u16(),
                body,
            })
        }
    }
}

fn encode<B: Serialize>(body: &B) -> Result<serde_json::Value, Error> {
    serde_json::to_value(body).map_err(|e| Error::Deserialization {
        message: format!("failed to encode request body: {e}"),
        body: String::new(),
    })
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, Error> {
    serde_json::from_str(body).map_err(|e| Error::Deserialization {
        message: e.to_string(),
        body: body.to_owned(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> ProjectClient {
        ProjectClient::with_client(reqwest::Client::new(), Url::parse(base).unwrap(), "p-1", 4)
    }

    #[test]
    fn project_url_joins_base_project_and_path() {
        let c = client("http://10.0.0.5:3080/v2");
        assert_eq!(
            c.project_url("nodes/abc/start").unwrap().as_str(),
            "http://10.0.0.5:3080/v2/projects/p-1/nodes/abc/start"
        );
    }

    #[test]
    fn project_url_tolerates_trailing_slash() {
        let c = client("http://10.0.0.5:3080/v2/");
        assert_eq!(
            c.project_url("links").unwrap().as_str(),
            "http://10.0.0.5:3080/v2/projects/p-1/links"
        );
    }

    #[test]
    fn limiter_starts_full() {
        assert_eq!(client("http://h/v2").available_slots(), 4);
    }
}
