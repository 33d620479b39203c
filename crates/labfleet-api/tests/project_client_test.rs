#![allow(clippy::unwrap_used)]
// Integration tests for `ProjectClient` using wiremock.

use std::time::Duration;

use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, body_string, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use labfleet_api::{Error, LinkCreate, LinkEndpoint, NodeUpdate, ProjectClient, RetryPolicy, TemplateInstance};

// ── Helpers ─────────────────────────────────────────────────────────

const PROJECT: &str = "1cd5351d";

async fn setup() -> (MockServer, ProjectClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&format!("{}/v2", server.uri())).unwrap();
    let client = ProjectClient::with_client(reqwest::Client::new(), base_url, PROJECT, 4)
        .with_retry(RetryPolicy::none());
    (server, client)
}

fn project_path(suffix: &str) -> String {
    format!("/v2/projects/{PROJECT}/{suffix}")
}

fn node_json(id: &str, name: &str, status: &str) -> serde_json::Value {
    json!({
        "node_id": id,
        "node_type": "dynamips",
        "name": name,
        "x": 0,
        "y": 0,
        "z": 1,
        "status": status,
        "compute_id": "local"
    })
}

fn quick_retry(attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts: attempts,
        initial_delay: Duration::from_millis(1),
        multiplier: 1,
    }
}

// ── Reads ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_nodes() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(project_path("nodes")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            node_json("a", "Switch1", "started"),
            node_json("b", "1", "stopped"),
        ])))
        .mount(&server)
        .await;

    let nodes = client.list_nodes().await.unwrap();
    assert_eq!(nodes.len(), 2);
    assert_eq!(nodes[0].name, "Switch1");
    assert_eq!(nodes[1].status, "stopped");
}

#[tokio::test]
async fn test_list_links() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(project_path("links")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "link_id": "l1",
            "link_type": "ethernet",
            "nodes": [
                { "node_id": "a", "adapter_number": 0, "port_number": 3, "label": { "text": "e3" } },
                { "node_id": "b", "adapter_number": 0, "port_number": 0 }
            ]
        }])))
        .mount(&server)
        .await;

    let links = client.list_links().await.unwrap();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].nodes[0].port_number, 3);
}

#[tokio::test]
async fn test_rejection_keeps_status_and_body() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(project_path("nodes")))
        .respond_with(ResponseTemplate::new(404).set_body_string("project not found"))
        .mount(&server)
        .await;

    let result = client.list_nodes().await;
    match result {
        Err(Error::Api { status, body }) => {
            assert_eq!(status, 404);
            assert_eq!(body, "project not found");
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_payload_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(project_path("nodes")))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let result = client.list_nodes().await;
    assert!(
        matches!(result, Err(Error::Deserialization { ref body, .. }) if body == "not json"),
        "expected Deserialization error, got: {result:?}"
    );
}

// ── Mutations ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_node_from_template_posts_position() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(project_path("templates/tmpl-1")))
        .and(body_json(json!({ "x": -425, "y": -425 })))
        .respond_with(ResponseTemplate::new(201).set_body_json(node_json("n9", "R-1", "stopped")))
        .expect(1)
        .mount(&server)
        .await;

    let node = client
        .create_node_from_template("tmpl-1", &TemplateInstance::at(-425, -425))
        .await
        .unwrap();
    assert_eq!(node.node_id, "n9");
    assert_eq!(node.name, "R-1");
}

#[tokio::test]
async fn test_update_node_sends_name_and_label() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path(project_path("nodes/n9")))
        .respond_with(ResponseTemplate::new(200).set_body_json(node_json("n9", "7", "stopped")))
        .expect(1)
        .mount(&server)
        .await;

    let update = NodeUpdate::rename_and_move("n9", "7", 10, 20);
    let node = client.update_node("n9", &update).await.unwrap();
    assert_eq!(node.name, "7");

    let requests = server.received_requests().await.unwrap();
    let sent: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(sent["label"]["text"], "7");
    assert_eq!(sent["x"], 10);
}

#[tokio::test]
async fn test_create_link_posts_both_ports() {
    let (server, client) = setup().await;

    let expected = json!({
        "link_type": "ethernet",
        "nodes": [
            { "node_id": "r", "adapter_number": 0, "port_number": 0 },
            { "node_id": "s", "adapter_number": 0, "port_number": 5 }
        ]
    });

    Mock::given(method("POST"))
        .and(path(project_path("nodes/links")))
        .and(body_json(&expected))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "link_id": "new-link",
            "nodes": expected["nodes"].clone()
        })))
        .expect(1)
        .mount(&server)
        .await;

    let link = LinkCreate::ethernet(
        LinkEndpoint { node_id: "r".into(), adapter_number: 0, port_number: 0 },
        LinkEndpoint { node_id: "s".into(), adapter_number: 0, port_number: 5 },
    );
    let created = client.create_link(&link).await.unwrap();
    assert_eq!(created.link_id, "new-link");
}

#[tokio::test]
async fn test_upload_startup_config_sends_raw_text() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(project_path("nodes/n1/files/startup-config.cfg")))
        .and(body_string("hostname 1\n"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    client.upload_startup_config("n1", "hostname 1\n").await.unwrap();
}

#[tokio::test]
async fn test_start_stop_and_delete() {
    let (server, client) = setup().await;

    for suffix in ["nodes/n1/start", "nodes/start", "nodes/stop"] {
        Mock::given(method("POST"))
            .and(path(project_path(suffix)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;
    }
    Mock::given(method("DELETE"))
        .and(path(project_path("nodes/n1")))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client.start_node("n1").await.unwrap();
    client.start_all_nodes().await.unwrap();
    client.stop_all_nodes().await.unwrap();
    client.delete_node("n1").await.unwrap();
}

// ── Retry ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_reads_retry_on_server_error() {
    let server = MockServer::start().await;
    let base_url = Url::parse(&format!("{}/v2", server.uri())).unwrap();
    let client = ProjectClient::with_client(reqwest::Client::new(), base_url, PROJECT, 4)
        .with_retry(quick_retry(3));

    Mock::given(method("GET"))
        .and(path(project_path("nodes")))
        .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(project_path("nodes")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .with_priority(2)
        .mount(&server)
        .await;

    let nodes = client.list_nodes().await.unwrap();
    assert!(nodes.is_empty());
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_mutations_are_not_retried_on_rejection() {
    let server = MockServer::start().await;
    let base_url = Url::parse(&format!("{}/v2", server.uri())).unwrap();
    let client = ProjectClient::with_client(reqwest::Client::new(), base_url, PROJECT, 4)
        .with_retry(quick_retry(3));

    Mock::given(method("POST"))
        .and(path(project_path("nodes/links")))
        .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
        .expect(1)
        .mount(&server)
        .await;

    let link = LinkCreate::ethernet(
        LinkEndpoint { node_id: "r".into(), adapter_number: 0, port_number: 0 },
        LinkEndpoint { node_id: "s".into(), adapter_number: 0, port_number: 1 },
    );
    let result = client.create_link(&link).await;
    assert!(matches!(result, Err(Error::Api { status: 503, .. })));
}

#[tokio::test]
async fn test_unreachable_controller_is_transport_error() {
    let client = ProjectClient::with_client(
        reqwest::Client::new(),
        Url::parse("http://127.0.0.1:1/v2").unwrap(),
        PROJECT,
        1,
    )
    .with_retry(RetryPolicy::none());

    let err = client.list_nodes().await.unwrap_err();
    assert!(err.is_transport(), "expected transport error, got: {err:?}");
}
