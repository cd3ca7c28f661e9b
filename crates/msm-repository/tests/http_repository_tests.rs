//! HTTP repository against a mock manager API.

use msm_collection::{ItemId, ParentId};
use msm_repository::{
    CollectionPath, CollectionRepository, HttpRepository, RepositoryConfig, RepositoryError,
};
use std::time::Duration;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn hosts_repo(server: &MockServer) -> HttpRepository {
    let config = RepositoryConfig::new().with_api_url(server.uri());
    HttpRepository::new(&config, CollectionPath::new("worker-managers", "assigned-hosts")).unwrap()
}

fn ids(items: &[&str]) -> Vec<ItemId> {
    items.iter().map(|s| ItemId::from(*s)).collect()
}

#[tokio::test]
async fn load_decodes_id_array() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/worker-managers/7/assigned-hosts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!(["hostA", "hostB"])))
        .expect(1)
        .mount(&server)
        .await;

    let repo = hosts_repo(&server);
    let hosts = repo.load(&ParentId::from(7)).await.unwrap();
    assert_eq!(hosts, ids(&["hostA", "hostB"]));
}

#[tokio::test]
async fn load_decodes_objects_with_configured_field() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rules/hosts/cpu-rule/conditions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"name": "cpu-over-90", "value": 90},
            {"name": "mem-over-80", "value": 80}
        ])))
        .mount(&server)
        .await;

    let config = RepositoryConfig::new()
        .with_api_url(server.uri())
        .with_id_field("name");
    let repo = HttpRepository::new(&config, CollectionPath::new("rules/hosts", "conditions")).unwrap();

    let conditions = repo.load(&ParentId::from("cpu-rule")).await.unwrap();
    assert_eq!(conditions, ids(&["cpu-over-90", "mem-over-80"]));
}

#[tokio::test]
async fn add_posts_id_array() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/worker-managers/42/assigned-hosts"))
        .and(body_json(serde_json::json!(["hostA", "hostB"])))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let repo = hosts_repo(&server);
    repo.add(&ParentId::from(42), &ids(&["hostA", "hostB"])).await.unwrap();
}

#[tokio::test]
async fn remove_sends_delete_with_body() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/worker-managers/7/assigned-hosts"))
        .and(body_json(serde_json::json!(["hostA"])))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let repo = hosts_repo(&server);
    repo.remove(&ParentId::from(7), &ids(&["hostA"])).await.unwrap();
}

#[tokio::test]
async fn rejection_carries_backend_message() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/worker-managers/7/assigned-hosts"))
        .respond_with(
            ResponseTemplate::new(409)
                .set_body_json(serde_json::json!({"message": "host still running containers"})),
        )
        .mount(&server)
        .await;

    let repo = hosts_repo(&server);
    let err = repo.remove(&ParentId::from(7), &ids(&["hostA"])).await.unwrap_err();

    assert_eq!(
        err,
        RepositoryError::Status {
            status: 409,
            reason: "host still running containers".to_string(),
        }
    );
    assert_eq!(err.reason(), "host still running containers");
}

#[tokio::test]
async fn load_rejects_malformed_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/worker-managers/7/assigned-hosts"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let repo = hosts_repo(&server);
    let err = repo.load(&ParentId::from(7)).await.unwrap_err();
    assert!(matches!(err, RepositoryError::Decode(_)));
}

#[tokio::test]
async fn slow_backend_times_out_as_transport_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/worker-managers/7/assigned-hosts"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([]))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let config = RepositoryConfig::new()
        .with_api_url(server.uri())
        .with_request_timeout(Duration::from_millis(50));
    let repo =
        HttpRepository::new(&config, CollectionPath::new("worker-managers", "assigned-hosts")).unwrap();

    let err = repo.load(&ParentId::from(7)).await.unwrap_err();
    assert!(matches!(err, RepositoryError::Transport(_)));
    assert!(err.is_retryable());
}
