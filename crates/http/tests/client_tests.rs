//! Integration tests for the Porter HTTP client

use async_trait::async_trait;
use mockall::mock;
use porter_http::client::middleware::RequestMiddleware;
use porter_http::client::ApiClient;
use porter_http::{
    ClientConfig, ClientError, FileTokenStore, MemoryTokenStore, Navigator, TokenStore,
};
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mock! {
    pub Navigator {}

    impl Navigator for Navigator {
        fn navigate(&self, path: &str);
    }
}

fn config(base: &str) -> ClientConfig {
    ClientConfig {
        base_endpoint: base.to_string(),
        ..ClientConfig::default()
    }
}

fn expect_login_redirect(times: usize) -> MockNavigator {
    let mut navigator = MockNavigator::new();
    navigator
        .expect_navigate()
        .withf(|path| path == "/login")
        .times(times)
        .return_const(());
    navigator
}

fn guarded_client(
    server: &MockServer,
    tokens: &Arc<MemoryTokenStore>,
    navigator: MockNavigator,
) -> ApiClient {
    ApiClient::with_session_guard(&config(&server.uri()), tokens.clone(), Arc::new(navigator))
        .unwrap()
}

#[tokio::test]
async fn test_client_builder() {
    let client = ApiClient::builder()
        .base_url("http://localhost:3000/")
        .build()
        .unwrap();

    assert_eq!(client.base_url(), "http://localhost:3000");
}

#[tokio::test]
async fn test_client_builder_requires_base_url() {
    let result = ApiClient::builder().build();
    assert!(matches!(result, Err(ClientError::Configuration(_))));

    let result = ApiClient::new("not a url");
    assert!(matches!(result, Err(ClientError::Configuration(_))));
}

#[tokio::test]
async fn test_login_posts_json_credentials() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"username": "alice", "password": "correct"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "T1"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri()).unwrap();
    let response = client.login("alice", "correct").await.unwrap();
    assert_eq!(response.access_token, "T1");
}

#[tokio::test]
async fn test_requests_carry_porter_user_agent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/repos"))
        .and(header(
            "user-agent",
            concat!("porter/", env!("CARGO_PKG_VERSION")),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri()).unwrap();
    assert!(client.repositories().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_corrupt_token_file_does_not_block_requests() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "T1"})))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::TempDir::new().unwrap();
    let file = dir.path().join("storage.json");
    std::fs::write(&file, r#"{"access_token": "#).unwrap();
    let tokens = Arc::new(FileTokenStore::new(&file, "access_token"));

    let client = ApiClient::with_session_guard(
        &config(&server.uri()),
        tokens.clone(),
        Arc::new(MockNavigator::new()),
    )
    .unwrap();
    let response = client.login("alice", "correct").await.unwrap();
    tokens.set(&response.access_token).unwrap();

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
    assert_eq!(tokens.get().unwrap().as_deref(), Some("T1"));
}

#[tokio::test]
async fn test_bearer_token_attached_when_stored() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/protected"))
        .and(header("authorization", "Bearer T1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"logged_in_as": "alice"})))
        .expect(1)
        .mount(&server)
        .await;

    let tokens = Arc::new(MemoryTokenStore::with_token("T1"));
    let client = guarded_client(&server, &tokens, MockNavigator::new());

    let response = client.protected().await.unwrap();
    assert_eq!(response.logged_in_as.as_str(), "alice");
}

#[tokio::test]
async fn test_no_authorization_header_without_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "cpu_usage": 12.5,
            "memory_usage": 40.0,
            "disk_usage": 71.2,
            "uptime": "up 3 days"
        })))
        .mount(&server)
        .await;

    let tokens = Arc::new(MemoryTokenStore::new());
    let client = guarded_client(&server, &tokens, MockNavigator::new());

    let stats = client.stats().await.unwrap();
    assert!((stats.cpu_usage - 12.5).abs() < f64::EPSILON);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_token_is_read_on_every_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/repos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let tokens = Arc::new(MemoryTokenStore::new());
    let client = guarded_client(&server, &tokens, MockNavigator::new());

    client.repositories().await.unwrap();
    tokens.set("T2").unwrap();
    client.repositories().await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
    assert_eq!(
        requests[1].headers.get("authorization").unwrap(),
        "Bearer T2"
    );
}

#[tokio::test]
async fn test_unauthorized_clears_token_and_redirects() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/stats"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"msg": "Token has expired"})),
        )
        .mount(&server)
        .await;

    let tokens = Arc::new(MemoryTokenStore::with_token("stale"));
    let client = guarded_client(&server, &tokens, expect_login_redirect(1));

    let hook_calls = Arc::new(AtomicUsize::new(0));
    let counter = hook_calls.clone();
    client.auth_errors().set_callback(Arc::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    }));

    let result = client.stats().await;

    assert!(matches!(result, Err(ClientError::AuthRejected(ref m)) if m == "Token has expired"));
    assert_eq!(tokens.get().unwrap(), None);
    assert_eq!(hook_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_retried_unauthorized_is_passed_through() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/protected"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let tokens = Arc::new(MemoryTokenStore::with_token("T1"));
    let client = guarded_client(&server, &tokens, expect_login_redirect(0));

    let request = client.request(reqwest::Method::GET, "/api/protected");
    let result: Result<serde_json::Value, _> = client.execute_retry(request).await;

    assert!(matches!(result, Err(ClientError::AuthRejected(_))));
    assert_eq!(tokens.get().unwrap().as_deref(), Some("T1"));
}

#[tokio::test]
async fn test_server_errors_keep_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/stats"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let tokens = Arc::new(MemoryTokenStore::with_token("T1"));
    let client = guarded_client(&server, &tokens, expect_login_redirect(0));

    let result = client.stats().await;

    assert!(matches!(result, Err(ClientError::Server { status: 500, ref message }) if message == "boom"));
    assert_eq!(tokens.get().unwrap().as_deref(), Some("T1"));
}

#[tokio::test]
async fn test_register_conflict_is_validation_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/register"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"error": "Username already exists"})),
        )
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri()).unwrap();
    let result = client.register("alice", "secret").await;

    assert!(matches!(
        result,
        Err(ClientError::Validation { status: 400, ref message }) if message == "Username already exists"
    ));
}

#[tokio::test]
async fn test_network_failure_is_not_treated_as_unauthorized() {
    let tokens = Arc::new(MemoryTokenStore::with_token("T1"));
    let client = ApiClient::with_session_guard(
        &config("http://127.0.0.1:1"),
        tokens.clone(),
        Arc::new(expect_login_redirect(0)),
    )
    .unwrap();

    let result = client.protected().await;

    assert!(matches!(result, Err(ClientError::Network(_))));
    assert_eq!(tokens.get().unwrap().as_deref(), Some("T1"));
}

struct RejectAll;

#[async_trait]
impl RequestMiddleware for RejectAll {
    async fn on_request(&self, _request: &mut reqwest::Request) -> Result<(), ClientError> {
        Err(ClientError::Configuration("offline".into()))
    }
}

#[tokio::test]
async fn test_request_middleware_can_abort() {
    let server = MockServer::start().await;

    let client = ApiClient::builder()
        .base_url(server.uri())
        .request_middleware(RejectAll)
        .build()
        .unwrap();

    let result = client.stats().await;

    assert!(matches!(result, Err(ClientError::Configuration(ref m)) if m == "offline"));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_repository_logs() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/logs/site"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "deployment_logs": ["pulled site"],
            "access_logs": [],
            "error_logs": []
        })))
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri()).unwrap();

    let logs = client.repository_logs("site").await.unwrap();
    assert_eq!(logs.deployment_logs, vec!["pulled site".to_string()]);

    let result = client.repository_logs("../etc").await;
    assert!(matches!(result, Err(ClientError::InvalidInput(_))));
}
