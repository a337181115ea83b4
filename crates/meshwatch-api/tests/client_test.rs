// Integration tests for `MeshClient` using wiremock.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use meshwatch_api::{Error, MeshClient, StaticTokens, TokenCache, TokenSource};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, MeshClient) {
    let server = MockServer::start().await;
    let tokens = TokenCache::new(
        Arc::new(StaticTokens::new().with("net-1", "secret-token")),
        Duration::from_secs(3600),
    );
    let base = MeshClient::base_url_for_host(&server.uri()).unwrap();
    let client = MeshClient::with_client(reqwest::Client::new(), base, tokens);
    (server, client)
}

struct CountingSource {
    calls: AtomicUsize,
}

impl TokenSource for CountingSource {
    fn fetch_token(&self, _network_id: &str) -> Result<SecretString, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(SecretString::from("rotating-token".to_owned()))
    }
}

// ── Happy-path tests ────────────────────────────────────────────────

#[tokio::test]
async fn test_list_devices_sends_token_header() {
    let (server, client) = setup().await;

    let body = json!({
        "meta": { "code": 200, "server_time": "2024-01-01T00:00:00Z" },
        "data": [
            {
                "mac": "AA:BB:CC:00:00:01",
                "nickname": "Kitchen iPad",
                "hostname": "ipad",
                "manufacturer": "Apple",
                "connected": true,
                "wireless": true,
                "interface": { "eero_url": "/2.2/eeros/11" }
            },
            {
                "mac": "AA:BB:CC:00:00:02",
                "connected": false,
                "wireless": false
            }
        ]
    });

    Mock::given(method("GET"))
        .and(path("/2.2/networks/net-1/devices"))
        .and(header("X-User-Token", "secret-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    let devices = client.list_devices("net-1").await.unwrap();

    assert_eq!(devices.len(), 2);
    assert_eq!(devices[0].nickname.as_deref(), Some("Kitchen iPad"));
    assert!(devices[0].connected);
    assert_eq!(
        devices[0]
            .interface
            .as_ref()
            .and_then(|i| i.ap_url.as_deref()),
        Some("/2.2/eeros/11")
    );
    assert!(!devices[1].connected);
}

#[tokio::test]
async fn test_list_access_points() {
    let (server, client) = setup().await;

    let body = json!({
        "meta": { "code": 200 },
        "data": [
            { "url": "/2.2/eeros/11", "nickname": "Living Room", "model": "eero Pro 6" },
            { "url": "/2.2/eeros/12", "location": "Office", "model": "eero 6" }
        ]
    });

    Mock::given(method("GET"))
        .and(path("/2.2/networks/net-1/eeros"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let aps = client.list_access_points("net-1").await.unwrap();

    assert_eq!(aps.len(), 2);
    assert_eq!(aps[0].url, "/2.2/eeros/11");
    assert_eq!(aps[1].location.as_ref().and_then(|l| l.name()), Some("Office"));
}

#[tokio::test]
async fn test_missing_data_is_empty() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/2.2/networks/net-1/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "meta": { "code": 200 } })))
        .mount(&server)
        .await;

    let devices = client.list_devices("net-1").await.unwrap();
    assert!(devices.is_empty());
}

// ── Error-path tests ────────────────────────────────────────────────

#[tokio::test]
async fn test_unauthorized_maps_to_authentication() {
    let server = MockServer::start().await;
    let source = Arc::new(CountingSource {
        calls: AtomicUsize::new(0),
    });
    let tokens = TokenCache::new(source.clone(), Duration::from_secs(3600));
    let base = MeshClient::base_url_for_host(&server.uri()).unwrap();
    let client = MeshClient::with_client(reqwest::Client::new(), base, tokens);

    Mock::given(method("GET"))
        .and(path("/2.2/networks/net-1/devices"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = client.list_devices("net-1").await.unwrap_err();
    assert!(err.is_auth_expired(), "expected auth error, got {err:?}");

    // The rejected token was dropped, so the next call resolves it again.
    let _ = client.list_devices("net-1").await;
    assert_eq!(source.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_server_error_maps_to_api_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/2.2/networks/net-1/eeros"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({
            "meta": { "code": 503, "error": "service.unavailable" }
        })))
        .mount(&server)
        .await;

    let err = client.list_access_points("net-1").await.unwrap_err();
    match err {
        Error::Api { status, ref message } => {
            assert_eq!(status, 503);
            assert_eq!(message, "service.unavailable");
            assert!(err.is_transient());
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_bad_json_keeps_body() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/2.2/networks/net-1/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client.list_devices("net-1").await.unwrap_err();
    match err {
        Error::Deserialization { body, .. } => assert_eq!(body, "not json"),
        other => panic!("expected Deserialization error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unknown_network_has_no_token() {
    let (_server, client) = setup().await;

    let err = client.list_devices("net-404").await.unwrap_err();
    assert!(matches!(err, Error::MissingToken { ref network_id } if network_id == "net-404"));
}
