//! Route-level tests: the full router against a mock upstream.

use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{body_bytes, header as header_eq, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use a2a_proxy::{HttpServer, ProxyConfig};

mod common;

fn router(config: ProxyConfig) -> Router {
    HttpServer::new(config).unwrap().router()
}

async fn read_body(response: axum::response::Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()
}

#[tokio::test]
async fn test_healthz_ignores_configuration() {
    let response = router(ProxyConfig::default())
        .oneshot(Request::get("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_body(response).await, b"ok");
}

#[tokio::test]
async fn test_agent_card_is_rewritten() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/chat/a2a/agent-1.json"))
        .and(header_eq("authorization", "ApiKey test-api-key"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(
                    serde_json::to_vec(&json!({
                        "name": "Elastic agent",
                        "url": format!("{}/api/chat/a2a/agent-1", upstream.uri()),
                        "skills": [{"id": "search", "url": "https://kbn/skill"}]
                    }))
                    .unwrap(),
                    "application/json",
                )
                .insert_header("etag", "\"card-v1\"")
                .insert_header("set-cookie", "sid=upstream"),
        )
        .expect(1)
        .mount(&upstream)
        .await;

    let response = router(common::proxy_config(&upstream.uri()))
        .oneshot(Request::get("/elastic/agent.json").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers().clone();
    assert_eq!(headers[header::CONTENT_TYPE], "application/json");
    assert_eq!(headers[header::ETAG], "\"card-v1\"");
    assert!(headers.get(header::SET_COOKIE).is_none());
    assert!(headers.get("x-request-id").is_some());

    let card: Value = serde_json::from_slice(&read_body(response).await).unwrap();
    assert_eq!(card["url"], "https://proxy.example.com/elastic/agent");
    assert_eq!(card["skills"][0]["url"], "https://proxy.example.com/elastic/agent");
    assert_eq!(card["name"], "Elastic agent");
}

#[tokio::test]
async fn test_compressed_agent_card_is_decoded_and_rewritten() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/chat/a2a/agent-1.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-encoding", "gzip")
                .set_body_raw(common::GZIP_CARD.to_vec(), "application/json"),
        )
        .expect(1)
        .mount(&upstream)
        .await;

    let request = Request::get("/elastic/agent.json")
        .header(header::ACCEPT_ENCODING, "gzip")
        .body(Body::empty())
        .unwrap();
    let response = router(common::proxy_config(&upstream.uri()))
        .oneshot(request)
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(header::CONTENT_ENCODING).is_none());
    let body = read_body(response).await;
    let card: Value = serde_json::from_slice(&body).expect("caller should get plain JSON");
    assert_eq!(
        card,
        json!({"name": "agent", "url": "https://proxy.example.com/elastic/agent"})
    );
    assert!(!String::from_utf8_lossy(&body).contains("kbn.internal"));
}

#[tokio::test]
async fn test_action_is_forwarded_verbatim() {
    let upstream = MockServer::start().await;
    let payload = br#"{"jsonrpc":"2.0","id":1,"method":"message/send"}"#.to_vec();
    let answer = br#"{"jsonrpc":"2.0","id":1,"result":{"url":"https://kbn/keep"}}"#.to_vec();

    Mock::given(method("POST"))
        .and(path("/api/chat/a2a/agent-1"))
        .and(body_bytes(payload.clone()))
        .respond_with(ResponseTemplate::new(202).set_body_raw(answer.clone(), "application/json"))
        .expect(1)
        .mount(&upstream)
        .await;

    let request = Request::post("/elastic/agent")
        .header(header::AUTHORIZATION, "Bearer caller-token")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-caller", "kept")
        .body(Body::from(payload.clone()))
        .unwrap();
    let response = router(common::proxy_config(&upstream.uri()))
        .oneshot(request)
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert_eq!(read_body(response).await, answer);

    let received = upstream.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    let sent = &received[0];
    let auth: Vec<_> = sent.headers.get_all("authorization").iter().collect();
    assert_eq!(auth.len(), 1);
    assert_eq!(auth[0], "ApiKey test-api-key");
    assert_eq!(sent.headers.get("x-caller").unwrap(), "kept");
    assert_eq!(sent.body, payload);
}

#[tokio::test]
async fn test_missing_settings_are_500_without_upstream_call() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&upstream)
        .await;

    let mut config = common::proxy_config(&upstream.uri());
    config.agent.api_key = None;

    let response = router(config)
        .oneshot(Request::post("/elastic/agent").body(Body::from("{}")).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let detail: Value = serde_json::from_slice(&read_body(response).await).unwrap();
    assert_eq!(detail, json!({"detail": "Server misconfigured: missing API_KEY"}));
}

#[tokio::test]
async fn test_disallowed_host_is_400_without_upstream_call() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&upstream)
        .await;

    let mut config = common::proxy_config(&upstream.uri());
    config.agent.allowed_hosts = vec!["kbn.example.com".into()];

    let response = router(config)
        .oneshot(Request::get("/elastic/agent.json").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let detail: Value = serde_json::from_slice(&read_body(response).await).unwrap();
    assert!(detail["detail"].as_str().unwrap().contains("127.0.0.1"));
}

#[tokio::test]
async fn test_unreachable_upstream_is_502() {
    let addr = common::unused_addr();
    let response = router(common::proxy_config(&format!("http://{}", addr)))
        .oneshot(Request::post("/elastic/agent").body(Body::from("{}")).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let detail: Value = serde_json::from_slice(&read_body(response).await).unwrap();
    let message = detail["detail"].as_str().unwrap();
    assert!(message.starts_with("Upstream request failed: "));
    assert!(!message.contains("test-api-key"));
}

#[tokio::test]
async fn test_slow_upstream_is_504() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&upstream)
        .await;

    let mut config = common::proxy_config(&upstream.uri());
    config.timeouts.request_secs = 0.2;

    let response = router(config)
        .oneshot(Request::post("/elastic/agent").body(Body::from("{}")).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    let detail: Value = serde_json::from_slice(&read_body(response).await).unwrap();
    assert_eq!(detail, json!({"detail": "Upstream timeout"}));
}

#[tokio::test]
async fn test_upstream_error_status_is_relayed() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_raw(r#"{"message":"agent not found"}"#, "application/json"),
        )
        .mount(&upstream)
        .await;

    let response = router(common::proxy_config(&upstream.uri()))
        .oneshot(Request::get("/elastic/agent.json").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(read_body(response).await, br#"{"message":"agent not found"}"#);
}

#[tokio::test]
async fn test_only_configured_routes_exist() {
    let app = router(common::proxy_config("https://kbn.example.com"));

    let wrong_method = app
        .clone()
        .oneshot(Request::get("/elastic/agent").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(wrong_method.status(), StatusCode::METHOD_NOT_ALLOWED);

    let unknown = app
        .oneshot(Request::get("/api/chat/a2a/agent-1.json").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let mut config = common::proxy_config("https://kbn.example.com");
    config.security.max_body_size = 16;

    let response = router(config)
        .oneshot(
            Request::post("/elastic/agent")
                .header(header::CONTENT_LENGTH, "64")
                .body(Body::from(vec![b'x'; 64]))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}
