// Gateway router tests against a mocked processing service
// Author: kelexine (https://github.com/kelexine)

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use mockito::{Matcher, Server};
use pixelgate::config::AppConfig;
use pixelgate::error::{INTERNAL_MESSAGE, UNAVAILABLE_MESSAGE};
use pixelgate::server::create_router;
use pixelgate::upstream::UpstreamClient;
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use tower::ServiceExt;

fn gateway(upstream_url: &str, timeout_seconds: u64) -> Router {
    let mut config = AppConfig::default();
    config.upstream.base_url = upstream_url.to_string();
    config.upstream.timeout_seconds = timeout_seconds;
    config.upstream.probe_timeout_seconds = timeout_seconds;
    let upstream = UpstreamClient::new(&config.upstream).unwrap();
    create_router(config, upstream).unwrap()
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if body.is_some() {
        request = request.header("content-type", "application/json");
    }
    let request = request
        .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

/// Address nothing is listening on.
fn closed_upstream() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

/// Accepts connections and never answers.
async fn silent_upstream() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_generate_image_passes_body_through() {
    let mut server = Server::new_async().await;
    let upstream_body = json!({
        "success": true,
        "image": {
            "uuid": "abc-123",
            "url": "https://cdn.example/abc.jpg",
            "prompt": "a red fox",
            "model": "m1",
            "parameters": {"width": 512, "height": 512, "steps": 20, "cfgScale": 7},
            "generationTime": 2.41
        },
        "metadata": {"timestamp": 1700000000.5, "processingTime": 2.41}
    });
    let mock = server
        .mock("POST", "/generate/image")
        .match_body(Matcher::Json(json!({
            "prompt": "a red fox",
            "model": "m1",
            "width": 512,
            "height": 512,
            "steps": 20,
            "cfgScale": 7
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(upstream_body.to_string())
        .expect(1)
        .create_async()
        .await;

    let app = gateway(&server.url(), 30);
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/generate/image",
        Some(r#"{"prompt":"a red fox","model":"m1","width":512,"height":512,"steps":20,"cfgScale":7}"#),
    )
    .await;

    mock.assert_async().await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, upstream_body);
}

#[tokio::test]
async fn test_generate_image_fills_defaults() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/generate/image")
        .match_body(Matcher::Json(json!({
            "prompt": "a red fox",
            "model": "runware:101@1",
            "width": 1024,
            "height": 1024,
            "steps": 20,
            "cfgScale": 7
        })))
        .with_status(200)
        .with_body(r#"{"success":true,"image":{"uuid":"u1"}}"#)
        .expect(1)
        .create_async()
        .await;

    let app = gateway(&server.url(), 30);
    let (status, _) = send(&app, Method::POST, "/api/generate/image", Some(r#"{"prompt":"a red fox"}"#)).await;

    mock.assert_async().await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_invalid_requests_never_reach_upstream() {
    let mut server = Server::new_async().await;
    let spy = server
        .mock("POST", Matcher::Any)
        .with_status(200)
        .with_body("{}")
        .expect(0)
        .create_async()
        .await;

    let app = gateway(&server.url(), 30);
    let cases = [
        ("/api/generate/image", r#"{"model":"m1"}"#, Some("Prompt is required")),
        ("/api/generate/image", r#"{"prompt":"   "}"#, Some("Prompt is required")),
        ("/api/generate/image", r#"{"prompt":null}"#, Some("Prompt is required")),
        ("/api/generate/image", r#"{"prompt":"fox","width":"wide"}"#, Some("Invalid request body")),
        ("/api/generate/image", r#"{"prompt":"fox","width":333}"#, None),
        ("/api/generate/image", r#"{"prompt":"fox","steps":500}"#, None),
        ("/api/generate/image", "{not json", Some("Invalid JSON body")),
        ("/api/generate/video", r#"{}"#, Some("Prompt is required")),
        ("/api/generate/video", r#"{"prompt":"waves","duration":7}"#, None),
        ("/api/generate/video", r#"{"prompt":"waves","width":1280}"#, None),
        ("/api/remove-background", r#"{}"#, Some("Image data is required")),
        ("/api/caption-image", r#"{"image":""}"#, Some("Image data is required")),
        ("/api/caption-image", r#"{"image":null}"#, Some("Image data is required")),
        ("/api/image-to-text", "", Some("Image data is required")),
        ("/api/upscale-image", r#"{"image":"data:image/png;base64,AAAA","scaleFactor":8}"#, None),
    ];

    for (uri, body, message) in cases {
        let (status, response) = send(&app, Method::POST, uri, Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{} {}", uri, body);
        assert_eq!(response["success"], json!(false));
        if let Some(message) = message {
            assert_eq!(response["error"], json!(message), "{} {}", uri, body);
        }
    }

    spy.assert_async().await;
}

#[tokio::test]
async fn test_video_forwards_only_given_fields() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/generate/video")
        .match_body(Matcher::Json(json!({
            "prompt": "waves at dusk",
            "duration": 10,
            "width": 1920,
            "height": 1080
        })))
        .with_status(200)
        .with_body(r#"{"success":true,"video":{"status":"demo"}}"#)
        .expect(1)
        .create_async()
        .await;

    let app = gateway(&server.url(), 30);
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/generate/video",
        Some(r#"{"prompt":"waves at dusk","duration":10,"width":1920,"height":1080}"#),
    )
    .await;

    mock.assert_async().await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["video"]["status"], json!("demo"));
}

#[tokio::test]
async fn test_upscale_defaults_scale_factor() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/upscale-image")
        .match_body(Matcher::Json(json!({"image": "AAAA", "scaleFactor": 2})))
        .with_status(200)
        .with_body(r#"{"success":true,"image":"data:image/png;base64,BBBB"}"#)
        .expect(1)
        .create_async()
        .await;

    let app = gateway(&server.url(), 30);
    let (status, _) = send(&app, Method::POST, "/api/upscale-image", Some(r#"{"image":"AAAA"}"#)).await;

    mock.assert_async().await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_upstream_rejection_is_passed_through() {
    let mut server = Server::new_async().await;
    let upstream_body = json!({"success": false, "error": "Insufficient credits"});
    server
        .mock("POST", "/caption-image")
        .with_status(402)
        .with_body(upstream_body.to_string())
        .create_async()
        .await;

    let app = gateway(&server.url(), 30);
    let (status, body) = send(&app, Method::POST, "/api/caption-image", Some(r#"{"image":"AAAA"}"#)).await;

    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
    assert_eq!(body, upstream_body);
}

#[tokio::test]
async fn test_upstream_non_json_error_is_internal() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/image-to-text")
        .with_status(502)
        .with_body("<html>Bad Gateway</html>")
        .create_async()
        .await;

    let app = gateway(&server.url(), 30);
    let (status, body) = send(&app, Method::POST, "/api/image-to-text", Some(r#"{"image":"AAAA"}"#)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"success": false, "error": INTERNAL_MESSAGE}));
}

#[tokio::test]
async fn test_unreachable_upstream_is_service_unavailable() {
    let app = gateway(&closed_upstream(), 30);
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/remove-background",
        Some(r#"{"image":"AAAA"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body, json!({"success": false, "error": UNAVAILABLE_MESSAGE}));
}

#[tokio::test]
async fn test_upstream_timeout_is_internal_error() {
    let app = gateway(&silent_upstream().await, 1);

    let started = Instant::now();
    let (status, body) = send(&app, Method::POST, "/api/generate/image", Some(r#"{"prompt":"slow"}"#)).await;

    assert!(started.elapsed() < Duration::from_secs(10));
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"success": false, "error": INTERNAL_MESSAGE}));
}

#[tokio::test]
async fn test_health_reports_upstream_document() {
    let mut server = Server::new_async().await;
    let upstream_health = json!({"status": "healthy", "service": "python-ai-service"});
    server
        .mock("GET", "/health")
        .with_status(200)
        .with_body(upstream_health.to_string())
        .create_async()
        .await;

    let app = gateway(&server.url(), 30);
    let (status, body) = send(&app, Method::GET, "/api/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("healthy"));
    assert_eq!(body["service"], json!("pixelgate-gateway"));
    assert_eq!(body["pythonService"], upstream_health);
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_health_unhealthy_when_upstream_down() {
    let app = gateway(&closed_upstream(), 30);
    let (status, body) = send(&app, Method::GET, "/api/health", None).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], json!("unhealthy"));
    assert!(body.get("pythonService").is_none());
}

#[tokio::test]
async fn test_models_and_connection_test_forwarded() {
    let mut server = Server::new_async().await;
    let models = json!({"success": true, "models": [{"id": "runware:101@1", "name": "FLUX.1 Dev"}]});
    server
        .mock("GET", "/models")
        .with_status(200)
        .with_body(models.to_string())
        .create_async()
        .await;
    server
        .mock("GET", "/test-connection")
        .with_status(200)
        .with_body(r#"{"success":false,"error":"Invalid API key"}"#)
        .create_async()
        .await;

    let app = gateway(&server.url(), 30);

    let (status, body) = send(&app, Method::GET, "/api/models", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, models);

    let (status, body) = send(&app, Method::GET, "/api/test-connection", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["error"], json!("Invalid API key"));
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = gateway(&closed_upstream(), 30);
    let (status, body) = send(&app, Method::GET, "/api/does-not-exist", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"success": false, "error": "Endpoint not found"}));
}

#[tokio::test]
async fn test_large_image_payload_accepted() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/caption-image")
        .with_status(200)
        .with_body(r#"{"success":true,"caption":"a fox"}"#)
        .create_async()
        .await;

    let app = gateway(&server.url(), 30);
    let image = "A".repeat(5 * 1024 * 1024);
    let payload = json!({ "image": image }).to_string();
    let (status, body) = send(&app, Method::POST, "/api/caption-image", Some(&payload)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["caption"], json!("a fox"));
}

#[tokio::test]
async fn test_metrics_exposed() {
    let app = gateway(&closed_upstream(), 30);
    send(&app, Method::GET, "/api/health", None).await;

    let request = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("upstream_calls_total"));
}

#[tokio::test]
async fn test_oversized_body_gets_error_envelope() {
    let mut server = Server::new_async().await;
    let spy = server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let mut config = AppConfig::default();
    config.upstream.base_url = server.url();
    config.server.body_limit_bytes = 1024;
    let upstream = UpstreamClient::new(&config.upstream).unwrap();
    let app = create_router(config, upstream).unwrap();

    let payload = json!({ "image": "A".repeat(4096) }).to_string();
    let (status, body) = send(&app, Method::POST, "/api/caption-image", Some(&payload)).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body, json!({"success": false, "error": "Request body too large"}));
    spy.assert_async().await;
}

#[tokio::test]
async fn test_non_utf8_body_gets_error_envelope() {
    let app = gateway(&closed_upstream(), 30);
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/remove-background")
        .header("content-type", "application/json")
        .body(Body::from(vec![0xff_u8, 0xfe, 0x7b]))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, json!({"success": false, "error": "Invalid JSON body"}));
}

#[tokio::test]
async fn test_wrong_method_gets_error_envelope() {
    let app = gateway(&closed_upstream(), 30);
    let (status, body) = send(&app, Method::GET, "/api/generate/image", None).await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body, json!({"success": false, "error": "Method not allowed"}));
}
