use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use mcp_config_manager::config::AppConfig;
use mcp_config_manager::middleware::csrf::{CSRF_EXPECTED_VALUE, CSRF_HEADER};
use mcp_config_manager::presets::PresetCatalog;
use mcp_config_manager::routes;
use mcp_config_manager::state::AppState;
use mcp_config_manager::store::ConfigStore;

struct TestApp {
    app: Router,
    state: AppState,
    _dir: TempDir,
}

fn setup_test_app() -> TestApp {
    let dir = TempDir::new().unwrap();
    let store = ConfigStore::new(dir.path().join("Claude").join("claude_desktop_config.json"));
    let state = AppState::with_parts(AppConfig::default(), store, PresetCatalog::bundled().unwrap());
    let app = routes::with_middleware(routes::api_router(state.clone()), state.config.clone());
    TestApp { app, state, _dir: dir }
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header(CSRF_HEADER, CSRF_EXPECTED_VALUE)
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap_or(Value::Null) };
    (status, value)
}

#[tokio::test]
async fn test_get_config_when_file_missing() {
    let t = setup_test_app();
    let (status, body) = send(&t.app, get("/api/config")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "mcpServers": {} }));
}

#[tokio::test]
async fn test_save_then_load_returns_same_data() {
    let t = setup_test_app();
    let cfg = json!({
        "mcpServers": {
            "filesystem": {
                "command": "npx",
                "args": ["-y", "@modelcontextprotocol/server-filesystem", "/home/me/docs"]
            },
            "github": {
                "command": "npx",
                "args": ["-y", "@modelcontextprotocol/server-github"],
                "env": { "GITHUB_PERSONAL_ACCESS_TOKEN": "ghp_x" },
                "disabled": true
            }
        }
    });

    let (status, saved) = send(&t.app, post_json("/api/config", &cfg)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(saved["success"], true);
    assert!(saved["backup_path"].is_null());

    let (status, loaded) = send(&t.app, get("/api/config")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(loaded, cfg);

    let snap = t.state.metrics.get_snapshot();
    assert_eq!(snap.configs_saved, 1);
    assert_eq!(snap.backups_created, 0);
}

#[tokio::test]
async fn test_invalid_config_rejected_and_file_unchanged() {
    let t = setup_test_app();
    let valid = json!({ "mcpServers": { "memory": { "command": "npx" } } });
    send(&t.app, post_json("/api/config", &valid)).await;
    let before = std::fs::read(t.state.store.path()).unwrap();

    let invalid = json!({ "mcpServers": { "memory": { "command": 42, "args": "x" } } });
    let (status, body) = send(&t.app, post_json("/api/config", &invalid)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_FAILED");
    let errors = body["error"]["details"]["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0]["path"], "mcpServers.memory.command");

    assert_eq!(std::fs::read(t.state.store.path()).unwrap(), before);
    assert_eq!(t.state.metrics.get_snapshot().validation_failures, 1);
}

#[tokio::test]
async fn test_backup_created_on_overwrite() {
    let t = setup_test_app();
    send(&t.app, post_json("/api/config", &json!({ "mcpServers": { "a": { "command": "one" } } }))).await;
    let before = std::fs::read(t.state.store.path()).unwrap();

    let (status, saved) =
        send(&t.app, post_json("/api/config", &json!({ "mcpServers": { "a": { "command": "two" } } }))).await;
    assert_eq!(status, StatusCode::OK);
    let backup = saved["backup_path"].as_str().unwrap();
    assert_eq!(std::fs::read(backup).unwrap(), before);

    let (_, backups) = send(&t.app, get("/api/config/backups")).await;
    assert_eq!(backups["items"].as_array().unwrap().len(), 1);
    assert_eq!(t.state.metrics.get_snapshot().backups_created, 1);
}

#[tokio::test]
async fn test_full_config_preserves_other_keys() {
    let t = setup_test_app();
    let path = t.state.store.path().to_path_buf();
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, r#"{"globalShortcut":"Alt+Space","mcpServers":{}}"#).unwrap();

    send(&t.app, post_json("/api/config", &json!({ "mcpServers": { "time": { "command": "uvx" } } }))).await;

    let (status, full) = send(&t.app, get("/api/config/full")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(full["globalShortcut"], "Alt+Space");
    assert_eq!(full["mcpServers"]["time"]["command"], "uvx");

    let (_, only_servers) = send(&t.app, get("/api/config")).await;
    assert!(only_servers.get("globalShortcut").is_none());
}

#[tokio::test]
async fn test_malformed_json_body() {
    let t = setup_test_app();
    let req = Request::builder()
        .method("POST")
        .uri("/api/config")
        .header("content-type", "application/json")
        .header(CSRF_HEADER, CSRF_EXPECTED_VALUE)
        .body(Body::from("{ nope"))
        .unwrap();
    let (status, body) = send(&t.app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
    assert!(!t.state.store.exists());
}

#[tokio::test]
async fn test_post_without_csrf_header_forbidden() {
    let t = setup_test_app();
    let req = Request::builder()
        .method("POST")
        .uri("/api/config")
        .header("content-type", "application/json")
        .body(Body::from(json!({ "mcpServers": {} }).to_string()))
        .unwrap();
    let (status, body) = send(&t.app, req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "CSRF_TOKEN_MISSING");
    assert!(!t.state.store.exists());
}

#[tokio::test]
async fn test_validate_endpoint_never_writes() {
    let t = setup_test_app();
    let (status, body) =
        send(&t.app, post_json("/api/config/validate", &json!({ "mcpServers": { "x": {} } }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], false);
    assert_eq!(body["errors"][0]["path"], "mcpServers.x.command");

    let (_, ok) = send(&t.app, post_json("/api/config/validate", &json!({ "mcpServers": {} }))).await;
    assert_eq!(ok["valid"], true);
    assert!(!t.state.store.exists());
}

#[tokio::test]
async fn test_corrupt_file_reports_parse_error() {
    let t = setup_test_app();
    let path = t.state.store.path().to_path_buf();
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "not json at all").unwrap();

    let (status, body) = send(&t.app, get("/api/config")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], "CONFIG_PARSE_ERROR");

    let (status, info) = send(&t.app, get("/api/config/info")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(info["exists"], true);
    assert!(info["parse_error"].is_string());
}

fn write_config_file(t: &TestApp, bytes: &[u8]) {
    let path = t.state.store.path();
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, bytes).unwrap();
}

#[tokio::test]
async fn test_file_without_servers_key_opens_empty() {
    let t = setup_test_app();
    for content in ["{}", r#"{"globalShortcut":"Ctrl+Space"}"#] {
        write_config_file(&t, content.as_bytes());

        let (status, body) = send(&t.app, get("/api/config")).await;
        assert_eq!(status, StatusCode::OK, "content: {}", content);
        assert_eq!(body, json!({ "mcpServers": {} }));

        let (status, info) = send(&t.app, get("/api/config/info")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(info["exists"], true);
        assert_eq!(info["server_count"], 0);
        assert!(info.get("parse_error").is_none(), "content: {}", content);
    }

    // Saving adds the section and keeps the other key
    let (status, _) = send(&t.app, post_json("/api/config", &json!({ "mcpServers": { "time": { "command": "uvx" } } }))).await;
    assert_eq!(status, StatusCode::OK);
    let (_, full) = send(&t.app, get("/api/config/full")).await;
    assert_eq!(full["globalShortcut"], "Ctrl+Space");
    assert_eq!(full["mcpServers"]["time"]["command"], "uvx");
}

#[tokio::test]
async fn test_malformed_entry_on_disk_is_server_error() {
    let t = setup_test_app();
    write_config_file(&t, br#"{"mcpServers":{"broken":{"command":42}}}"#);

    let (status, body) = send(&t.app, get("/api/config")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], "CONFIG_PARSE_ERROR");
    assert!(body["error"]["details"]["reason"].as_str().unwrap().contains("mcpServers.broken.command"));

    let (_, info) = send(&t.app, get("/api/config/info")).await;
    assert!(info["parse_error"].is_string());
}

#[tokio::test]
async fn test_non_utf8_file_reports_parse_error_and_can_be_overwritten() {
    let t = setup_test_app();
    write_config_file(&t, b"\xff\xfe garbage");

    let (status, body) = send(&t.app, get("/api/config")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], "CONFIG_PARSE_ERROR");

    let (status, saved) = send(&t.app, post_json("/api/config", &json!({ "mcpServers": {} }))).await;
    assert_eq!(status, StatusCode::OK);
    let backup = saved["backup_path"].as_str().unwrap();
    assert_eq!(std::fs::read(backup).unwrap(), b"\xff\xfe garbage");

    let (status, body) = send(&t.app, get("/api/config")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "mcpServers": {} }));
}

#[tokio::test]
async fn test_config_path_and_info() {
    let t = setup_test_app();
    let (status, body) = send(&t.app, get("/api/config/path")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["path"].as_str().unwrap().ends_with("claude_desktop_config.json"));
    assert_eq!(body["exists"], false);
    assert!(!body["platform"].as_str().unwrap().is_empty());

    send(
        &t.app,
        post_json("/api/config", &json!({ "mcpServers": { "a": { "command": "x" }, "b": { "command": "y", "disabled": true } } })),
    )
    .await;

    let (_, info) = send(&t.app, get("/api/config/info")).await;
    assert_eq!(info["exists"], true);
    assert_eq!(info["server_count"], 2);
    assert_eq!(info["enabled_count"], 1);
    assert_eq!(info["disabled_count"], 1);
    assert_eq!(info["backup_count"], 0);
}

#[tokio::test]
async fn test_presets_endpoints() {
    let t = setup_test_app();

    let (status, all) = send(&t.app, get("/api/presets")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all["items"].as_array().unwrap().len(), t.state.presets.len());

    let (status, one) = send(&t.app, get("/api/presets/github")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(one["id"], "github");
    assert_eq!(one["config"]["command"], "npx");

    let (status, missing) = send(&t.app, get("/api/presets/nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(missing["error"]["code"], "NOT_FOUND");

    let (status, found) = send(&t.app, get("/api/presets/search/Database")).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = found["items"].as_array().unwrap().iter().map(|p| p["id"].as_str().unwrap()).collect();
    assert!(ids.contains(&"postgres"));
    assert!(ids.contains(&"sqlite"));

    let (_, web) = send(&t.app, get("/api/presets?category=Web")).await;
    assert!(web["items"].as_array().unwrap().iter().all(|p| p["category"] == "Web"));

    let (_, cats) = send(&t.app, get("/api/presets/categories")).await;
    assert!(cats["items"].as_array().unwrap().iter().any(|c| c == "Databases"));
}

#[tokio::test]
async fn test_security_headers_and_no_store() {
    let t = setup_test_app();
    let response = t.app.clone().oneshot(get("/api/config")).await.unwrap();
    let headers = response.headers();
    assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
    assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
    assert_eq!(headers.get("cache-control").unwrap(), "no-store");
    assert!(headers.contains_key("content-security-policy"));
}

#[tokio::test]
async fn test_oversized_body_rejected() {
    let t = setup_test_app();
    let limit = t.state.config.limits.max_body_bytes;
    let req = Request::builder()
        .method("POST")
        .uri("/api/config")
        .header("content-type", "application/json")
        .header("content-length", (limit + 1).to_string())
        .header(CSRF_HEADER, CSRF_EXPECTED_VALUE)
        .body(Body::from(vec![b' '; limit + 1]))
        .unwrap();
    let (status, _) = send(&t.app, req).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_health_and_version() {
    let t = setup_test_app();
    let response = t.app.clone().oneshot(get("/healthz")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"ok");

    let (status, version) = send(&t.app, get("/version")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(version["name"], "mcp-config-manager");

    let (_, metrics) = send(&t.app, get("/metrics")).await;
    assert_eq!(metrics["configs_saved"], 0);
}
