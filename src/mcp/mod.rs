//! Development-only MCP stub servers.
//!
//! The stubs answer only when `mcp_stub_mode` is on and the environment is
//! not production. Configuration loading already rejects the flag in
//! production; the gate is checked again on every request.

pub mod catalog;

use crate::{config::AppConfig, errors::ServiceError, metrics};
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, warn};

use self::catalog::{StubServer, StubTool};

#[derive(Clone)]
struct McpState {
    config: Arc<AppConfig>,
}

#[derive(Debug, Serialize)]
pub struct ServerSummary {
    pub name: &'static str,
    pub description: &'static str,
    pub tool_count: usize,
}

#[derive(Debug, Serialize)]
pub struct ServerList {
    pub stub_mode: bool,
    pub servers: Vec<ServerSummary>,
}

#[derive(Debug, Serialize)]
pub struct Capabilities {
    pub server: &'static str,
    pub description: &'static str,
    pub stub: bool,
    pub tools: &'static [StubTool],
}

#[derive(Debug, Serialize)]
pub struct ToolCallResult {
    pub stub: bool,
    pub server: &'static str,
    pub tool: &'static str,
    pub arguments: Value,
    pub result: Value,
}

pub fn stubs_enabled(config: &AppConfig) -> bool {
    config.mcp_stub_mode && !config.is_production()
}

fn ensure_enabled(config: &AppConfig) -> Result<(), ServiceError> {
    if stubs_enabled(config) {
        return Ok(());
    }
    if config.mcp_stub_mode {
        warn!("mcp stub request refused in production");
    }
    Err(ServiceError::ServiceUnavailable(
        "MCP stub servers are disabled; set APP__MCP_STUB_MODE=true outside production".into(),
    ))
}

fn find_server(name: &str) -> Result<&'static StubServer, ServiceError> {
    catalog::server(name)
        .ok_or_else(|| ServiceError::NotFound(format!("MCP server '{}' not found", name)))
}

async fn list_servers(State(state): State<McpState>) -> Json<ServerList> {
    Json(ServerList {
        stub_mode: stubs_enabled(&state.config),
        servers: catalog::servers()
            .iter()
            .map(|server| ServerSummary {
                name: server.name,
                description: server.description,
                tool_count: server.tools.len(),
            })
            .collect(),
    })
}

async fn capabilities(
    State(state): State<McpState>,
    Path(server): Path<String>,
) -> Result<Json<Capabilities>, ServiceError> {
    ensure_enabled(&state.config)?;
    let server = find_server(&server)?;
    Ok(Json(Capabilities {
        server: server.name,
        description: server.description,
        stub: true,
        tools: &server.tools,
    }))
}

async fn call_tool(
    State(state): State<McpState>,
    Path((server, tool)): Path<(String, String)>,
    body: Option<Json<Value>>,
) -> Result<Json<ToolCallResult>, ServiceError> {
    ensure_enabled(&state.config)?;
    let server = find_server(&server)?;
    let tool = server.tool(&tool).ok_or_else(|| {
        ServiceError::NotFound(format!(
            "tool '{}' not found on MCP server '{}'",
            tool, server.name
        ))
    })?;

    metrics::increment_counter(metrics::MCP_STUB_CALLS_TOTAL);
    debug!(server = server.name, tool = tool.name, "mcp stub call");

    Ok(Json(ToolCallResult {
        stub: true,
        server: server.name,
        tool: tool.name,
        arguments: body.map(|Json(v)| v).unwrap_or_else(|| json!({})),
        result: tool.result.clone(),
    }))
}

/// Stub routes with their own state, ready for `nest_service`
pub fn mcp_router(config: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/servers", get(list_servers))
        .route("/:server/capabilities", get(capabilities))
        .route("/:server/tools/:tool", post(call_tool))
        .with_state(McpState { config })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    fn config(env: &str, stub_mode: bool) -> Arc<AppConfig> {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".into(),
            "127.0.0.1".into(),
            8080,
            env.into(),
        );
        cfg.mcp_stub_mode = stub_mode;
        Arc::new(cfg)
    }

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[test]
    fn production_never_enables_stubs() {
        assert!(!stubs_enabled(&config("production", true)));
        assert!(!stubs_enabled(&config("development", false)));
        assert!(stubs_enabled(&config("development", true)));
    }

    #[tokio::test]
    async fn server_list_is_always_available() {
        let (status, body) = send(mcp_router(config("development", false)), get_req("/servers")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["stub_mode"], false);
        assert_eq!(body["servers"].as_array().map(Vec::len), Some(3));
    }

    #[tokio::test]
    async fn capabilities_are_gated() {
        let (status, body) = send(
            mcp_router(config("development", false)),
            get_req("/crm/capabilities"),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body.to_string().contains("APP__MCP_STUB_MODE"));

        let (status, body) = send(
            mcp_router(config("development", true)),
            get_req("/crm/capabilities"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["stub"], true);
        assert_eq!(body["tools"][0]["name"], "lookup_customer");
        assert!(body["tools"][0].get("result").is_none());
    }

    #[tokio::test]
    async fn unknown_server_and_tool_are_not_found() {
        let router = mcp_router(config("development", true));
        let (status, _) = send(router.clone(), get_req("/billing/capabilities")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let request = Request::post("/weather/tools/nowcast")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(router, request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn tool_call_echoes_arguments() {
        let before = metrics::METRICS.counter_value(metrics::MCP_STUB_CALLS_TOTAL);
        let request = Request::post("/weather/tools/forecast")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"zip":"80202"}"#))
            .unwrap();
        let (status, body) = send(mcp_router(config("development", true)), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["stub"], true);
        assert_eq!(body["server"], "weather");
        assert_eq!(body["arguments"]["zip"], "80202");
        assert_eq!(body["result"]["days"].as_array().map(Vec::len), Some(3));
        assert!(metrics::METRICS.counter_value(metrics::MCP_STUB_CALLS_TOTAL) > before);
    }

    #[tokio::test]
    async fn tool_call_refused_in_production() {
        let request = Request::post("/crm/tools/lookup_customer")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(mcp_router(config("production", true)), request).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
