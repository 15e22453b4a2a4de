//! `/api/v1` route loader.
//!
//! Route modules live in a static registry. Each one is mounted under its
//! prefix unless its name appears in `disabled_route_modules`. `/status` and
//! `/health` are mounted unconditionally and bypass the API key.

use crate::{
    handlers,
    middleware_helpers::{api_key_middleware, ApiKeyState},
    ApiResponse, AppState,
};
use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};
use utoipa::ToSchema;

pub const SERVICE_NAME: &str = "brainops-api";

/// A named group of routes mounted under a common prefix
pub struct RouteModule {
    pub name: &'static str,
    pub prefix: &'static str,
    pub router: fn() -> Router<AppState>,
}

pub const ROUTE_MODULES: &[RouteModule] = &[
    RouteModule {
        name: "customers",
        prefix: "/customers",
        router: handlers::customers::routes,
    },
    RouteModule {
        name: "jobs",
        prefix: "/jobs",
        router: handlers::jobs::routes,
    },
    RouteModule {
        name: "estimates",
        prefix: "/estimates",
        router: handlers::estimates::routes,
    },
    RouteModule {
        name: "invoices",
        prefix: "/invoices",
        router: handlers::invoices::routes,
    },
    RouteModule {
        name: "inventory",
        prefix: "/inventory",
        router: handlers::inventory::routes,
    },
    RouteModule {
        name: "vendors",
        prefix: "/vendors",
        router: handlers::vendors::routes,
    },
    RouteModule {
        name: "purchase_orders",
        prefix: "/purchase-orders",
        router: handlers::purchase_orders::routes,
    },
    RouteModule {
        name: "revenue",
        prefix: "/revenue",
        router: handlers::revenue::routes,
    },
    RouteModule {
        name: "rag",
        prefix: "/rag",
        router: handlers::rag::routes,
    },
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct RouteManifestEntry {
    pub name: String,
    pub prefix: String,
    pub enabled: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    pub service: String,
    pub version: String,
    pub environment: String,
    pub timestamp: String,
}

pub fn route_manifest(disabled: &[String]) -> Vec<RouteManifestEntry> {
    ROUTE_MODULES
        .iter()
        .map(|module| RouteManifestEntry {
            name: module.name.to_string(),
            prefix: format!("/api/v1{}", module.prefix),
            enabled: !disabled.iter().any(|name| name == module.name),
        })
        .collect()
}

#[utoipa::path(
    get,
    path = "/api/v1/routes",
    tag = "system",
    responses((status = 200, description = "Registered route modules", body = ApiResponse<Vec<RouteManifestEntry>>))
)]
pub async fn routes_handler(State(state): State<AppState>) -> Json<ApiResponse<Vec<RouteManifestEntry>>> {
    Json(ApiResponse::success(route_manifest(
        &state.config.disabled_route_modules(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/status",
    tag = "system",
    responses((status = 200, description = "Service identity", body = StatusResponse))
)]
pub async fn status_handler(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        environment: state.config.environment.clone(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Builds the `/api/v1` router from the module registry
pub fn api_v1_routes(state: &AppState) -> Router<AppState> {
    let disabled = state.config.disabled_route_modules();
    for name in &disabled {
        if !ROUTE_MODULES.iter().any(|module| module.name == name) {
            warn!(module = %name, "unknown route module in disabled_route_modules");
        }
    }

    let mut protected = Router::new().route("/routes", get(routes_handler));
    for module in ROUTE_MODULES {
        if disabled.iter().any(|name| name == module.name) {
            info!(module = module.name, "route module disabled");
            continue;
        }
        protected = protected.nest(module.prefix, (module.router)());
        info!(module = module.name, prefix = module.prefix, "loaded route module");
    }

    if let Some(key) = state
        .config
        .api_key
        .as_deref()
        .map(str::trim)
        .filter(|key| !key.is_empty())
    {
        protected = protected.layer(axum::middleware::from_fn_with_state(
            ApiKeyState::new(key),
            api_key_middleware,
        ));
    }

    Router::new()
        .route("/status", get(status_handler))
        .route("/health", get(crate::health::health_check))
        .merge(protected)
}
