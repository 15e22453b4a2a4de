#![allow(dead_code)]

use std::{str::FromStr, sync::Arc};

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use brainops_api::{config::AppConfig, db, rag::create_provider, AppState};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

/// Full application router backed by a private in-memory SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub tenant: Uuid,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Builds the app after letting the caller tweak the configuration
    pub async fn with_config(customize: impl FnOnce(&mut AppConfig)) -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        // A single connection keeps every query on the same in-memory database
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;
        cfg.cors_allow_any_origin = true;
        cfg.rag.embedding_provider = "hash".to_string();
        cfg.rag.embedding_dims = 128;
        customize(&mut cfg);

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to open in-memory database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let embedder = create_provider(&cfg.rag).expect("embedding provider for tests");
        let state = AppState::new(Arc::new(pool), cfg, embedder);
        let router = brainops_api::build_router(state.clone()).expect("router builds");

        Self {
            router,
            state,
            tenant: Uuid::new_v4(),
        }
    }

    /// Sends a request with exactly the given headers and decodes the body.
    /// Non-JSON bodies come back as `Value::String`.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(serde_json::to_vec(&json).expect("serialize request body"))
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).expect("build request"))
            .await
            .expect("router error during test request");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read response body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, value)
    }

    /// Sends a request as this app's tenant
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        self.request_as(self.tenant, method, uri, body).await
    }

    pub async fn request_as(
        &self,
        tenant: Uuid,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let tenant = tenant.to_string();
        self.send(method, uri, body, &[("x-tenant-id", tenant.as_str())])
            .await
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn post_empty(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::POST, uri, None).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, None).await
    }

    /// Creates a customer and returns its id
    pub async fn create_customer(&self, name: &str) -> String {
        let (status, body) = self
            .post("/api/v1/customers", json!({ "name": name }))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        id_of(&body)
    }

    pub async fn create_job(&self, customer_id: &str, title: &str, estimated_revenue: &str) -> String {
        let (status, body) = self
            .post(
                "/api/v1/jobs",
                json!({
                    "customer_id": customer_id,
                    "title": title,
                    "estimated_revenue": estimated_revenue,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        id_of(&body)
    }

    pub async fn create_vendor(&self, name: &str) -> String {
        let (status, body) = self.post("/api/v1/vendors", json!({ "name": name })).await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        id_of(&body)
    }
}

/// `data.id` of an enveloped response
pub fn id_of(body: &Value) -> String {
    body["data"]["id"]
        .as_str()
        .unwrap_or_else(|| panic!("response has no data.id: {body}"))
        .to_string()
}

/// Decimals are serialized as strings; compare them numerically
pub fn dec(value: &Value) -> Decimal {
    match value {
        Value::String(s) => Decimal::from_str(s).unwrap_or_else(|_| panic!("not a decimal: {s}")),
        Value::Number(n) => Decimal::from_str(&n.to_string()).expect("numeric decimal"),
        other => panic!("not a decimal: {other}"),
    }
}

pub fn line(description: &str, quantity: &str, unit_price: &str) -> Value {
    json!({
        "description": description,
        "quantity": quantity,
        "unit_price": unit_price,
    })
}
