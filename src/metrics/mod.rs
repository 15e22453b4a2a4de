/*!
 * # Metrics Module
 *
 * In-process metrics for the BrainOps API.
 *
 * - HTTP request counts, latency and error counts (recorded by [`track_http_metrics`])
 * - Business counters (invoices, payments, RAG chunks, MCP stub calls)
 *
 * Metrics are exposed in Prometheus text format at `/metrics` and as JSON
 * at `/metrics/json`.
 */

use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use dashmap::DashMap;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";
pub const HTTP_REQUEST_DURATION_SECONDS: &str = "http_request_duration_seconds";
pub const HTTP_ERRORS_TOTAL: &str = "http_errors_total";
pub const INVOICES_CREATED_TOTAL: &str = "invoices_created_total";
pub const PAYMENTS_RECORDED_TOTAL: &str = "payments_recorded_total";
pub const RAG_CHUNKS_INGESTED_TOTAL: &str = "rag_chunks_ingested_total";
pub const MCP_STUB_CALLS_TOTAL: &str = "mcp_stub_calls_total";

#[derive(Debug, Clone, Default)]
pub struct Counter {
    value: Arc<AtomicU64>,
}

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_by(&self, value: u64) {
        self.value.fetch_add(value, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

/// Gauge holding an `f64` as its bit pattern
#[derive(Debug, Clone, Default)]
pub struct Gauge {
    bits: Arc<AtomicU64>,
}

impl Gauge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, value: f64) {
        self.bits.store(value.to_bits(), Ordering::Relaxed);
    }

    pub fn get(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Relaxed))
    }
}

#[derive(Debug, Clone, Default)]
pub struct Histogram {
    sum_bits: Arc<AtomicU64>,
    count: Arc<AtomicU64>,
}

impl Histogram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&self, value: f64) {
        let _ = self
            .sum_bits
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |bits| {
                Some((f64::from_bits(bits) + value).to_bits())
            });
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn get_sum(&self) -> f64 {
        f64::from_bits(self.sum_bits.load(Ordering::Relaxed))
    }
}

#[derive(Debug, Default)]
pub struct MetricsRegistry {
    counters: DashMap<String, Counter>,
    gauges: DashMap<String, Gauge>,
    histograms: DashMap<String, Histogram>,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_create_counter(&self, name: &str) -> Counter {
        self.counters
            .entry(name.to_string())
            .or_insert_with(Counter::new)
            .clone()
    }

    pub fn get_or_create_gauge(&self, name: &str) -> Gauge {
        self.gauges
            .entry(name.to_string())
            .or_insert_with(Gauge::new)
            .clone()
    }

    pub fn get_or_create_histogram(&self, name: &str) -> Histogram {
        self.histograms
            .entry(name.to_string())
            .or_insert_with(Histogram::new)
            .clone()
    }

    pub fn counter_value(&self, name: &str) -> u64 {
        self.counters.get(name).map(|c| c.get()).unwrap_or(0)
    }

    /// Prometheus text exposition, sorted by metric name
    pub fn export_metrics(&self) -> String {
        let mut output = String::new();

        let counters: BTreeMap<String, u64> = self
            .counters
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().get()))
            .collect();
        for (name, value) in counters {
            output.push_str(&format!("# TYPE {} counter\n{} {}\n", name, name, value));
        }

        let gauges: BTreeMap<String, f64> = self
            .gauges
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().get()))
            .collect();
        for (name, value) in gauges {
            output.push_str(&format!("# TYPE {} gauge\n{} {}\n", name, name, value));
        }

        let histograms: BTreeMap<String, (u64, f64)> = self
            .histograms
            .iter()
            .map(|entry| {
                (
                    entry.key().clone(),
                    (entry.value().get_count(), entry.value().get_sum()),
                )
            })
            .collect();
        for (name, (count, sum)) in histograms {
            output.push_str(&format!("# TYPE {} histogram\n", name));
            output.push_str(&format!("{}_count {}\n", name, count));
            output.push_str(&format!("{}_sum {}\n", name, sum));
        }

        output
    }

    pub fn export_metrics_json(&self) -> serde_json::Value {
        let mut counters = serde_json::Map::new();
        for entry in self.counters.iter() {
            counters.insert(entry.key().clone(), json!(entry.value().get()));
        }

        let mut gauges = serde_json::Map::new();
        for entry in self.gauges.iter() {
            gauges.insert(entry.key().clone(), json!(entry.value().get()));
        }

        let mut histograms = serde_json::Map::new();
        for entry in self.histograms.iter() {
            histograms.insert(
                entry.key().clone(),
                json!({
                    "count": entry.value().get_count(),
                    "sum": entry.value().get_sum(),
                }),
            );
        }

        json!({
            "counters": counters,
            "gauges": gauges,
            "histograms": histograms,
        })
    }
}

// Global metrics registry
lazy_static::lazy_static! {
    pub static ref METRICS: MetricsRegistry = MetricsRegistry::new();
}

pub fn increment_counter(name: &str) {
    METRICS.get_or_create_counter(name).inc();
}

pub fn increment_counter_by(name: &str, value: u64) {
    METRICS.get_or_create_counter(name).inc_by(value);
}

pub fn set_gauge(name: &str, value: f64) {
    METRICS.get_or_create_gauge(name).set(value);
}

pub fn observe_histogram(name: &str, value: f64) {
    METRICS.get_or_create_histogram(name).observe(value);
}

/// Records request count, latency and 4xx/5xx responses
pub async fn track_http_metrics(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let response = next.run(request).await;

    increment_counter(HTTP_REQUESTS_TOTAL);
    observe_histogram(HTTP_REQUEST_DURATION_SECONDS, start.elapsed().as_secs_f64());
    if response.status().is_client_error() || response.status().is_server_error() {
        increment_counter(HTTP_ERRORS_TOTAL);
    }

    response
}

pub async fn metrics_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        METRICS.export_metrics(),
    )
}

pub async fn metrics_json_handler() -> Json<serde_json::Value> {
    Json(METRICS.export_metrics_json())
}

pub fn metrics_routes<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/metrics/json", get(metrics_json_handler))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let registry = MetricsRegistry::new();
        registry.get_or_create_counter("jobs_total").inc();
        registry.get_or_create_counter("jobs_total").inc_by(4);
        assert_eq!(registry.counter_value("jobs_total"), 5);
        assert_eq!(registry.counter_value("missing"), 0);
    }

    #[test]
    fn gauge_keeps_fractional_values() {
        let gauge = Gauge::new();
        gauge.set(0.25);
        assert_eq!(gauge.get(), 0.25);
    }

    #[test]
    fn histogram_sums_fractional_observations() {
        let histogram = Histogram::new();
        histogram.observe(0.5);
        histogram.observe(0.25);
        assert_eq!(histogram.get_count(), 2);
        assert!((histogram.get_sum() - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn prometheus_export_lists_every_kind() {
        let registry = MetricsRegistry::new();
        registry.get_or_create_counter("a_total").inc();
        registry.get_or_create_gauge("b_ratio").set(1.5);
        registry.get_or_create_histogram("c_seconds").observe(2.0);

        let text = registry.export_metrics();
        assert!(text.contains("# TYPE a_total counter\na_total 1\n"));
        assert!(text.contains("b_ratio 1.5"));
        assert!(text.contains("c_seconds_count 1"));
        assert!(text.contains("c_seconds_sum 2"));

        let json = registry.export_metrics_json();
        assert_eq!(json["counters"]["a_total"], 1);
        assert_eq!(json["histograms"]["c_seconds"]["count"], 1);
    }
}
