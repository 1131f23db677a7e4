//! Observability metrics for the assignment policy service.
//!
//! Collects authorization decision outcomes, audience narrowing results,
//! assignment operations, audit-sink health and HTTP request metrics.

use std::time::{Duration, Instant};

use axum::{
    extract::{MatchedPath, Request},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use once_cell::sync::Lazy;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use tracing::{debug, error};

/// Core metrics registry for the policy service
pub struct PolicyMetricsRegistry {
    /// Prometheus registry for all metrics
    pub registry: Registry,

    // === Authorization Metrics ===
    /// Authorization decisions by outcome, role and classification
    pub authorization_decisions_total: IntCounterVec,
    /// Authorization decision latency
    pub authorization_duration: HistogramVec,
    /// Audience narrowing outcomes for manager-scoped checks
    pub audience_narrowing_total: IntCounterVec,

    // === Assignment Metrics ===
    /// Assignment operations by operation and outcome
    pub assignment_operations_total: IntCounterVec,

    // === Audit Metrics ===
    /// Audit writes that failed and were swallowed
    pub audit_write_failures_total: IntCounter,

    // === HTTP Request Metrics ===
    /// HTTP requests by method, endpoint and status
    pub http_requests_total: IntCounterVec,
    /// HTTP request duration by endpoint
    pub http_request_duration: HistogramVec,
    /// Concurrent HTTP requests
    pub http_requests_in_flight: IntGauge,
}

impl PolicyMetricsRegistry {
    /// Create a new metrics registry with all collectors initialized
    pub fn new() -> Self {
        let registry = Registry::new();

        let authorization_decisions_total = IntCounterVec::new(
            Opts::new(
                "policy_authorization_decisions_total",
                "Total assignment authorization decisions",
            ),
            &["decision", "role", "classification"],
        )
        .expect("Failed to create authorization_decisions_total metric");

        let authorization_duration = HistogramVec::new(
            HistogramOpts::new(
                "policy_authorization_duration_seconds",
                "Duration of authorization decisions in seconds",
            )
            .buckets(vec![
                0.0001, 0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5,
            ]),
            &["decision"],
        )
        .expect("Failed to create authorization_duration metric");

        let audience_narrowing_total = IntCounterVec::new(
            Opts::new(
                "policy_audience_narrowing_total",
                "Audience narrowing outcomes for manager checks",
            ),
            &["outcome"],
        )
        .expect("Failed to create audience_narrowing_total metric");

        let assignment_operations_total = IntCounterVec::new(
            Opts::new(
                "policy_assignment_operations_total",
                "Assignment operations by operation and outcome",
            ),
            &["operation", "outcome"],
        )
        .expect("Failed to create assignment_operations_total metric");

        let audit_write_failures_total = IntCounter::new(
            "policy_audit_write_failures_total",
            "Audit writes that failed and were swallowed",
        )
        .expect("Failed to create audit_write_failures_total metric");

        let http_requests_total = IntCounterVec::new(
            Opts::new("policy_http_requests_total", "Total HTTP requests"),
            &["method", "endpoint", "status_code"],
        )
        .expect("Failed to create http_requests_total metric");

        let http_request_duration = HistogramVec::new(
            HistogramOpts::new(
                "policy_http_request_duration_seconds",
                "HTTP request duration in seconds",
            )
            .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]),
            &["method", "endpoint"],
        )
        .expect("Failed to create http_request_duration metric");

        let http_requests_in_flight = IntGauge::new(
            "policy_http_requests_in_flight",
            "Concurrent HTTP requests",
        )
        .expect("Failed to create http_requests_in_flight metric");

        let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
            Box::new(authorization_decisions_total.clone()),
            Box::new(authorization_duration.clone()),
            Box::new(audience_narrowing_total.clone()),
            Box::new(assignment_operations_total.clone()),
            Box::new(audit_write_failures_total.clone()),
            Box::new(http_requests_total.clone()),
            Box::new(http_request_duration.clone()),
            Box::new(http_requests_in_flight.clone()),
        ];
        for collector in collectors {
            registry
                .register(collector)
                .expect("Failed to register metric collector");
        }

        Self {
            registry,
            authorization_decisions_total,
            authorization_duration,
            audience_narrowing_total,
            assignment_operations_total,
            audit_write_failures_total,
            http_requests_total,
            http_request_duration,
            http_requests_in_flight,
        }
    }

    /// Gather all metrics in Prometheus text format
    pub fn gather_metrics(&self) -> Result<String, Box<dyn std::error::Error>> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

impl Default for PolicyMetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Global policy metrics registry instance
pub static POLICY_METRICS: Lazy<PolicyMetricsRegistry> = Lazy::new(PolicyMetricsRegistry::new);

/// Helper functions for policy-specific metrics
pub struct PolicyMetricsHelper;

impl PolicyMetricsHelper {
    /// Record an authorization decision with its latency
    pub fn record_authorization_decision(
        decision: &str,
        role: &str,
        classification: &str,
        duration: Duration,
    ) {
        POLICY_METRICS
            .authorization_decisions_total
            .with_label_values(&[decision, role, classification])
            .inc();

        POLICY_METRICS
            .authorization_duration
            .with_label_values(&[decision])
            .observe(duration.as_secs_f64());
    }

    /// Record the narrowing outcome of a manager-scoped check
    pub fn record_audience_narrowing(outcome: &str) {
        POLICY_METRICS
            .audience_narrowing_total
            .with_label_values(&[outcome])
            .inc();
    }

    /// Record an assignment operation
    pub fn record_assignment_operation(operation: &str, outcome: &str) {
        POLICY_METRICS
            .assignment_operations_total
            .with_label_values(&[operation, outcome])
            .inc();
    }

    /// Record a swallowed audit write failure
    pub fn record_audit_write_failure() {
        POLICY_METRICS.audit_write_failures_total.inc();
    }
}

/// Metrics middleware for the policy service
pub async fn policy_metrics_middleware(req: Request, next: Next) -> Response {
    let start_time = Instant::now();
    let method = req.method().clone();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map_or("unknown".to_string(), |p| {
            normalize_path_for_cardinality(p.as_str())
        });

    POLICY_METRICS.http_requests_in_flight.inc();
    let response = next.run(req).await;
    POLICY_METRICS.http_requests_in_flight.dec();

    let duration = start_time.elapsed();
    let status_code = response.status();

    POLICY_METRICS
        .http_requests_total
        .with_label_values(&[method.as_str(), &path, &status_code.as_u16().to_string()])
        .inc();

    POLICY_METRICS
        .http_request_duration
        .with_label_values(&[method.as_str(), &path])
        .observe(duration.as_secs_f64());

    debug!(
        method = %method,
        path = %path,
        status = %status_code,
        duration_ms = %duration.as_millis(),
        "policy service HTTP request processed"
    );

    response
}

/// Normalize path for metrics to prevent cardinality explosion
fn normalize_path_for_cardinality(path: &str) -> String {
    match path {
        p if p.starts_with("/v1/assignments/authorize") => "/v1/assignments/authorize".to_string(),
        p if p.starts_with("/v1/assignments/assignable-users") => {
            "/v1/assignments/assignable-users".to_string()
        }
        p if p.starts_with("/v1/assignments") => "/v1/assignments".to_string(),
        p if p.starts_with("/v1/reports/validate-separation") => {
            "/v1/reports/validate-separation".to_string()
        }
        p if p.starts_with("/health") => "/health".to_string(),
        p if p.starts_with("/metrics") => "/metrics".to_string(),
        p => p.to_string(),
    }
}

/// Prometheus metrics endpoint handler for the policy service
pub async fn policy_metrics_handler() -> impl IntoResponse {
    match POLICY_METRICS.gather_metrics() {
        Ok(metrics) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            metrics,
        ),
        Err(e) => {
            error!("Failed to gather policy metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [("content-type", "text/plain")],
                format!("Error gathering metrics: {e}"),
            )
        }
    }
}
