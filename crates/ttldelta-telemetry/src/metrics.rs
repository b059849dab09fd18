//! Prometheus-backed metrics registry and snapshot helpers.
//!
//! # Design
//! - Encapsulates collector registration to keep the public API small.
//! - Exposes the counters and gauges the HTTP surface and task lifecycle report into.

use std::sync::Arc;

use prometheus::{Encoder, IntCounterVec, IntGauge, Opts, Registry, TextEncoder, core::Collector};
use serde::Serialize;

use crate::error::{Result, TelemetryError};

/// Prometheus-backed metrics registry shared across services.
#[derive(Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

struct MetricsInner {
    registry: Registry,
    http_requests_total: IntCounterVec,
    events_emitted_total: IntCounterVec,
    fsops_steps_total: IntCounterVec,
    tasks_total: IntCounterVec,
    tasks_in_flight: IntGauge,
}

/// Snapshot of selected gauges and counters for health reporting.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Tasks currently being processed by this instance.
    pub tasks_in_flight: i64,
    /// Tasks that finished in the successful state.
    pub tasks_successful: u64,
    /// Tasks that finished in the failed state.
    pub tasks_failed: u64,
    /// Tasks skipped because another worker owned them.
    pub tasks_skipped: u64,
}

fn counter_vec(name: &'static str, help: &str, labels: &[&str]) -> Result<IntCounterVec> {
    IntCounterVec::new(Opts::new(name, help), labels)
        .map_err(|source| TelemetryError::MetricsCollector { name, source })
}

fn register<C>(registry: &Registry, name: &'static str, collector: &C) -> Result<()>
where
    C: Collector + Clone + 'static,
{
    registry
        .register(Box::new(collector.clone()))
        .map_err(|source| TelemetryError::MetricsRegister { name, source })
}

impl Metrics {
    /// Construct a new metrics registry with the standard collectors registered.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the Prometheus collectors cannot be
    /// built or registered.
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let http_requests_total = counter_vec(
            "http_requests_total",
            "Total HTTP requests received per endpoint",
            &["endpoint", "code"],
        )?;
        let events_emitted_total = counter_vec(
            "events_emitted_total",
            "Lifecycle events emitted by type",
            &["type"],
        )?;
        let fsops_steps_total = counter_vec(
            "fsops_steps_total",
            "File conversion steps executed by status",
            &["step", "status"],
        )?;
        let tasks_total = counter_vec(
            "tasks_total",
            "Conversion tasks finished by resolution",
            &["status"],
        )?;
        let tasks_in_flight = IntGauge::with_opts(Opts::new(
            "tasks_in_flight",
            "Conversion tasks currently being processed",
        ))
        .map_err(|source| TelemetryError::MetricsCollector {
            name: "tasks_in_flight",
            source,
        })?;

        register(&registry, "http_requests_total", &http_requests_total)?;
        register(&registry, "events_emitted_total", &events_emitted_total)?;
        register(&registry, "fsops_steps_total", &fsops_steps_total)?;
        register(&registry, "tasks_total", &tasks_total)?;
        register(&registry, "tasks_in_flight", &tasks_in_flight)?;

        Ok(Self {
            inner: Arc::new(MetricsInner {
                registry,
                http_requests_total,
                events_emitted_total,
                fsops_steps_total,
                tasks_total,
                tasks_in_flight,
            }),
        })
    }

    /// Increment the HTTP request counter for `endpoint` and the response status code.
    pub fn inc_http_request(&self, endpoint: &str, status: u16) {
        self.inner
            .http_requests_total
            .with_label_values(&[endpoint, &status.to_string()])
            .inc();
    }

    /// Increment the emitted event counter for the specific event type.
    pub fn inc_event(&self, event_type: &str) {
        self.inner
            .events_emitted_total
            .with_label_values(&[event_type])
            .inc();
    }

    /// Increment the file conversion step counter.
    pub fn inc_fsops_step(&self, step: &str, status: &str) {
        self.inner
            .fsops_steps_total
            .with_label_values(&[step, status])
            .inc();
    }

    /// Count a finished task under its final resolution (`successful`, `failed`, `skipped`).
    pub fn inc_task(&self, resolution: &str) {
        self.inner
            .tasks_total
            .with_label_values(&[resolution])
            .inc();
    }

    /// Record that a task started processing.
    pub fn task_started(&self) {
        self.inner.tasks_in_flight.inc();
    }

    /// Record that a task stopped processing.
    pub fn task_finished(&self) {
        self.inner.tasks_in_flight.dec();
    }

    /// Render the metrics registry using the Prometheus text exposition format.
    ///
    /// # Errors
    ///
    /// Returns an error if the metrics cannot be encoded or if the encoded
    /// buffer is not valid UTF-8.
    pub fn render(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.inner.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|source| TelemetryError::MetricsEncode { source })?;
        String::from_utf8(buffer).map_err(|source| TelemetryError::MetricsUtf8 { source })
    }

    /// Take a point-in-time snapshot of the task gauges and counters.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        let tasks = |resolution: &str| {
            self.inner
                .tasks_total
                .with_label_values(&[resolution])
                .get()
        };
        MetricsSnapshot {
            tasks_in_flight: self.inner.tasks_in_flight.get(),
            tasks_successful: tasks("successful"),
            tasks_failed: tasks("failed"),
            tasks_skipped: tasks("skipped"),
        }
    }
}
