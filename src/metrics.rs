use anyhow::{Context, Result};
use axum::{routing::get, Router};
use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

pub const FEEDBACK_INGESTED: &str = "tabletalk_feedback_ingested_total";
pub const FEEDBACK_REJECTED: &str = "tabletalk_feedback_rejected_total";
pub const SUMMARIES: &str = "tabletalk_summaries_total";
pub const SUMMARY_RECORDS: &str = "tabletalk_summary_records";

pub struct Metrics {
    pub handle: PrometheusHandle,
}

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(FEEDBACK_INGESTED, "Feedback records accepted and stored.");
        describe_counter!(FEEDBACK_REJECTED, "Feedback submissions rejected by validation.");
        describe_counter!(SUMMARIES, "Analytics summaries computed, by scope.");
        describe_histogram!(SUMMARY_RECORDS, "Records scanned per analytics request.");
    });
}

impl Metrics {
    /// Install the global Prometheus recorder. Fails if one is already installed.
    pub fn init() -> Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;
        ensure_metrics_described();
        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}

pub fn record_ingested() {
    counter!(FEEDBACK_INGESTED).increment(1);
}

pub fn record_rejected(reason: &'static str) {
    counter!(FEEDBACK_REJECTED, "reason" => reason).increment(1);
}

pub fn record_summary(scope: &'static str, records: usize) {
    counter!(SUMMARIES, "scope" => scope).increment(1);
    histogram!(SUMMARY_RECORDS).record(records as f64);
}
