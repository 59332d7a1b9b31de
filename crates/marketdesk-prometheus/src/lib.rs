// SPDX-FileCopyrightText: 2026 Marketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prometheus metrics for Marketdesk.
//!
//! Uses the metrics-rs facade with the Prometheus exporter. Metrics are
//! rendered as Prometheus text via [`PrometheusExporter::render`], which the
//! gateway serves at `/metrics`.

pub mod recording;

use marketdesk_core::MarketdeskError;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

pub use recording::{
    record_forecast, record_synced, record_sync_failure, record_upstream_latency,
    record_webhook, register_metrics,
};

/// Owner of the Prometheus render handle.
#[derive(Clone)]
pub struct PrometheusExporter {
    handle: PrometheusHandle,
}

impl PrometheusExporter {
    /// Install the Prometheus recorder globally.
    ///
    /// Only one recorder can be installed per process; a second call fails.
    pub fn install() -> Result<Self, MarketdeskError> {
        let handle = PrometheusBuilder::new().install_recorder().map_err(|e| {
            MarketdeskError::Internal(format!("failed to install Prometheus recorder: {e}"))
        })?;
        register_metrics();
        tracing::info!("prometheus metrics recorder installed");
        Ok(Self { handle })
    }

    /// An exporter whose recorder is not installed. Renders only what is
    /// recorded through it directly, which in practice is nothing; used by
    /// tests that need a `/metrics` route without touching global state.
    pub fn detached() -> Self {
        let recorder = PrometheusBuilder::new().build_recorder();
        Self {
            handle: recorder.handle(),
        }
    }

    /// Render all collected metrics in Prometheus text format.
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detached_exporter_renders_without_global_recorder() {
        let exporter = PrometheusExporter::detached();
        record_synced("ozon", "products", 3);
        record_webhook("processed");
        assert!(!exporter.render().contains("marketdesk_synced_records_total"));
    }

    #[test]
    fn recording_without_recorder_is_a_noop() {
        record_forecast("sales_forecast");
        record_upstream_latency("ozon", "ok", 0.25);
        record_sync_failure("wildberries", "orders");
    }
}
