// SPDX-FileCopyrightText: 2026 Marketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric registration and recording helpers.
//!
//! Uses the metrics-rs facade; without an installed recorder every call is a
//! no-op, so library crates record unconditionally.

use metrics::{describe_counter, describe_histogram};

/// Register all Marketdesk metric descriptions.
///
/// Called once at startup after the recorder is installed.
pub fn register_metrics() {
    describe_counter!(
        "marketdesk_synced_records_total",
        "Records upserted by marketplace sync, by entity"
    );
    describe_counter!(
        "marketdesk_sync_failures_total",
        "Sync runs that stopped on a failing step"
    );
    describe_counter!(
        "marketdesk_webhook_events_total",
        "Inbound marketplace webhook events by outcome"
    );
    describe_counter!(
        "marketdesk_forecasts_total",
        "Forecasts and analyses computed, by type"
    );
    describe_histogram!(
        "marketdesk_marketplace_request_seconds",
        "Outbound marketplace API request latency in seconds"
    );
}

/// Record records upserted by one sync step (`products`, `orders`, `customers`).
pub fn record_synced(marketplace: &str, entity: &'static str, count: u64) {
    metrics::counter!(
        "marketdesk_synced_records_total",
        "marketplace" => marketplace.to_string(),
        "entity" => entity
    )
    .increment(count);
}

/// Record a sync run that failed at `step`.
pub fn record_sync_failure(marketplace: &str, step: &'static str) {
    metrics::counter!(
        "marketdesk_sync_failures_total",
        "marketplace" => marketplace.to_string(),
        "step" => step
    )
    .increment(1);
}

/// Record one webhook event (`processed`, `ignored`, `error_logged`).
pub fn record_webhook(outcome: &'static str) {
    metrics::counter!("marketdesk_webhook_events_total", "outcome" => outcome).increment(1);
}

pub fn record_forecast(kind: &'static str) {
    metrics::counter!("marketdesk_forecasts_total", "type" => kind).increment(1);
}

/// Record latency of one outbound marketplace request, labelled by outcome.
pub fn record_upstream_latency(marketplace: &str, outcome: &'static str, seconds: f64) {
    metrics::histogram!(
        "marketdesk_marketplace_request_seconds",
        "marketplace" => marketplace.to_string(),
        "outcome" => outcome
    )
    .record(seconds);
}
