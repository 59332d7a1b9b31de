// SPDX-FileCopyrightText: 2026 Marketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sync step outcomes and the full-sync report.

use marketdesk_core::{MarketdeskError, now_timestamp};
use serde::Serialize;
use strum::{Display, IntoStaticStr};

/// One step of a full sync, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SyncStep {
    Products,
    Orders,
    Customers,
}

/// Counts from one order sync pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OrderSyncOutcome {
    /// Orders seen for the first time and inserted with their items.
    pub created: usize,
    /// Known orders whose figures (and status, when allowed) were refreshed.
    pub updated: usize,
    /// Known orders whose upstream status was not a legal transition; their
    /// local status was kept.
    pub transitions_rejected: usize,
}

impl OrderSyncOutcome {
    pub fn total(&self) -> usize {
        self.created + self.updated
    }
}

/// Result of a full sync. Steps that completed keep their counts even when
/// a later step fails; nothing is rolled back.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub marketplace_id: i64,
    pub marketplace: String,
    pub simulated: bool,
    pub products: usize,
    pub orders: OrderSyncOutcome,
    pub customers: usize,
    pub completed_steps: Vec<SyncStep>,
    pub failed_step: Option<SyncStep>,
    pub error: Option<String>,
    pub last_sync: Option<String>,
    pub started_at: String,
    pub finished_at: Option<String>,
}

impl SyncReport {
    pub(crate) fn start(marketplace_id: i64, marketplace: &str, simulated: bool) -> Self {
        Self {
            marketplace_id,
            marketplace: marketplace.to_string(),
            simulated,
            products: 0,
            orders: OrderSyncOutcome::default(),
            customers: 0,
            completed_steps: Vec::new(),
            failed_step: None,
            error: None,
            last_sync: None,
            started_at: now_timestamp(),
            finished_at: None,
        }
    }

    pub(crate) fn complete(&mut self, step: SyncStep, last_sync: String) {
        self.completed_steps.push(step);
        self.last_sync = Some(last_sync);
    }

    pub(crate) fn fail(&mut self, step: SyncStep, error: &MarketdeskError) {
        self.failed_step = Some(step);
        self.error = Some(error.to_string());
    }

    pub(crate) fn finish(mut self) -> Self {
        self.finished_at = Some(now_timestamp());
        self
    }

    /// True when every step completed.
    pub fn is_success(&self) -> bool {
        self.failed_step.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_report_keeps_completed_counts() {
        let mut report = SyncReport::start(1, "ozon", false);
        report.products = 4;
        report.complete(SyncStep::Products, now_timestamp());
        report.fail(
            SyncStep::Orders,
            &MarketdeskError::Validation("bad window".into()),
        );
        let report = report.finish();

        assert!(!report.is_success());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["products"], 4);
        assert_eq!(json["completedSteps"], serde_json::json!(["products"]));
        assert_eq!(json["failedStep"], "orders");
        assert!(json["error"].as_str().unwrap().contains("bad window"));
        assert!(json["finishedAt"].is_string());
    }

    #[test]
    fn step_labels_are_snake_case() {
        let label: &'static str = SyncStep::Customers.into();
        assert_eq!(label, "customers");
        assert_eq!(SyncStep::Products.to_string(), "products");
    }
}
