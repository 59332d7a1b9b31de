// SPDX-FileCopyrightText: 2026 Marketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `marketdesk sync`: one full sync from the command line.

use marketdesk_config::model::MarketdeskConfig;
use marketdesk_core::MarketdeskError;
use marketdesk_sync::SyncReport;

use crate::serve::{init_tracing, open_database, sync_engine};

/// Run a full sync and print the report as JSON on stdout.
///
/// A run that stops at a failed step still prints its report, then fails.
pub async fn run_sync(
    config: MarketdeskConfig,
    marketplace_id: i64,
    user_id: Option<i64>,
) -> Result<(), MarketdeskError> {
    init_tracing(&config.app.log_level);
    let user_id = user_id.unwrap_or(config.server.default_user_id);

    let db = open_database(&config).await?;
    let engine = sync_engine(&config, db.clone());
    let report = engine.full_sync(user_id, marketplace_id).await;
    db.close().await?;

    let report = report?;
    println!("{}", render_report(&report)?);
    if let Some(step) = report.failed_step {
        return Err(MarketdeskError::Internal(format!(
            "sync stopped at {step}: {}",
            report.error.as_deref().unwrap_or("unknown error")
        )));
    }
    Ok(())
}

fn render_report(report: &SyncReport) -> Result<String, MarketdeskError> {
    serde_json::to_string_pretty(report)
        .map_err(|e| MarketdeskError::Internal(format!("failed to render sync report: {e}")))
}
