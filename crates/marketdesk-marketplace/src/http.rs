// SPDX-FileCopyrightText: 2026 Marketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared JSON-over-HTTP transport for marketplace clients.
//!
//! One request per call, bounded by the client timeout, never retried.

use std::time::{Duration, Instant};

use marketdesk_core::{MarketdeskError, UpstreamFailure};
use reqwest::header::HeaderMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

/// Longest upstream error body echoed into an error message.
const MAX_ERROR_BODY: usize = 300;

#[derive(Debug, Clone)]
pub(crate) struct ApiTransport {
    client: reqwest::Client,
    base_url: String,
    marketplace: &'static str,
}

impl ApiTransport {
    pub(crate) fn new(
        marketplace: &'static str,
        base_url: &str,
        headers: HeaderMap,
        timeout: Duration,
    ) -> Result<Self, MarketdeskError> {
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| MarketdeskError::Internal(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            marketplace,
        })
    }

    /// POST `body` as JSON to `path` and decode the JSON response.
    pub(crate) async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, MarketdeskError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}{path}", self.base_url);
        let started = Instant::now();

        let response = match self.client.post(&url).json(body).send().await {
            Ok(response) => response,
            Err(e) => {
                self.observe(started, "transport_error");
                return Err(self.transport_error(path, &e));
            }
        };

        let status = response.status();
        debug!(marketplace = self.marketplace, path, status = %status, "marketplace response received");

        if !status.is_success() {
            self.observe(started, "http_error");
            let body = response.text().await.unwrap_or_default();
            return Err(MarketdeskError::integration(
                self.marketplace,
                UpstreamFailure::Status(status.as_u16()),
                format!("{path}: {}", error_summary(&body)),
            ));
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                self.observe(started, "transport_error");
                return Err(self.transport_error(path, &e));
            }
        };
        self.observe(started, "ok");

        serde_json::from_str(&body).map_err(|e| {
            MarketdeskError::integration(
                self.marketplace,
                UpstreamFailure::InvalidResponse,
                format!("{path}: {e}"),
            )
        })
    }

    fn observe(&self, started: Instant, outcome: &'static str) {
        marketdesk_prometheus::record_upstream_latency(
            self.marketplace,
            outcome,
            started.elapsed().as_secs_f64(),
        );
    }

    fn transport_error(&self, path: &str, e: &reqwest::Error) -> MarketdeskError {
        let failure = if e.is_timeout() {
            UpstreamFailure::Timeout
        } else {
            UpstreamFailure::ConnectionFailed
        };
        MarketdeskError::integration(self.marketplace, failure, format!("{path}: {e}"))
    }
}

/// Pull a human message out of an upstream error body.
///
/// Both marketplaces answer errors with a JSON object carrying `message`
/// (Ozon) or `title`/`detail` (Wildberries); anything else is echoed, cut short.
fn error_summary(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "detail", "title", "errorText"] {
            if let Some(text) = value.get(key).and_then(|v| v.as_str())
                && !text.is_empty()
            {
                return text.to_string();
            }
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "empty response body".to_string();
    }
    match trimmed.char_indices().nth(MAX_ERROR_BODY) {
        Some((cut, _)) => format!("{}...", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_prefers_json_message() {
        assert_eq!(
            error_summary(r#"{"code":7,"message":"Invalid Api-Key","details":[]}"#),
            "Invalid Api-Key"
        );
        assert_eq!(
            error_summary(r#"{"title":"unauthorized","detail":"token expired"}"#),
            "token expired"
        );
    }

    #[test]
    fn summary_truncates_plain_bodies() {
        let long = "x".repeat(1000);
        let summary = error_summary(&long);
        assert_eq!(summary.len(), MAX_ERROR_BODY + 3);
        assert_eq!(error_summary("  "), "empty response body");
    }
}
