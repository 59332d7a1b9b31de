// SPDX-FileCopyrightText: 2026 Marketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The `{status, data, error}` response envelope shared by every `/api`
//! route.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use marketdesk_core::MarketdeskError;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub status: &'static str,
    pub data: Option<T>,
    pub error: Option<ErrorBody>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Stable machine-readable kind, e.g. `not_found`.
    pub kind: &'static str,
    pub message: String,
}

/// A successful envelope with HTTP 200.
pub fn ok<T: Serialize>(data: T) -> Response {
    (
        StatusCode::OK,
        Json(Envelope {
            status: "ok",
            data: Some(data),
            error: None,
        }),
    )
        .into_response()
}

/// An error envelope that still carries a payload, for operations that
/// fail after doing part of their work.
pub fn partial<T: Serialize>(
    status: StatusCode,
    kind: &'static str,
    message: String,
    data: T,
) -> Response {
    (
        status,
        Json(Envelope {
            status: "error",
            data: Some(data),
            error: Some(ErrorBody { kind, message }),
        }),
    )
        .into_response()
}

/// Handler error rendered as an error envelope with the mapped status code.
#[derive(Debug)]
pub struct ApiError(pub MarketdeskError);

impl From<MarketdeskError> for ApiError {
    fn from(e: MarketdeskError) -> Self {
        Self(e)
    }
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self(MarketdeskError::Validation(message.into()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let message = match &self.0 {
            // Storage details stay in the log.
            MarketdeskError::Storage { .. } => "internal storage error".to_string(),
            other => other.to_string(),
        };
        if status.is_server_error() {
            tracing::error!(error = %self.0, kind = self.0.kind(), "request failed");
        } else {
            tracing::debug!(error = %self.0, kind = self.0.kind(), "request rejected");
        }
        (
            status,
            Json(Envelope::<()> {
                status: "error",
                data: None,
                error: Some(ErrorBody {
                    kind: self.0.kind(),
                    message,
                }),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_envelope_serializes_null_data() {
        let envelope = Envelope::<()> {
            status: "error",
            data: None,
            error: Some(ErrorBody {
                kind: "not_found",
                message: "product not found: 7".into(),
            }),
        };
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["status"], "error");
        assert!(json["data"].is_null());
        assert_eq!(json["error"]["kind"], "not_found");
    }

    #[test]
    fn status_follows_error_kind() {
        let response = ApiError(MarketdeskError::not_found("order", 1)).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let response = ApiError::validation("bad").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let response = ApiError(MarketdeskError::NotConnected {
            marketplace: "ozon".into(),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
