// SPDX-FileCopyrightText: 2026 Marketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types shared by every Marketdesk crate.

use thiserror::Error;

/// How an upstream marketplace call failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamFailure {
    /// The marketplace answered with a non-success HTTP status.
    Status(u16),
    /// The request did not complete within the client timeout.
    Timeout,
    /// The connection could not be established or was dropped.
    ConnectionFailed,
    /// The response arrived but could not be decoded.
    InvalidResponse,
    /// The adapter does not implement the requested operation.
    Unsupported,
}

impl std::fmt::Display for UpstreamFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UpstreamFailure::Status(code) => write!(f, "HTTP {code}"),
            UpstreamFailure::Timeout => f.write_str("timeout"),
            UpstreamFailure::ConnectionFailed => f.write_str("connection failed"),
            UpstreamFailure::InvalidResponse => f.write_str("invalid response"),
            UpstreamFailure::Unsupported => f.write_str("operation not supported"),
        }
    }
}

/// The primary error type used across Marketdesk operations.
#[derive(Debug, Error)]
pub enum MarketdeskError {
    /// A required field is missing or malformed.
    #[error("validation error: {0}")]
    Validation(String),

    /// No record matches the given identifier.
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    /// The user has no active integration for the marketplace.
    #[error("marketplace {marketplace} is not connected")]
    NotConnected { marketplace: String },

    /// An upstream marketplace API call failed.
    #[error("{marketplace} API error ({failure}): {message}")]
    Integration {
        marketplace: String,
        failure: UpstreamFailure,
        message: String,
    },

    /// Missing credentials or configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl MarketdeskError {
    /// Shorthand for [`MarketdeskError::NotFound`].
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        MarketdeskError::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    /// Shorthand for [`MarketdeskError::Integration`].
    pub fn integration(
        marketplace: impl Into<String>,
        failure: UpstreamFailure,
        message: impl Into<String>,
    ) -> Self {
        MarketdeskError::Integration {
            marketplace: marketplace.into(),
            failure,
            message: message.into(),
        }
    }

    /// HTTP status code the gateway reports for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            MarketdeskError::Validation(_) | MarketdeskError::Config(_) => 400,
            MarketdeskError::NotFound { .. } | MarketdeskError::NotConnected { .. } => 404,
            MarketdeskError::Integration { .. }
            | MarketdeskError::Storage { .. }
            | MarketdeskError::Internal(_) => 500,
        }
    }

    /// Stable machine-readable kind, used in logs and the response envelope.
    pub fn kind(&self) -> &'static str {
        match self {
            MarketdeskError::Validation(_) => "validation_error",
            MarketdeskError::NotFound { .. } => "not_found",
            MarketdeskError::NotConnected { .. } => "not_connected",
            MarketdeskError::Integration { .. } => "integration_error",
            MarketdeskError::Config(_) => "configuration_error",
            MarketdeskError::Storage { .. } | MarketdeskError::Internal(_) => "internal_error",
        }
    }
}

impl From<serde_json::Error> for MarketdeskError {
    fn from(e: serde_json::Error) -> Self {
        MarketdeskError::Internal(format!("json: {e}"))
    }
}
