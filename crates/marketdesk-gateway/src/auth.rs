// SPDX-FileCopyrightText: 2026 Marketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bearer token check for `/api` routes and the acting-user extractor.
//!
//! Without a configured token the API is open; the server logs a warning at
//! startup in that case.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{StatusCode, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::envelope::ApiError;
use crate::server::AppState;

/// Header naming the user a request acts for.
pub const USER_HEADER: &str = "x-user-id";

#[derive(Clone)]
pub struct AuthConfig {
    /// Expected bearer token. `None` disables the check.
    pub bearer_token: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field(
                "bearer_token",
                &self.bearer_token.as_ref().map(|_| "[redacted]"),
            )
            .finish()
    }
}

pub async fn auth_middleware(
    State(auth): State<AuthConfig>,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected) = auth.bearer_token.as_deref() else {
        return next.run(request).await;
    };
    let presented = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    if presented == Some(expected) {
        return next.run(request).await;
    }
    tracing::debug!(path = %request.uri().path(), "rejected request without valid bearer token");
    (
        StatusCode::UNAUTHORIZED,
        axum::Json(serde_json::json!({
            "status": "error",
            "data": null,
            "error": {"kind": "unauthorized", "message": "missing or invalid bearer token"},
        })),
    )
        .into_response()
}

/// The user a request acts for: `X-User-Id`, else the configured default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActingUser(pub i64);

impl FromRequestParts<AppState> for ActingUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match parts.headers.get(USER_HEADER) {
            None => Ok(ActingUser(state.default_user_id)),
            Some(value) => value
                .to_str()
                .ok()
                .and_then(|v| v.trim().parse::<i64>().ok())
                .filter(|id| *id > 0)
                .map(ActingUser)
                .ok_or_else(|| ApiError::validation("X-User-Id must be a positive integer")),
        }
    }
}
