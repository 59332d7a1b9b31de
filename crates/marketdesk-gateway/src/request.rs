// SPDX-FileCopyrightText: 2026 Marketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Action requests: `?action=` plus parameters from the query string or a
//! JSON body. Body fields win over query parameters of the same name.

use std::collections::HashMap;

use axum::{
    body::Bytes,
    extract::{FromRequest, Query, Request},
};
use marketdesk_core::Credentials;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::envelope::ApiError;

#[derive(Debug, Default)]
pub struct ApiRequest {
    params: HashMap<String, String>,
    body: Value,
}

impl<S> FromRequest<S> for ApiRequest
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let params = Query::<HashMap<String, String>>::try_from_uri(req.uri())
            .map(|Query(p)| p)
            .map_err(|e| ApiError::validation(format!("invalid query string: {e}")))?;
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::validation(format!("unreadable body: {e}")))?;
        let body = if bytes.iter().all(u8::is_ascii_whitespace) {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .map_err(|e| ApiError::validation(format!("invalid JSON body: {e}")))?
        };
        Ok(Self { params, body })
    }
}

impl ApiRequest {
    pub fn new(params: HashMap<String, String>, body: Value) -> Self {
        Self { params, body }
    }

    pub fn action(&self) -> Result<&str, ApiError> {
        self.params
            .get("action")
            .map(|a| a.trim())
            .filter(|a| !a.is_empty())
            .ok_or_else(|| ApiError::validation("missing `action` parameter"))
    }

    fn raw(&self, key: &str) -> Option<Value> {
        match self.body.get(key) {
            Some(Value::Null) | None => self.params.get(key).map(|v| Value::String(v.clone())),
            Some(v) => Some(v.clone()),
        }
    }

    pub fn opt_str(&self, key: &str) -> Option<String> {
        match self.raw(key)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn require_str(&self, key: &str) -> Result<String, ApiError> {
        self.opt_str(key)
            .ok_or_else(|| ApiError::validation(format!("`{key}` is required")))
    }

    pub fn opt_i64(&self, key: &str) -> Result<Option<i64>, ApiError> {
        let invalid = || ApiError::validation(format!("`{key}` must be an integer"));
        match self.raw(key) {
            None => Ok(None),
            Some(Value::Number(n)) => n.as_i64().map(Some).ok_or_else(invalid),
            Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
            Some(Value::String(s)) => s.trim().parse().map(Some).map_err(|_| invalid()),
            Some(_) => Err(invalid()),
        }
    }

    pub fn require_i64(&self, key: &str) -> Result<i64, ApiError> {
        self.opt_i64(key)?
            .ok_or_else(|| ApiError::validation(format!("`{key}` is required")))
    }

    pub fn opt_f64(&self, key: &str) -> Result<Option<f64>, ApiError> {
        let invalid = || ApiError::validation(format!("`{key}` must be a number"));
        match self.raw(key) {
            None => Ok(None),
            Some(Value::Number(n)) => n.as_f64().map(Some).ok_or_else(invalid),
            Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
            Some(Value::String(s)) => s.trim().parse().map(Some).map_err(|_| invalid()),
            Some(_) => Err(invalid()),
        }
    }

    pub fn require_f64(&self, key: &str) -> Result<f64, ApiError> {
        self.opt_f64(key)?
            .ok_or_else(|| ApiError::validation(format!("`{key}` is required")))
    }

    /// Deserialize one body field.
    pub fn field<T: DeserializeOwned>(&self, key: &str) -> Result<T, ApiError> {
        let value = self
            .body
            .get(key)
            .cloned()
            .ok_or_else(|| ApiError::validation(format!("`{key}` is required")))?;
        serde_json::from_value(value)
            .map_err(|e| ApiError::validation(format!("invalid `{key}`: {e}")))
    }

    /// Deserialize the whole body.
    pub fn body_as<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_value(self.body.clone())
            .map_err(|e| ApiError::validation(format!("invalid request body: {e}")))
    }

    /// Credentials supplied with the request, if it names an api key.
    pub fn credentials(&self) -> Option<Credentials> {
        let api_key = self.opt_str("apiKey")?;
        Some(Credentials {
            api_key,
            client_id: self.opt_str("clientId"),
            seller_id: self.opt_str("sellerId"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(query: &[(&str, &str)], body: Value) -> ApiRequest {
        ApiRequest::new(
            query
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            body,
        )
    }

    #[test]
    fn body_overrides_query() {
        let req = request(
            &[("action", "getOrders"), ("limit", "5")],
            json!({"limit": 7}),
        );
        assert_eq!(req.action().unwrap(), "getOrders");
        assert_eq!(req.opt_i64("limit").unwrap(), Some(7));
    }

    #[test]
    fn numbers_parse_from_query_strings() {
        let req = request(&[("marketplaceId", "2"), ("price", "19.5")], Value::Null);
        assert_eq!(req.require_i64("marketplaceId").unwrap(), 2);
        assert_eq!(req.require_f64("price").unwrap(), 19.5);
        assert!(req.opt_i64("missing").unwrap().is_none());
    }

    #[test]
    fn malformed_numbers_are_validation_errors() {
        let req = request(&[("productId", "abc")], Value::Null);
        assert!(req.opt_i64("productId").is_err());
        let req = request(&[], json!({"productId": [1]}));
        assert!(req.require_i64("productId").is_err());
    }

    #[test]
    fn missing_action_is_rejected() {
        assert!(request(&[], Value::Null).action().is_err());
        assert!(request(&[("action", " ")], Value::Null).action().is_err());
    }

    #[test]
    fn credentials_need_an_api_key() {
        let req = request(&[], json!({"clientId": "42"}));
        assert!(req.credentials().is_none());
        let req = request(&[], json!({"apiKey": "k", "clientId": 42}));
        let creds = req.credentials().unwrap();
        assert_eq!(creds.api_key, "k");
        assert_eq!(creds.client_id.as_deref(), Some("42"));
    }
}
