// SPDX-FileCopyrightText: 2026 Marketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `/api/ml`: forecasts and stored predictions.

use axum::{extract::State, response::Response};
use serde_json::json;

use crate::auth::ActingUser;
use crate::envelope::{ApiError, ok};
use crate::handlers::unknown_action;
use crate::request::ApiRequest;
use crate::server::AppState;

pub async fn handle(
    State(state): State<AppState>,
    _user: ActingUser,
    req: ApiRequest,
) -> Result<Response, ApiError> {
    let forecast = &state.forecast;
    match req.action()? {
        "salesForecast" => {
            let product_id = req.require_i64("productId")?;
            let days = req
                .opt_i64("days")?
                .map(|d| u32::try_from(d).map_err(|_| ApiError::validation("`days` out of range")))
                .transpose()?;
            Ok(ok(forecast.sales_forecast(product_id, days).await?))
        }
        "returnsPrediction" => {
            let product_id = req.require_i64("productId")?;
            Ok(ok(forecast.returns_prediction(product_id).await?))
        }
        "anomalyDetection" => {
            let marketplace_id = req.require_i64("marketplaceId")?;
            Ok(ok(forecast.anomaly_detection(marketplace_id).await?))
        }
        "demandForecast" => {
            let category = req.require_str("category")?;
            Ok(ok(forecast.demand_forecast(&category).await?))
        }
        "getPredictions" => {
            let kind = req.opt_str("type");
            let predictions = forecast.list_predictions(kind.as_deref()).await?;
            Ok(ok(json!({ "total": predictions.len(), "predictions": predictions })))
        }
        other => Err(unknown_action(other)),
    }
}
