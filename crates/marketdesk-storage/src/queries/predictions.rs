// SPDX-FileCopyrightText: 2026 Marketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only store of forecast and analysis results.

use marketdesk_core::{MarketdeskError, now_timestamp};
use rusqlite::params;

use crate::database::{Database, map_tr_err};
use crate::models::{NewPrediction, Prediction};

/// Append a prediction, returning its id.
pub async fn insert_prediction(db: &Database, new: &NewPrediction) -> Result<i64, MarketdeskError> {
    let value = serde_json::to_string(&new.prediction_value)?;
    let new = new.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO ml_predictions (prediction_type, product_id, marketplace_id,
                     prediction_value, confidence_score, prediction_date)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    new.prediction_type,
                    new.product_id,
                    new.marketplace_id,
                    value,
                    new.confidence_score.clamp(0.0, 1.0),
                    now_timestamp(),
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(map_tr_err)
}

/// Most recent predictions first, optionally of one type.
pub async fn list_predictions(
    db: &Database,
    prediction_type: Option<&str>,
    limit: i64,
) -> Result<Vec<Prediction>, MarketdeskError> {
    let prediction_type = prediction_type.map(str::to_string);
    let rows = db
        .connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, prediction_type, product_id, marketplace_id, prediction_value,
                        confidence_score, prediction_date, created_at
                 FROM ml_predictions
                 WHERE ?1 IS NULL OR prediction_type = ?1
                 ORDER BY created_at DESC, id DESC
                 LIMIT ?2",
            )?;
            let rows = stmt.query_map(params![prediction_type, limit], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<i64>>(2)?,
                    row.get::<_, Option<i64>>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, f64>(5)?,
                    row.get::<_, String>(6)?,
                    row.get::<_, String>(7)?,
                ))
            })?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)?;

    rows.into_iter()
        .map(
            |(id, prediction_type, product_id, marketplace_id, value, confidence, date, created)| {
                Ok(Prediction {
                    id,
                    prediction_type,
                    product_id,
                    marketplace_id,
                    prediction_value: serde_json::from_str(&value)?,
                    confidence_score: confidence,
                    prediction_date: date,
                    created_at: created,
                })
            },
        )
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn prediction(kind: &str, confidence: f64) -> NewPrediction {
        NewPrediction {
            prediction_type: kind.to_string(),
            product_id: Some(1),
            marketplace_id: None,
            prediction_value: json!({ "forecast": [1, 2, 3] }),
            confidence_score: confidence,
        }
    }

    #[tokio::test]
    async fn list_newest_first_with_type_filter() {
        let db = Database::open_in_memory().await.unwrap();
        insert_prediction(&db, &prediction("sales_forecast", 0.8)).await.unwrap();
        insert_prediction(&db, &prediction("returns", 0.5)).await.unwrap();
        let last = insert_prediction(&db, &prediction("sales_forecast", 0.9))
            .await
            .unwrap();

        let all = list_predictions(&db, None, 50).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].id, last);

        let sales = list_predictions(&db, Some("sales_forecast"), 50).await.unwrap();
        assert_eq!(sales.len(), 2);
        assert_eq!(sales[0].prediction_value["forecast"][2], 3);
    }

    #[tokio::test]
    async fn limit_is_respected() {
        let db = Database::open_in_memory().await.unwrap();
        for _ in 0..5 {
            insert_prediction(&db, &prediction("anomaly", 0.85)).await.unwrap();
        }
        assert_eq!(list_predictions(&db, None, 2).await.unwrap().len(), 2);
    }
}
