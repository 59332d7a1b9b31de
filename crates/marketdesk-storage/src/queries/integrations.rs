// SPDX-FileCopyrightText: 2026 Marketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user marketplace integrations.

use marketdesk_core::{Credentials, MarketdeskError, now_timestamp};
use rusqlite::{OptionalExtension, params};

use crate::database::{Database, map_tr_err};
use crate::models::{Integration, parse_column};

const INTEGRATION_SELECT: &str = "SELECT id, user_id, marketplace_id, api_key, api_secret,
            store_id, status, last_sync
     FROM user_marketplace_integrations";

fn integration_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Integration> {
    Ok(Integration {
        id: row.get(0)?,
        user_id: row.get(1)?,
        marketplace_id: row.get(2)?,
        api_key: row.get(3)?,
        api_secret: row.get(4)?,
        store_id: row.get(5)?,
        status: parse_column(6, row.get(6)?)?,
        last_sync: row.get(7)?,
    })
}

/// Store credentials for (user, marketplace) and mark the integration active.
///
/// Reconnecting replaces the credentials and keeps the previous `last_sync`.
pub async fn upsert_integration(
    db: &Database,
    user_id: i64,
    marketplace_id: i64,
    credentials: &Credentials,
) -> Result<Integration, MarketdeskError> {
    let credentials = credentials.clone();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "INSERT INTO user_marketplace_integrations
                     (user_id, marketplace_id, api_key, api_secret, store_id, status)
                 VALUES (?1, ?2, ?3, ?4, ?5, 'active')
                 ON CONFLICT(user_id, marketplace_id) DO UPDATE SET
                     api_key = excluded.api_key,
                     api_secret = excluded.api_secret,
                     store_id = excluded.store_id,
                     status = 'active',
                     updated_at = ?6
                 RETURNING id, user_id, marketplace_id, api_key, api_secret,
                       store_id, status, last_sync",
                params![
                    user_id,
                    marketplace_id,
                    credentials.api_key,
                    credentials.seller_id,
                    credentials.client_id,
                    now_timestamp(),
                ],
                integration_from_row,
            )
        })
        .await
        .map_err(map_tr_err)
}

/// The integration for (user, marketplace), active or not.
pub async fn get_integration(
    db: &Database,
    user_id: i64,
    marketplace_id: i64,
) -> Result<Option<Integration>, MarketdeskError> {
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!("{INTEGRATION_SELECT} WHERE user_id = ?1 AND marketplace_id = ?2"),
                params![user_id, marketplace_id],
                integration_from_row,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Mark the integration inactive. Returns whether one existed.
pub async fn deactivate_integration(
    db: &Database,
    user_id: i64,
    marketplace_id: i64,
) -> Result<bool, MarketdeskError> {
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE user_marketplace_integrations SET status = 'inactive', updated_at = ?1
                 WHERE user_id = ?2 AND marketplace_id = ?3",
                params![now_timestamp(), user_id, marketplace_id],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Stamp `last_sync = now` and return the stamp.
pub async fn touch_last_sync(db: &Database, integration_id: i64) -> Result<String, MarketdeskError> {
    let now = now_timestamp();
    let stamp = now.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE user_marketplace_integrations SET last_sync = ?1, updated_at = ?1
                 WHERE id = ?2",
                params![stamp, integration_id],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;
    Ok(now)
}

pub async fn count_active_integrations(db: &Database) -> Result<i64, MarketdeskError> {
    db.connection()
        .call(|conn| {
            conn.query_row(
                "SELECT COUNT(*) FROM user_marketplace_integrations WHERE status = 'active'",
                [],
                |row| row.get(0),
            )
        })
        .await
        .map_err(map_tr_err)
}
