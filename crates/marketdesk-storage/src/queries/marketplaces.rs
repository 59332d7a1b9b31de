// SPDX-FileCopyrightText: 2026 Marketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Marketplace directory lookups.

use marketdesk_core::MarketdeskError;
use rusqlite::{OptionalExtension, params};

use crate::database::{Database, map_tr_err};
use crate::models::{Marketplace, MarketplaceOverview};

fn marketplace_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Marketplace> {
    Ok(Marketplace {
        id: row.get(0)?,
        name: row.get(1)?,
        slug: row.get(2)?,
        logo_url: row.get(3)?,
        country: row.get(4)?,
    })
}

pub async fn get_marketplace(db: &Database, id: i64) -> Result<Option<Marketplace>, MarketdeskError> {
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT id, name, slug, logo_url, country FROM marketplaces WHERE id = ?1",
                params![id],
                marketplace_from_row,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Find a marketplace by slug or by case-insensitive display name.
pub async fn find_marketplace(
    db: &Database,
    name_or_slug: &str,
) -> Result<Option<Marketplace>, MarketdeskError> {
    let needle = name_or_slug.trim().to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT id, name, slug, logo_url, country FROM marketplaces
                 WHERE slug = ?1 OR LOWER(name) = LOWER(?1)
                 ORDER BY slug = ?1 DESC
                 LIMIT 1",
                params![needle],
                marketplace_from_row,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Every marketplace with the given user's connection state, by name.
pub async fn list_overview(
    db: &Database,
    user_id: i64,
) -> Result<Vec<MarketplaceOverview>, MarketdeskError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT m.id, m.name, m.slug, m.logo_url, m.country,
                        COALESCE(umi.status = 'active', 0), umi.store_id, umi.last_sync
                 FROM marketplaces m
                 LEFT JOIN user_marketplace_integrations umi
                        ON umi.marketplace_id = m.id AND umi.user_id = ?1
                 ORDER BY m.name",
            )?;
            let rows = stmt.query_map(params![user_id], |row| {
                Ok(MarketplaceOverview {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    slug: row.get(2)?,
                    logo_url: row.get(3)?,
                    country: row.get(4)?,
                    is_connected: row.get(5)?,
                    client_id: row.get(6)?,
                    last_sync_at: row.get(7)?,
                })
            })?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

pub async fn count_marketplaces(db: &Database) -> Result<i64, MarketdeskError> {
    db.connection()
        .call(|conn| conn.query_row("SELECT COUNT(*) FROM marketplaces", [], |row| row.get(0)))
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn find_by_slug_or_name() {
        let db = Database::open_in_memory().await.unwrap();
        let by_slug = find_marketplace(&db, "yandex_market").await.unwrap().unwrap();
        let by_name = find_marketplace(&db, "YANDEX MARKET").await.unwrap().unwrap();
        assert_eq!(by_slug.id, by_name.id);
        assert!(find_marketplace(&db, "ebay").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn overview_lists_all_seeded_marketplaces_disconnected() {
        let db = Database::open_in_memory().await.unwrap();
        let overview = list_overview(&db, 1).await.unwrap();
        assert_eq!(overview.len(), 6);
        assert!(overview.iter().all(|m| !m.is_connected));
        assert_eq!(count_marketplaces(&db).await.unwrap(), 6);
        assert_eq!(get_marketplace(&db, 1).await.unwrap().unwrap().slug, "ozon");
    }
}
