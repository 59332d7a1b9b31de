// SPDX-FileCopyrightText: 2026 Marketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Product catalog and marketplace link operations.

use marketdesk_core::{MarketdeskError, NormalizedProduct, now_timestamp};
use rusqlite::{OptionalExtension, params};

use crate::database::{Database, map_tr_err};
use crate::models::{MarketplaceLink, NewProduct, Product, parse_column};

const PRODUCT_COLUMNS: &str = "p.id, p.sku, p.name, p.description, p.price, p.cost_price, \
     p.stock, p.category, p.image_url, p.status, p.created_at, p.updated_at";

fn product_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Product> {
    Ok(Product {
        id: row.get(0)?,
        sku: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        price: row.get(4)?,
        cost_price: row.get(5)?,
        stock: row.get(6)?,
        category: row.get(7)?,
        image_url: row.get(8)?,
        status: parse_column(9, row.get(9)?)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}

/// Insert or update a product by sku from marketplace data, returning its id.
///
/// The sku is matched trimmed. An existing row keeps its description, cost
/// price and image, and keeps its stock when the marketplace reports none;
/// a soft-deleted row is reactivated.
pub async fn upsert_from_marketplace(
    db: &Database,
    product: &NormalizedProduct,
) -> Result<i64, MarketdeskError> {
    let product = product.clone();
    let sku = product.sku.trim().to_string();
    if sku.is_empty() {
        return Err(MarketdeskError::Validation("sku is required".to_string()));
    }
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "INSERT INTO products (sku, name, price, stock, category, status)
                 VALUES (?1, ?2, ?3, COALESCE(?4, 0), ?5, 'active')
                 ON CONFLICT(sku) DO UPDATE SET
                     name = excluded.name,
                     price = excluded.price,
                     stock = COALESCE(?4, products.stock),
                     category = COALESCE(excluded.category, products.category),
                     status = 'active',
                     updated_at = ?6
                 RETURNING id",
                params![
                    sku,
                    product.name,
                    product.price.max(0.0),
                    product.stock.map(|s| s.max(0)),
                    product.category,
                    now_timestamp(),
                ],
                |row| row.get(0),
            )
        })
        .await
        .map_err(map_tr_err)
}

/// Insert or update the link between a product and a marketplace.
///
/// `stock` is `None` for marketplaces whose catalog carries no stock.
pub async fn upsert_link(
    db: &Database,
    product_id: i64,
    marketplace_id: i64,
    external_id: &str,
    price: f64,
    stock: Option<i64>,
) -> Result<(), MarketdeskError> {
    let external_id = external_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO marketplace_products
                     (product_id, marketplace_id, external_id, marketplace_price, marketplace_stock, synced_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(product_id, marketplace_id) DO UPDATE SET
                     external_id = excluded.external_id,
                     marketplace_price = excluded.marketplace_price,
                     marketplace_stock = excluded.marketplace_stock,
                     synced_at = excluded.synced_at",
                params![
                    product_id,
                    marketplace_id,
                    external_id,
                    price,
                    stock,
                    now_timestamp()
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// All links of one product.
pub async fn list_links(
    db: &Database,
    product_id: i64,
) -> Result<Vec<MarketplaceLink>, MarketdeskError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, product_id, marketplace_id, external_id, marketplace_price,
                        marketplace_stock, synced_at
                 FROM marketplace_products WHERE product_id = ?1 ORDER BY marketplace_id",
            )?;
            let rows = stmt.query_map(params![product_id], |row| {
                Ok(MarketplaceLink {
                    id: row.get(0)?,
                    product_id: row.get(1)?,
                    marketplace_id: row.get(2)?,
                    external_id: row.get(3)?,
                    marketplace_price: row.get(4)?,
                    marketplace_stock: row.get(5)?,
                    synced_at: row.get(6)?,
                })
            })?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

/// Set the marketplace price on the link of the product with this sku.
///
/// Returns whether a link existed.
pub async fn refresh_link_price(
    db: &Database,
    marketplace_id: i64,
    sku: &str,
    price: f64,
) -> Result<bool, MarketdeskError> {
    let sku = sku.to_string();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE marketplace_products SET marketplace_price = ?1, synced_at = ?2
                 WHERE marketplace_id = ?3
                   AND product_id = (SELECT id FROM products WHERE sku = ?4)",
                params![price, now_timestamp(), marketplace_id, sku],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Set the marketplace stock on the link of the product with this sku.
pub async fn refresh_link_stock(
    db: &Database,
    marketplace_id: i64,
    sku: &str,
    stock: i64,
) -> Result<bool, MarketdeskError> {
    let sku = sku.to_string();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE marketplace_products SET marketplace_stock = ?1, synced_at = ?2
                 WHERE marketplace_id = ?3
                   AND product_id = (SELECT id FROM products WHERE sku = ?4)",
                params![stock, now_timestamp(), marketplace_id, sku],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Create a product. A duplicate sku is a validation error.
pub async fn create_product(db: &Database, new: &NewProduct) -> Result<Product, MarketdeskError> {
    if new.sku.trim().is_empty() || new.name.trim().is_empty() {
        return Err(MarketdeskError::Validation(
            "sku and name are required".to_string(),
        ));
    }
    if new.price < 0.0 || new.stock < 0 {
        return Err(MarketdeskError::Validation(
            "price and stock must be non-negative".to_string(),
        ));
    }

    let new = new.clone();
    let sku = new.sku.clone();
    let created = db
        .connection()
        .call(move |conn| -> Result<Option<Product>, rusqlite::Error> {
            let inserted = conn.execute(
                "INSERT INTO products (sku, name, description, price, cost_price, stock, category, image_url)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                 ON CONFLICT(sku) DO NOTHING",
                params![
                    new.sku.trim(),
                    new.name.trim(),
                    new.description,
                    new.price,
                    new.cost_price,
                    new.stock,
                    new.category,
                    new.image_url,
                ],
            )?;
            if inserted == 0 {
                return Ok(None);
            }
            let id = conn.last_insert_rowid();
            conn.query_row(
                &format!("SELECT {PRODUCT_COLUMNS} FROM products p WHERE p.id = ?1"),
                params![id],
                product_from_row,
            )
            .map(Some)
        })
        .await
        .map_err(map_tr_err)?;

    created.ok_or_else(|| MarketdeskError::Validation(format!("sku `{sku}` already exists")))
}

/// Get a product by id, deleted or not.
pub async fn get_product(db: &Database, id: i64) -> Result<Option<Product>, MarketdeskError> {
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!("SELECT {PRODUCT_COLUMNS} FROM products p WHERE p.id = ?1"),
                params![id],
                product_from_row,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Get a product by sku.
pub async fn get_product_by_sku(
    db: &Database,
    sku: &str,
) -> Result<Option<Product>, MarketdeskError> {
    let sku = sku.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!("SELECT {PRODUCT_COLUMNS} FROM products p WHERE p.sku = ?1"),
                params![sku],
                product_from_row,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// List non-deleted products, newest first, optionally only those linked to
/// a marketplace.
pub async fn list_products(
    db: &Database,
    marketplace_id: Option<i64>,
) -> Result<Vec<Product>, MarketdeskError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {PRODUCT_COLUMNS} FROM products p
                 WHERE p.status = 'active'
                   AND (?1 IS NULL OR EXISTS (
                        SELECT 1 FROM marketplace_products mp
                        WHERE mp.product_id = p.id AND mp.marketplace_id = ?1))
                 ORDER BY p.created_at DESC, p.id DESC"
            ))?;
            let rows = stmt.query_map(params![marketplace_id], product_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

/// Mark a product deleted. Returns whether an active product was found.
pub async fn soft_delete_product(db: &Database, id: i64) -> Result<bool, MarketdeskError> {
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE products SET status = 'deleted', updated_at = ?1
                 WHERE id = ?2 AND status = 'active'",
                params![now_timestamp(), id],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Non-deleted products with stock strictly below `threshold`, lowest first.
pub async fn low_stock_products(
    db: &Database,
    threshold: i64,
    limit: i64,
) -> Result<Vec<Product>, MarketdeskError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {PRODUCT_COLUMNS} FROM products p
                 WHERE p.status = 'active' AND p.stock < ?1
                 ORDER BY p.stock ASC, p.id ASC
                 LIMIT ?2"
            ))?;
            let rows = stmt.query_map(params![threshold, limit], product_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

/// Number of non-deleted products.
pub async fn count_active_products(db: &Database) -> Result<i64, MarketdeskError> {
    db.connection()
        .call(|conn| {
            conn.query_row(
                "SELECT COUNT(*) FROM products WHERE status = 'active'",
                [],
                |row| row.get(0),
            )
        })
        .await
        .map_err(map_tr_err)
}
