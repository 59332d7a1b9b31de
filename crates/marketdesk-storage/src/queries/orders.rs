// SPDX-FileCopyrightText: 2026 Marketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Order and order item operations.

use marketdesk_core::{MarketdeskError, OrderStatus, now_timestamp};
use rusqlite::{OptionalExtension, params};

use crate::database::{Database, map_tr_err};
use crate::models::{NewOrder, NewOrderItem, Order, OrderFilter, parse_column};

const ORDER_SELECT: &str = "SELECT o.id, o.order_number, o.customer_id, c.name, c.email,
            o.marketplace_id, m.name, o.status, o.fulfillment_type, o.total_amount,
            o.items_count, o.shipping_address, o.created_at, o.shipped_at, o.updated_at
     FROM orders o
     LEFT JOIN customers c ON c.id = o.customer_id
     LEFT JOIN marketplaces m ON m.id = o.marketplace_id";

fn order_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Order> {
    Ok(Order {
        id: row.get(0)?,
        order_number: row.get(1)?,
        customer_id: row.get(2)?,
        customer_name: row.get(3)?,
        customer_email: row.get(4)?,
        marketplace_id: row.get(5)?,
        marketplace_name: row.get(6)?,
        status: parse_column(7, row.get(7)?)?,
        fulfillment_type: row.get(8)?,
        total_amount: row.get(9)?,
        items_count: row.get(10)?,
        shipping_address: row.get(11)?,
        created_at: row.get(12)?,
        shipped_at: row.get(13)?,
        updated_at: row.get(14)?,
    })
}

/// Insert an order and its items in one transaction, returning the order id.
///
/// Each item is linked to the local product with the same sku, if any.
pub async fn insert_order(
    db: &Database,
    order: &NewOrder,
    items: &[NewOrderItem],
) -> Result<i64, MarketdeskError> {
    let order = order.clone();
    let items = items.to_vec();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO orders (order_number, customer_id, marketplace_id, status,
                     fulfillment_type, total_amount, items_count, shipping_address,
                     created_at, shipped_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    order.order_number,
                    order.customer_id,
                    order.marketplace_id,
                    order.status.to_string(),
                    order.fulfillment_type,
                    order.total_amount.max(0.0),
                    order.items_count,
                    order.shipping_address,
                    order.created_at,
                    order.shipped_at,
                    now_timestamp(),
                ],
            )?;
            let order_id = tx.last_insert_rowid();
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO order_items (order_id, product_id, sku, name, quantity, price)
                     VALUES (?1, (SELECT id FROM products WHERE sku = ?2), ?2, ?3, ?4, ?5)",
                )?;
                for item in &items {
                    stmt.execute(params![
                        order_id,
                        item.sku,
                        item.name,
                        item.quantity,
                        item.price
                    ])?;
                }
            }
            tx.commit()?;
            Ok(order_id)
        })
        .await
        .map_err(map_tr_err)
}

pub async fn get_order(db: &Database, id: i64) -> Result<Option<Order>, MarketdeskError> {
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!("{ORDER_SELECT} WHERE o.id = ?1"),
                params![id],
                order_from_row,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

pub async fn get_order_by_number(
    db: &Database,
    order_number: &str,
) -> Result<Option<Order>, MarketdeskError> {
    let order_number = order_number.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!("{ORDER_SELECT} WHERE o.order_number = ?1"),
                params![order_number],
                order_from_row,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Orders newest first, filtered by status and marketplace.
pub async fn list_orders(db: &Database, filter: &OrderFilter) -> Result<Vec<Order>, MarketdeskError> {
    let status = filter.status.map(|s| s.to_string());
    let marketplace_id = filter.marketplace_id;
    let limit = filter.limit;
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "{ORDER_SELECT}
                 WHERE (?1 IS NULL OR o.status = ?1)
                   AND (?2 IS NULL OR o.marketplace_id = ?2)
                 ORDER BY o.created_at DESC, o.id DESC
                 LIMIT ?3"
            ))?;
            let rows = stmt.query_map(params![status, marketplace_id, limit], order_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

/// Overwrite the figures of an order seen again during sync.
///
/// `status` is written as given; callers check the transition first.
pub async fn update_synced_order(
    db: &Database,
    id: i64,
    status: OrderStatus,
    total_amount: f64,
    items_count: i64,
    shipped_at: Option<String>,
) -> Result<(), MarketdeskError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE orders SET status = ?1, total_amount = ?2, items_count = ?3,
                     shipped_at = COALESCE(?4, shipped_at), updated_at = ?5
                 WHERE id = ?6",
                params![
                    status.to_string(),
                    total_amount.max(0.0),
                    items_count,
                    shipped_at,
                    now_timestamp(),
                    id
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Set an order's status, stamping `shipped_at` the first time it ships.
pub async fn set_order_status(
    db: &Database,
    id: i64,
    status: OrderStatus,
) -> Result<(), MarketdeskError> {
    db.connection()
        .call(move |conn| {
            let now = now_timestamp();
            conn.execute(
                "UPDATE orders SET status = ?1, updated_at = ?2,
                     shipped_at = CASE WHEN ?1 = 'shipped' AND shipped_at IS NULL
                                       THEN ?2 ELSE shipped_at END
                 WHERE id = ?3",
                params![status.to_string(), now, id],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Total order count and revenue over all time.
pub async fn order_totals(db: &Database) -> Result<(i64, f64), MarketdeskError> {
    db.connection()
        .call(|conn| {
            conn.query_row(
                "SELECT COUNT(*), COALESCE(SUM(total_amount), 0.0) FROM orders",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::customers;

    fn new_order(number: &str, created_at: &str) -> NewOrder {
        NewOrder {
            order_number: number.to_string(),
            customer_id: None,
            marketplace_id: Some(1),
            status: OrderStatus::New,
            fulfillment_type: Some("FBS".to_string()),
            total_amount: 250.0,
            items_count: 2,
            shipping_address: None,
            created_at: created_at.to_string(),
            shipped_at: None,
        }
    }

    #[tokio::test]
    async fn insert_links_items_and_customer() {
        let db = Database::open_in_memory().await.unwrap();
        let customer_id = customers::find_or_create(&db, "Ivan", "ivan@example.com")
            .await
            .unwrap();
        let mut order = new_order("ORD-1", "2026-03-01T10:00:00.000Z");
        order.customer_id = Some(customer_id);
        let items = vec![NewOrderItem {
            sku: "UNKNOWN".to_string(),
            name: "Mystery".to_string(),
            quantity: 2,
            price: 125.0,
        }];

        let id = insert_order(&db, &order, &items).await.unwrap();
        let stored = get_order(&db, id).await.unwrap().unwrap();
        assert_eq!(stored.customer_email.as_deref(), Some("ivan@example.com"));
        assert_eq!(stored.marketplace_name.as_deref(), Some("Ozon"));
        assert_eq!(stored.status, OrderStatus::New);

        let item_product: Option<i64> = db
            .connection()
            .call(move |conn| {
                conn.query_row(
                    "SELECT product_id FROM order_items WHERE order_id = ?1",
                    params![id],
                    |row| row.get(0),
                )
            })
            .await
            .unwrap();
        assert_eq!(item_product, None);
    }

    #[tokio::test]
    async fn duplicate_order_number_rejected() {
        let db = Database::open_in_memory().await.unwrap();
        let order = new_order("ORD-2", "2026-03-01T10:00:00.000Z");
        insert_order(&db, &order, &[]).await.unwrap();
        assert!(insert_order(&db, &order, &[]).await.is_err());
    }

    #[tokio::test]
    async fn list_filters_and_orders_newest_first() {
        let db = Database::open_in_memory().await.unwrap();
        insert_order(&db, &new_order("A", "2026-03-01T10:00:00.000Z"), &[])
            .await
            .unwrap();
        let b = insert_order(&db, &new_order("B", "2026-03-02T10:00:00.000Z"), &[])
            .await
            .unwrap();
        let mut wb = new_order("C", "2026-03-03T10:00:00.000Z");
        wb.marketplace_id = Some(2);
        insert_order(&db, &wb, &[]).await.unwrap();
        set_order_status(&db, b, OrderStatus::Shipped).await.unwrap();

        let all = list_orders(
            &db,
            &OrderFilter {
                limit: 100,
                ..Default::default()
            },
        )
        .await
        .unwrap();
        let numbers: Vec<_> = all.iter().map(|o| o.order_number.as_str()).collect();
        assert_eq!(numbers, vec!["C", "B", "A"]);

        let shipped = list_orders(
            &db,
            &OrderFilter {
                status: Some(OrderStatus::Shipped),
                marketplace_id: Some(1),
                limit: 100,
            },
        )
        .await
        .unwrap();
        assert_eq!(shipped.len(), 1);
        assert!(shipped[0].shipped_at.is_some());
    }

    #[tokio::test]
    async fn synced_update_keeps_existing_ship_date() {
        let db = Database::open_in_memory().await.unwrap();
        let id = insert_order(&db, &new_order("D", "2026-03-01T10:00:00.000Z"), &[])
            .await
            .unwrap();
        set_order_status(&db, id, OrderStatus::Shipped).await.unwrap();
        let shipped_at = get_order(&db, id).await.unwrap().unwrap().shipped_at;

        update_synced_order(&db, id, OrderStatus::Delivered, 300.0, 3, None)
            .await
            .unwrap();
        let order = get_order_by_number(&db, "D").await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Delivered);
        assert_eq!(order.total_amount, 300.0);
        assert_eq!(order.shipped_at, shipped_at);

        let (count, revenue) = order_totals(&db).await.unwrap();
        assert_eq!(count, 1);
        assert_eq!(revenue, 300.0);
    }
}
