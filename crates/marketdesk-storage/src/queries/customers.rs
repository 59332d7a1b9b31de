// SPDX-FileCopyrightText: 2026 Marketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Customer operations.

use marketdesk_core::{MarketdeskError, now_timestamp};
use rusqlite::params;

use crate::database::{Database, map_tr_err};
use crate::models::Customer;

/// Return the id of the customer with this email, creating it if absent.
pub async fn find_or_create(
    db: &Database,
    name: &str,
    email: &str,
) -> Result<i64, MarketdeskError> {
    let name = name.to_string();
    let email = email.trim().to_lowercase();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO customers (name, email, status) VALUES (?1, ?2, 'active')
                 ON CONFLICT(email) DO NOTHING",
                params![name, email],
            )?;
            conn.query_row(
                "SELECT id FROM customers WHERE email = ?1",
                params![email],
                |row| row.get(0),
            )
        })
        .await
        .map_err(map_tr_err)
}

/// All customers, biggest spenders first.
pub async fn list_customers(db: &Database, limit: i64) -> Result<Vec<Customer>, MarketdeskError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, email, phone, status, total_spent, total_orders, created_at
                 FROM customers
                 ORDER BY total_spent DESC, id ASC
                 LIMIT ?1",
            )?;
            let rows = stmt.query_map(params![limit], |row| {
                Ok(Customer {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    email: row.get(2)?,
                    phone: row.get(3)?,
                    status: row.get(4)?,
                    total_spent: row.get(5)?,
                    total_orders: row.get(6)?,
                    created_at: row.get(7)?,
                })
            })?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

/// Recompute lifetime totals for every customer with an order on the
/// marketplace. Cancelled and returned orders count toward `total_orders`
/// but not toward `total_spent`.
///
/// Returns the number of customers updated.
pub async fn reconcile_for_marketplace(
    db: &Database,
    marketplace_id: i64,
) -> Result<usize, MarketdeskError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE customers SET
                     total_spent = (
                         SELECT COALESCE(SUM(o.total_amount), 0.0) FROM orders o
                         WHERE o.customer_id = customers.id
                           AND o.status NOT IN ('cancelled', 'returned')),
                     total_orders = (
                         SELECT COUNT(*) FROM orders o WHERE o.customer_id = customers.id),
                     updated_at = ?2
                 WHERE id IN (
                     SELECT DISTINCT customer_id FROM orders
                     WHERE marketplace_id = ?1 AND customer_id IS NOT NULL)",
                params![marketplace_id, now_timestamp()],
            )
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewOrder;
    use crate::queries::orders;
    use marketdesk_core::OrderStatus;

    async fn order(db: &Database, number: &str, customer: i64, status: OrderStatus, total: f64) {
        let new = NewOrder {
            order_number: number.to_string(),
            customer_id: Some(customer),
            marketplace_id: Some(1),
            status,
            fulfillment_type: None,
            total_amount: total,
            items_count: 1,
            shipping_address: None,
            created_at: now_timestamp(),
            shipped_at: None,
        };
        orders::insert_order(db, &new, &[]).await.unwrap();
    }

    #[tokio::test]
    async fn find_or_create_is_keyed_on_email() {
        let db = Database::open_in_memory().await.unwrap();
        let a = find_or_create(&db, "Anna", "anna@example.com").await.unwrap();
        let b = find_or_create(&db, "Anna K.", "Anna@Example.com ").await.unwrap();
        assert_eq!(a, b);
        assert_eq!(list_customers(&db, 10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn reconcile_excludes_cancelled_and_returned_from_spend() {
        let db = Database::open_in_memory().await.unwrap();
        let anna = find_or_create(&db, "Anna", "anna@example.com").await.unwrap();
        let boris = find_or_create(&db, "Boris", "boris@example.com").await.unwrap();
        order(&db, "1", anna, OrderStatus::Delivered, 100.0).await;
        order(&db, "2", anna, OrderStatus::Cancelled, 50.0).await;
        order(&db, "3", anna, OrderStatus::Returned, 25.0).await;
        order(&db, "4", boris, OrderStatus::New, 300.0).await;

        let touched = reconcile_for_marketplace(&db, 1).await.unwrap();
        assert_eq!(touched, 2);

        let customers = list_customers(&db, 10).await.unwrap();
        assert_eq!(customers[0].email, "boris@example.com");
        assert_eq!(customers[0].total_spent, 300.0);
        assert_eq!(customers[1].total_spent, 100.0);
        assert_eq!(customers[1].total_orders, 3);

        assert_eq!(reconcile_for_marketplace(&db, 2).await.unwrap(), 0);
    }
}
