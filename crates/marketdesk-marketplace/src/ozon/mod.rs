// SPDX-FileCopyrightText: 2026 Marketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ozon Seller API client.
//!
//! Authenticates with the `Client-Id` and `Api-Key` headers. Product listing
//! pages by `last_id`, postings by offset while `has_next`, finance by page
//! number and returns by `last_id`; every page is one independent request.

mod types;

pub use types::decimal;

use std::time::Duration;

use async_trait::async_trait;
use marketdesk_core::{
    Credentials, FinanceTransaction, MarketdeskError, MarketplaceClient, NormalizedOrder,
    NormalizedOrderItem, NormalizedProduct, OrderStatus, ReturnRecord, ShipmentItem,
    UpstreamFailure, normalize_timestamp, now_timestamp,
};
use reqwest::header::{HeaderMap, HeaderValue};
use tracing::debug;

use crate::http::ApiTransport;
use crate::status::ozon_status;
use types::*;

/// Default Ozon Seller API endpoint.
pub const OZON_BASE_URL: &str = "https://api-seller.ozon.ru";

const PRODUCT_PAGE_SIZE: i64 = 1000;
const INFO_BATCH_SIZE: usize = 1000;
const POSTING_PAGE_SIZE: i64 = 1000;
const FINANCE_PAGE_SIZE: i64 = 1000;
const RETURNS_PAGE_SIZE: i64 = 500;
/// Upper bound on pages fetched per listing, against a cursor that never ends.
const MAX_PAGES: usize = 1000;

/// Client for one Ozon seller account.
#[derive(Debug, Clone)]
pub struct OzonClient {
    transport: ApiTransport,
}

impl OzonClient {
    /// Build a client. `credentials.client_id` is required.
    pub fn new(
        base_url: &str,
        credentials: &Credentials,
        timeout: Duration,
    ) -> Result<Self, MarketdeskError> {
        let client_id = credentials
            .client_id
            .as_deref()
            .ok_or_else(|| MarketdeskError::Config("ozon credentials missing clientId".into()))?;

        let mut headers = HeaderMap::new();
        headers.insert("Client-Id", header_value("Client-Id", client_id)?);
        headers.insert("Api-Key", header_value("Api-Key", &credentials.api_key)?);

        Ok(Self {
            transport: ApiTransport::new("ozon", base_url, headers, timeout)?,
        })
    }

    async fn list_product_ids(&self) -> Result<Vec<i64>, MarketdeskError> {
        let mut ids = Vec::new();
        let mut last_id = String::new();

        for _ in 0..MAX_PAGES {
            let request = ProductListRequest {
                filter: ProductListFilter { visibility: "ALL" },
                last_id: &last_id,
                limit: PRODUCT_PAGE_SIZE,
            };
            let page: ProductListResponse =
                self.transport.post("/v3/product/list", &request).await?;
            let fetched = page.result.items.len();
            ids.extend(page.result.items.into_iter().map(|item| item.product_id));

            let next = page.result.last_id;
            if fetched == 0 || next.is_empty() || next == last_id {
                break;
            }
            last_id = next;
        }
        Ok(ids)
    }
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue, MarketdeskError> {
    HeaderValue::from_str(value.trim())
        .map_err(|e| MarketdeskError::Config(format!("invalid {name} header value: {e}")))
}

fn normalize_product(info: ProductInfo) -> NormalizedProduct {
    let stock = info
        .stocks
        .unwrap_or_default()
        .stocks
        .iter()
        .map(|s| s.present.max(0))
        .sum();
    NormalizedProduct {
        external_id: info.id.to_string(),
        sku: info.offer_id,
        name: info.name,
        price: info.price,
        stock: Some(stock),
        category: info.category_name.filter(|c| !c.is_empty()),
    }
}

fn normalize_posting(posting: Posting) -> NormalizedOrder {
    let status = ozon_status(&posting.status);

    let email = posting
        .customer
        .as_ref()
        .and_then(|c| c.customer_email.clone())
        .filter(|e| !e.trim().is_empty());
    let name = posting
        .customer
        .as_ref()
        .and_then(|c| c.name.clone())
        .or_else(|| posting.addressee.as_ref().and_then(|a| a.name.clone()))
        .filter(|n| !n.trim().is_empty());
    let (customer_name, customer_email) = match email {
        Some(email) => (name.unwrap_or_else(|| email.clone()), email),
        None => (
            name.unwrap_or_else(|| format!("Ozon customer #{}", posting.order_id)),
            synthesized_email(posting.order_id),
        ),
    };

    let items: Vec<NormalizedOrderItem> = posting
        .products
        .into_iter()
        .map(|p| NormalizedOrderItem {
            sku: p.offer_id,
            name: p.name,
            quantity: p.quantity.max(0),
            price: p.price,
        })
        .collect();
    let total_amount = items.iter().map(|i| i.price * i.quantity as f64).sum();

    let shipped_at = match status {
        OrderStatus::Shipped | OrderStatus::Delivered | OrderStatus::Returned => posting
            .shipment_date
            .as_deref()
            .or(posting.delivering_date.as_deref())
            .map(normalize_timestamp),
        _ => None,
    };

    NormalizedOrder {
        order_number: posting.posting_number,
        status,
        customer_name,
        customer_email,
        total_amount,
        items,
        created_at: posting
            .in_process_at
            .as_deref()
            .map(normalize_timestamp)
            .unwrap_or_else(now_timestamp),
        shipped_at,
        fulfillment_type: Some("FBS".to_string()),
    }
}

/// Stable placeholder identity for postings that carry no customer email.
pub fn synthesized_email(order_id: impl std::fmt::Display) -> String {
    format!("ozon_customer_{order_id}@marketplace.com")
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Turn per-offer update results into an error when any offer was rejected.
fn check_update(kind: &str, response: UpdateResponse) -> Result<(), MarketdeskError> {
    let rejected: Vec<String> = response
        .result
        .iter()
        .filter(|r| !r.updated)
        .map(|r| {
            let reasons: Vec<String> = r
                .errors
                .iter()
                .map(|e| format!("{} {}", e.code, e.message).trim().to_string())
                .collect();
            format!("{}: {}", r.offer_id, reasons.join("; "))
        })
        .collect();
    if rejected.is_empty() {
        return Ok(());
    }
    Err(MarketdeskError::integration(
        "ozon",
        UpstreamFailure::InvalidResponse,
        format!("{kind} update rejected for {}", rejected.join(", ")),
    ))
}

#[async_trait]
impl MarketplaceClient for OzonClient {
    fn marketplace(&self) -> &str {
        "ozon"
    }

    async fn fetch_products(&self) -> Result<Vec<NormalizedProduct>, MarketdeskError> {
        let ids = self.list_product_ids().await?;
        let mut products = Vec::with_capacity(ids.len());
        for batch in ids.chunks(INFO_BATCH_SIZE) {
            let info: ProductInfoResponse = self
                .transport
                .post("/v3/product/info/list", &ProductInfoRequest { product_id: batch })
                .await?;
            products.extend(info.items.into_iter().map(normalize_product));
        }
        debug!(count = products.len(), "ozon products fetched");
        Ok(products)
    }

    async fn fetch_orders(
        &self,
        since: &str,
        to: &str,
    ) -> Result<Vec<NormalizedOrder>, MarketdeskError> {
        let mut orders = Vec::new();
        let mut offset = 0;

        for _ in 0..MAX_PAGES {
            let request = PostingListRequest {
                dir: "ASC",
                filter: PostingFilter { since, to },
                limit: POSTING_PAGE_SIZE,
                offset,
            };
            let page: PostingListResponse =
                self.transport.post("/v3/posting/fbs/list", &request).await?;
            let fetched = page.result.postings.len() as i64;
            orders.extend(page.result.postings.into_iter().map(normalize_posting));

            if !page.result.has_next || fetched == 0 {
                break;
            }
            offset += fetched;
        }
        debug!(count = orders.len(), "ozon postings fetched");
        Ok(orders)
    }

    async fn update_price(
        &self,
        offer_id: &str,
        price: f64,
        old_price: Option<f64>,
    ) -> Result<(), MarketdeskError> {
        let request = PriceUpdateRequest {
            prices: vec![PriceUpdate {
                offer_id: offer_id.to_string(),
                price: format!("{price:.2}"),
                old_price: old_price.map(|p| format!("{p:.2}")),
                currency_code: "RUB",
            }],
        };
        let response: UpdateResponse = self
            .transport
            .post("/v1/product/import/prices", &request)
            .await?;
        check_update("price", response)
    }

    async fn update_stock(
        &self,
        offer_id: &str,
        stock: i64,
        warehouse_id: Option<i64>,
    ) -> Result<(), MarketdeskError> {
        let request = StockUpdateRequest {
            stocks: vec![StockUpdate {
                offer_id: offer_id.to_string(),
                stock,
                warehouse_id,
            }],
        };
        let response: UpdateResponse = self.transport.post("/v2/products/stocks", &request).await?;
        check_update("stock", response)
    }

    async fn fetch_finance_transactions(
        &self,
        from: &str,
        to: &str,
    ) -> Result<Vec<FinanceTransaction>, MarketdeskError> {
        let mut transactions = Vec::new();
        let mut page = 1;

        loop {
            let request = FinanceRequest {
                filter: FinanceFilter {
                    date: FinanceDateRange { from, to },
                    transaction_type: "all",
                },
                page,
                page_size: FINANCE_PAGE_SIZE,
            };
            let response: FinanceResponse = self
                .transport
                .post("/v3/finance/transaction/list", &request)
                .await?;
            transactions.extend(response.result.operations.into_iter().map(|op| {
                FinanceTransaction {
                    operation_id: op.operation_id.to_string(),
                    operation_type: op.operation_type,
                    operation_date: op.operation_date,
                    amount: op.amount,
                    posting_number: op
                        .posting
                        .map(|p| p.posting_number)
                        .filter(|n| !n.is_empty()),
                }
            }));

            if page >= response.result.page_count || page as usize >= MAX_PAGES {
                break;
            }
            page += 1;
        }
        Ok(transactions)
    }

    async fn fetch_returns(&self) -> Result<Vec<ReturnRecord>, MarketdeskError> {
        let mut records = Vec::new();
        let mut last_id = 0;

        for _ in 0..MAX_PAGES {
            let request = ReturnsRequest {
                filter: serde_json::json!({}),
                limit: RETURNS_PAGE_SIZE,
                last_id,
            };
            let response: ReturnsResponse = self.transport.post("/v1/returns/list", &request).await?;
            let next = response.returns.last().map(|r| r.id);
            records.extend(response.returns.into_iter().map(|r| {
                let product = r.product;
                ReturnRecord {
                    return_id: r.id.to_string(),
                    posting_number: non_empty(r.posting_number),
                    sku: product.as_ref().and_then(|p| non_empty(p.offer_id.clone())),
                    product_name: product.as_ref().and_then(|p| non_empty(p.name.clone())),
                    quantity: product.as_ref().map(|p| p.quantity).unwrap_or(1),
                    status: r
                        .visual
                        .and_then(|v| v.status)
                        .map(|s| s.sys_name)
                        .unwrap_or_default(),
                }
            }));

            match next {
                Some(id) if response.has_next && id != last_id => last_id = id,
                _ => break,
            }
        }
        Ok(records)
    }

    async fn accept_return(&self, return_id: &str) -> Result<(), MarketdeskError> {
        let return_id: i64 = return_id.trim().parse().map_err(|_| {
            MarketdeskError::Validation(format!("ozon return id `{return_id}` must be numeric"))
        })?;
        let _: serde_json::Value = self
            .transport
            .post(
                "/v2/returns/rfbs/receive-return",
                &ReceiveReturnRequest { return_id },
            )
            .await?;
        Ok(())
    }

    async fn ship_posting(
        &self,
        posting_number: &str,
        items: &[ShipmentItem],
    ) -> Result<(), MarketdeskError> {
        if items.is_empty() {
            return Err(MarketdeskError::Validation(
                "shipment needs at least one item".to_string(),
            ));
        }
        let request = ShipRequest {
            packages: vec![ShipPackage {
                products: items
                    .iter()
                    .map(|i| ShipProduct {
                        product_id: i.product_id,
                        quantity: i.quantity,
                    })
                    .collect(),
            }],
            posting_number,
        };
        let _: serde_json::Value = self.transport.post("/v4/posting/fbs/ship", &request).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn posting(json: serde_json::Value) -> Posting {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn posting_without_email_gets_synthesized_identity() {
        let order = normalize_posting(posting(serde_json::json!({
            "posting_number": "0001-1",
            "order_id": 777,
            "status": "delivering",
            "in_process_at": "2026-03-01T10:00:00Z",
            "shipment_date": "2026-03-02T09:00:00Z",
            "products": [
                {"offer_id": "TWS-001", "name": "Earbuds", "quantity": 2, "price": "1000.00"},
                {"offer_id": "PB-20K", "name": "Powerbank", "quantity": 1, "price": "500"}
            ],
            "customer": null
        })));
        assert_eq!(order.customer_email, "ozon_customer_777@marketplace.com");
        assert_eq!(order.status, OrderStatus::Shipped);
        assert_eq!(order.total_amount, 2500.0);
        assert_eq!(order.items_count(), 3);
        assert_eq!(order.created_at, "2026-03-01T10:00:00.000Z");
        assert_eq!(order.shipped_at.as_deref(), Some("2026-03-02T09:00:00.000Z"));
    }

    #[test]
    fn posting_customer_email_is_used() {
        let order = normalize_posting(posting(serde_json::json!({
            "posting_number": "0002-1",
            "order_id": 1,
            "status": "awaiting_packaging",
            "customer": {"name": "Anna", "customer_email": "anna@example.com"}
        })));
        assert_eq!(order.customer_email, "anna@example.com");
        assert_eq!(order.customer_name, "Anna");
        assert_eq!(order.status, OrderStatus::New);
        assert!(order.shipped_at.is_none());
    }

    #[test]
    fn rejected_update_surfaces_reasons() {
        let response: UpdateResponse = serde_json::from_value(serde_json::json!({
            "result": [{"offer_id": "A", "updated": false,
                        "errors": [{"code": "NOT_FOUND", "message": "offer not found"}]}]
        }))
        .unwrap();
        let err = check_update("price", response).unwrap_err();
        assert!(err.to_string().contains("offer not found"));
    }

    #[test]
    fn client_requires_client_id() {
        let creds = Credentials {
            api_key: "k".into(),
            client_id: None,
            seller_id: None,
        };
        assert!(OzonClient::new(OZON_BASE_URL, &creds, Duration::from_secs(5)).is_err());
    }
}
