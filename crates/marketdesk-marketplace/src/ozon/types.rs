// SPDX-FileCopyrightText: 2026 Marketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ozon Seller API request and response types.
//!
//! Only the fields Marketdesk reads are modelled; everything else is ignored.
//! Prices arrive as decimal strings.

use serde::{Deserialize, Deserializer, Serialize};

/// Accept a price given either as a JSON string or a number.
pub fn decimal<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(f64),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(0.0),
        Some(Raw::Number(n)) => Ok(n),
        Some(Raw::Text(s)) if s.trim().is_empty() => Ok(0.0),
        Some(Raw::Text(s)) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

// --- /v3/product/list ---

#[derive(Debug, Serialize)]
pub(crate) struct ProductListRequest<'a> {
    pub filter: ProductListFilter,
    pub last_id: &'a str,
    pub limit: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct ProductListFilter {
    pub visibility: &'static str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProductListResponse {
    pub result: ProductListResult,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProductListResult {
    #[serde(default)]
    pub items: Vec<ProductListItem>,
    #[serde(default)]
    pub last_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProductListItem {
    pub product_id: i64,
}

// --- /v3/product/info/list ---

#[derive(Debug, Serialize)]
pub(crate) struct ProductInfoRequest<'a> {
    pub product_id: &'a [i64],
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProductInfoResponse {
    #[serde(default)]
    pub items: Vec<ProductInfo>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProductInfo {
    pub id: i64,
    pub offer_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "decimal")]
    pub price: f64,
    #[serde(default)]
    pub stocks: Option<ProductStocks>,
    #[serde(default)]
    pub category_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ProductStocks {
    #[serde(default)]
    pub stocks: Vec<StockEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StockEntry {
    #[serde(default)]
    pub present: i64,
}

// --- /v1/product/import/prices and /v2/products/stocks ---

#[derive(Debug, Serialize)]
pub(crate) struct PriceUpdateRequest {
    pub prices: Vec<PriceUpdate>,
}

#[derive(Debug, Serialize)]
pub(crate) struct PriceUpdate {
    pub offer_id: String,
    pub price: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_price: Option<String>,
    pub currency_code: &'static str,
}

#[derive(Debug, Serialize)]
pub(crate) struct StockUpdateRequest {
    pub stocks: Vec<StockUpdate>,
}

#[derive(Debug, Serialize)]
pub(crate) struct StockUpdate {
    pub offer_id: String,
    pub stock: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warehouse_id: Option<i64>,
}

/// Per-offer outcome of a price or stock update.
#[derive(Debug, Deserialize)]
pub(crate) struct UpdateResponse {
    #[serde(default)]
    pub result: Vec<UpdateResult>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UpdateResult {
    #[serde(default)]
    pub offer_id: String,
    #[serde(default)]
    pub updated: bool,
    #[serde(default)]
    pub errors: Vec<UpdateError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UpdateError {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

// --- /v3/posting/fbs/list ---

#[derive(Debug, Serialize)]
pub(crate) struct PostingListRequest<'a> {
    pub dir: &'static str,
    pub filter: PostingFilter<'a>,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct PostingFilter<'a> {
    pub since: &'a str,
    pub to: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PostingListResponse {
    pub result: PostingListResult,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PostingListResult {
    #[serde(default)]
    pub postings: Vec<Posting>,
    #[serde(default)]
    pub has_next: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Posting {
    pub posting_number: String,
    #[serde(default)]
    pub order_id: i64,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub in_process_at: Option<String>,
    #[serde(default)]
    pub shipment_date: Option<String>,
    #[serde(default)]
    pub delivering_date: Option<String>,
    #[serde(default)]
    pub products: Vec<PostingProduct>,
    #[serde(default)]
    pub customer: Option<PostingCustomer>,
    #[serde(default)]
    pub addressee: Option<PostingAddressee>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PostingProduct {
    #[serde(default)]
    pub offer_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default, deserialize_with = "decimal")]
    pub price: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PostingCustomer {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub customer_email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PostingAddressee {
    #[serde(default)]
    pub name: Option<String>,
}

// --- /v4/posting/fbs/ship ---

#[derive(Debug, Serialize)]
pub(crate) struct ShipRequest<'a> {
    pub packages: Vec<ShipPackage>,
    pub posting_number: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct ShipPackage {
    pub products: Vec<ShipProduct>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ShipProduct {
    pub product_id: i64,
    pub quantity: i64,
}

// --- /v3/finance/transaction/list ---

#[derive(Debug, Serialize)]
pub(crate) struct FinanceRequest<'a> {
    pub filter: FinanceFilter<'a>,
    pub page: i64,
    pub page_size: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct FinanceFilter<'a> {
    pub date: FinanceDateRange<'a>,
    pub transaction_type: &'static str,
}

#[derive(Debug, Serialize)]
pub(crate) struct FinanceDateRange<'a> {
    pub from: &'a str,
    pub to: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FinanceResponse {
    pub result: FinanceResult,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FinanceResult {
    #[serde(default)]
    pub operations: Vec<FinanceOperation>,
    #[serde(default)]
    pub page_count: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FinanceOperation {
    pub operation_id: i64,
    #[serde(default)]
    pub operation_type: String,
    #[serde(default)]
    pub operation_date: String,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub posting: Option<FinancePosting>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FinancePosting {
    #[serde(default)]
    pub posting_number: String,
}

// --- /v1/returns/list and /v2/returns/rfbs/receive-return ---

#[derive(Debug, Serialize)]
pub(crate) struct ReturnsRequest {
    pub filter: serde_json::Value,
    pub limit: i64,
    pub last_id: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReturnsResponse {
    #[serde(default)]
    pub returns: Vec<ReturnItem>,
    #[serde(default)]
    pub has_next: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReturnItem {
    pub id: i64,
    #[serde(default)]
    pub posting_number: String,
    #[serde(default)]
    pub product: Option<ReturnProduct>,
    #[serde(default)]
    pub visual: Option<ReturnVisual>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReturnProduct {
    #[serde(default)]
    pub offer_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReturnVisual {
    #[serde(default)]
    pub status: Option<ReturnStatus>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReturnStatus {
    #[serde(default)]
    pub sys_name: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ReceiveReturnRequest {
    pub return_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_info_parses_string_prices_and_stock() {
        let json = r#"{
            "id": 42, "offer_id": "TWS-001", "name": "Earbuds",
            "price": "3490.0000",
            "stocks": {"stocks": [{"present": 5, "source": "fbo"}, {"present": 7, "source": "fbs"}]}
        }"#;
        let info: ProductInfo = serde_json::from_str(json).unwrap();
        assert_eq!(info.price, 3490.0);
        let total: i64 = info.stocks.unwrap().stocks.iter().map(|s| s.present).sum();
        assert_eq!(total, 12);
    }

    #[test]
    fn posting_product_accepts_numeric_price() {
        let p: PostingProduct =
            serde_json::from_str(r#"{"offer_id":"A","name":"a","quantity":2,"price":10.5}"#)
                .unwrap();
        assert_eq!(p.price, 10.5);
        let p: PostingProduct =
            serde_json::from_str(r#"{"offer_id":"A","quantity":1,"price":""}"#).unwrap();
        assert_eq!(p.price, 0.0);
    }

    #[test]
    fn bad_price_string_is_an_error() {
        let result: Result<PostingProduct, _> =
            serde_json::from_str(r#"{"offer_id":"A","quantity":1,"price":"abc"}"#);
        assert!(result.is_err());
    }
}
