use chrono::NaiveDateTime;
use diesel::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use stone_shop::schema::{order_items, orders};
use validator::Validate;

use crate::cart::models::Cart;
use crate::product::models::Product;

/// Canonical order lifecycle. Storage values are the lowercase English
/// names; the buyer-facing UI shows the Indonesian labels, and parsing
/// accepts either vocabulary since the legacy data mixed them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Buyer-facing Indonesian label.
    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Processing => "Diproses",
            OrderStatus::Shipped => "Dikirim",
            OrderStatus::Completed => "Selesai",
            OrderStatus::Cancelled => "Dibatalkan",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(OrderStatus::Pending),
            "processing" | "diproses" => Some(OrderStatus::Processing),
            "shipped" | "dikirim" => Some(OrderStatus::Shipped),
            "completed" | "selesai" => Some(OrderStatus::Completed),
            "cancelled" | "dibatalkan" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Queryable, Selectable, Debug, Clone, PartialEq, Identifiable, Serialize)]
#[diesel(table_name=orders)]
#[diesel(primary_key(order_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Order {
    pub order_id: i32,
    pub customer_id: Option<i32>,
    pub order_code: String,
    pub buyer_name: String,
    pub buyer_phone: String,
    pub shipping_address: String,
    pub order_date: NaiveDateTime,
    pub status: String,
    pub payment_proof: Option<String>,
}

#[derive(Insertable, Clone)]
#[diesel(table_name = orders)]
pub struct NewOrder {
    pub customer_id: Option<i32>,
    pub order_code: String,
    pub buyer_name: String,
    pub buyer_phone: String,
    pub shipping_address: String,
    pub order_date: NaiveDateTime,
    pub status: String,
}

#[derive(Queryable, Selectable, Debug, Clone, PartialEq, Identifiable, Associations, Serialize)]
#[diesel(table_name=order_items)]
#[diesel(primary_key(order_item_id))]
#[diesel(belongs_to(Order, foreign_key = order_id))]
#[diesel(belongs_to(Product, foreign_key = product_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderItem {
    pub order_item_id: i32,
    pub order_id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub subtotal: f64,
}

#[derive(Insertable, Clone)]
#[diesel(table_name = order_items)]
pub struct NewOrderItem {
    pub order_id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub subtotal: f64,
}

/// Checkout payload: the client's cart snapshot plus buyer details.
#[derive(Deserialize, Validate)]
pub struct CreateOrderPayload {
    #[serde(default)]
    pub customer_id: Option<i32>,
    #[validate(length(min = 1, max = 255, message = "buyer name is required"))]
    pub buyer_name: String,
    #[validate(length(min = 1, max = 20, message = "buyer phone is required"))]
    pub buyer_phone: String,
    #[validate(length(min = 10, message = "shipping address must be at least 10 characters"))]
    pub shipping_address: String,
    #[validate(nested)]
    pub items: Cart,
}

#[derive(Serialize)]
pub struct OrderCreated {
    pub order_code: String,
}

/// Status lookup result for guests; the order code is the only handle they
/// hold.
#[derive(Serialize)]
pub struct OrderStatusView {
    pub order_code: String,
    pub status: String,
    pub status_label: String,
    pub order_date: NaiveDateTime,
    pub total: f64,
}

impl OrderStatusView {
    pub fn from_order(order: &Order, total: f64) -> Self {
        let status_label = OrderStatus::parse(&order.status)
            .map(|s| s.label().to_owned())
            .unwrap_or_else(|| order.status.clone());
        OrderStatusView {
            order_code: order.order_code.clone(),
            status: order.status.clone(),
            status_label,
            order_date: order.order_date,
            total,
        }
    }
}

const CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

fn random_suffix(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| CODE_CHARSET[rng.gen_range(0..CODE_CHARSET.len())] as char)
        .collect()
}

/// Buyer checkout code: `INV-YYYYMMDD-` plus six random characters.
/// Uniqueness is ultimately enforced by the database; callers re-derive the
/// code and retry on a collision.
pub fn generate_order_code(now: NaiveDateTime) -> String {
    format!("INV-{}-{}", now.format("%Y%m%d"), random_suffix(6))
}

/// Default code for admin-created orders: `ORD-` plus eight random
/// characters.
pub fn generate_admin_order_code() -> String {
    format!("ORD-{}", random_suffix(8))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::HashSet;

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 8, 19)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn order_code_has_invoice_format() {
        let code = generate_order_code(noon());
        assert!(code.starts_with("INV-20250819-"));
        assert_eq!(code.len(), "INV-20250819-".len() + 6);
        let suffix = &code["INV-20250819-".len()..];
        assert!(suffix.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn order_codes_are_collision_resistant() {
        let codes: HashSet<String> = (0..500).map(|_| generate_order_code(noon())).collect();
        assert_eq!(codes.len(), 500);
    }

    #[test]
    fn admin_order_code_format() {
        let code = generate_admin_order_code();
        assert!(code.starts_with("ORD-"));
        assert_eq!(code.len(), 12);
    }

    #[test]
    fn status_parses_both_vocabularies_case_insensitively() {
        assert_eq!(OrderStatus::parse("pending"), Some(OrderStatus::Pending));
        assert_eq!(OrderStatus::parse("Diproses"), Some(OrderStatus::Processing));
        assert_eq!(OrderStatus::parse("processing"), Some(OrderStatus::Processing));
        assert_eq!(OrderStatus::parse("DIKIRIM"), Some(OrderStatus::Shipped));
        assert_eq!(OrderStatus::parse("selesai"), Some(OrderStatus::Completed));
        assert_eq!(OrderStatus::parse("Cancelled"), Some(OrderStatus::Cancelled));
        assert_eq!(OrderStatus::parse("dibatalkan"), Some(OrderStatus::Cancelled));
        assert_eq!(OrderStatus::parse("unknown"), None);
    }

    #[test]
    fn status_storage_value_is_canonical_english() {
        for status in OrderStatus::ALL {
            assert_eq!(OrderStatus::parse(status.as_str()), Some(status));
            assert!(status.as_str().chars().all(|c| c.is_ascii_lowercase()));
        }
    }

    #[test]
    fn status_labels_are_localized() {
        assert_eq!(OrderStatus::Processing.label(), "Diproses");
        assert_eq!(OrderStatus::Shipped.label(), "Dikirim");
        assert_eq!(OrderStatus::Completed.label(), "Selesai");
    }

    #[test]
    fn checkout_payload_rejects_short_address() {
        let payload: CreateOrderPayload = serde_json::from_str(
            r#"{"buyer_name":"Budi","buyer_phone":"0811","shipping_address":"short","items":[{"id":1,"name":"Batu","price":50000.0,"quantity":2}]}"#,
        )
        .unwrap();
        let err = payload.validate().unwrap_err();
        assert!(err.field_errors().contains_key("shipping_address"));
    }

    #[test]
    fn checkout_payload_rejects_zero_quantity() {
        let payload: CreateOrderPayload = serde_json::from_str(
            r#"{"buyer_name":"Budi","buyer_phone":"0811","shipping_address":"Jl. Merdeka No 1, Yogyakarta","items":[{"id":1,"name":"Batu","price":50000.0,"quantity":0}]}"#,
        )
        .unwrap();
        assert!(payload.validate().is_err());
    }

    #[test]
    fn checkout_payload_accepts_valid_input() {
        let payload: CreateOrderPayload = serde_json::from_str(
            r#"{"buyer_name":"Budi","buyer_phone":"0811","shipping_address":"Jl. Merdeka No 1, Yogyakarta","items":[{"id":1,"name":"Batu","price":50000.0,"quantity":2}]}"#,
        )
        .unwrap();
        assert!(payload.validate().is_ok());
        assert_eq!(payload.items.subtotal(), 100_000.0);
    }
}
