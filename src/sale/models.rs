use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::Validate;

use crate::order::models::{Order, OrderStatus};
use crate::storage;

/// Independent, AND-composed list filters. `search` substring-matches the
/// order code or buyer name, `status` matches exactly, `date` matches the
/// calendar day of the order date.
#[derive(Deserialize, Debug, Default)]
pub struct OrderFilter {
    pub search: Option<String>,
    pub status: Option<String>,
    pub date: Option<NaiveDate>,
    pub offset: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Deserialize, Serialize, Validate)]
pub struct OrderItemInput {
    pub product_id: i32,
    #[validate(range(min = 1))]
    pub quantity: i32,
}

/// Admin create/edit form. Unlike buyer checkout, the item subtotals are
/// recomputed from the current product price at save time; this
/// re-snapshot asymmetry is intentional.
#[derive(Deserialize, Validate)]
pub struct SaveOrderPayload {
    #[serde(default)]
    pub customer_id: Option<i32>,
    /// Left blank on create, a default `ORD-` code is generated.
    #[serde(default)]
    pub order_code: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub buyer_name: String,
    #[validate(length(min = 1, max = 20))]
    pub buyer_phone: String,
    #[validate(length(min = 1))]
    pub shipping_address: String,
    pub order_date: NaiveDateTime,
    pub status: String,
    #[validate(length(min = 1), nested)]
    pub items: Vec<OrderItemInput>,
}

#[derive(Serialize)]
pub struct AdminOrderItemView {
    pub order_item_id: i32,
    pub product_id: i32,
    pub product_name: Option<String>,
    pub quantity: i32,
    pub subtotal: f64,
}

#[derive(Serialize)]
pub struct AdminOrderView {
    #[serde(flatten)]
    pub order: Order,
    pub status_label: String,
    pub payment_proof_url: Option<String>,
    pub total: f64,
    pub items: Vec<AdminOrderItemView>,
}

impl AdminOrderView {
    pub fn assemble(order: Order, items: Vec<AdminOrderItemView>) -> Self {
        let status_label = OrderStatus::parse(&order.status)
            .map(|s| s.label().to_owned())
            .unwrap_or_else(|| order.status.clone());
        let payment_proof_url = order.payment_proof.as_deref().map(storage::public_url);
        let total = items.iter().map(|item| item.subtotal).sum();
        AdminOrderView {
            order,
            status_label,
            payment_proof_url,
            total,
            items,
        }
    }
}

/// Recomputes each line's subtotal from the current product price. Returns
/// `(product_id, quantity, subtotal)` tuples, or the first product id that
/// no longer exists.
pub fn price_items(
    prices: &HashMap<i32, f64>,
    items: &[OrderItemInput],
) -> Result<Vec<(i32, i32, f64)>, i32> {
    items
        .iter()
        .map(|item| {
            let price = prices.get(&item.product_id).ok_or(item.product_id)?;
            Ok((
                item.product_id,
                item.quantity,
                price * f64::from(item.quantity),
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_items_resnapshots_from_current_prices() {
        let prices = HashMap::from([(1, 60_000.0), (2, 25_000.0)]);
        let items = vec![
            OrderItemInput { product_id: 1, quantity: 2 },
            OrderItemInput { product_id: 2, quantity: 3 },
        ];

        let priced = price_items(&prices, &items).unwrap();
        assert_eq!(priced, vec![(1, 2, 120_000.0), (2, 3, 75_000.0)]);
    }

    #[test]
    fn price_items_reports_missing_product() {
        let prices = HashMap::from([(1, 60_000.0)]);
        let items = vec![OrderItemInput { product_id: 9, quantity: 1 }];

        assert_eq!(price_items(&prices, &items), Err(9));
    }

    #[test]
    fn view_total_is_sum_of_item_subtotals() {
        let order = Order {
            order_id: 1,
            customer_id: None,
            order_code: "ORD-ABCD1234".to_owned(),
            buyer_name: "Budi".to_owned(),
            buyer_phone: "0811".to_owned(),
            shipping_address: "Jl. Merdeka No 1, Yogyakarta".to_owned(),
            order_date: chrono::NaiveDate::from_ymd_opt(2025, 8, 19)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap(),
            status: "diproses".to_owned(),
            payment_proof: Some("proofs/x.jpg".to_owned()),
        };
        let items = vec![
            AdminOrderItemView {
                order_item_id: 1,
                product_id: 1,
                product_name: Some("Batu Andesit".to_owned()),
                quantity: 2,
                subtotal: 100_000.0,
            },
            AdminOrderItemView {
                order_item_id: 2,
                product_id: 2,
                product_name: None,
                quantity: 1,
                subtotal: 25_000.0,
            },
        ];

        let view = AdminOrderView::assemble(order, items);
        assert_eq!(view.total, 125_000.0);
        // legacy Indonesian storage value still maps to a label
        assert_eq!(view.status_label, "Diproses");
        assert_eq!(
            view.payment_proof_url.as_deref(),
            Some("/storage/proofs/x.jpg")
        );
    }
}
