use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;

use crate::order::models::{Order, OrderItem};

#[derive(Deserialize, Debug)]
pub struct ReportQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

pub struct ReportItem {
    pub name: String,
    pub quantity: i32,
    pub subtotal: f64,
}

pub struct ReportLine {
    pub order_id: i32,
    pub order_date: NaiveDateTime,
    pub buyer_name: String,
    pub items: Vec<ReportItem>,
    pub total: f64,
}

pub struct SalesReport {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub generated_at: NaiveDateTime,
    pub lines: Vec<ReportLine>,
    pub total_orders: usize,
    pub total_revenue: f64,
}

/// Aggregates completed orders into the report structure. Items arrive with
/// an optional product name; a product deleted since the sale falls back to
/// a placeholder, mirroring the storefront's behavior.
pub fn build_report(
    start_date: NaiveDate,
    end_date: NaiveDate,
    generated_at: NaiveDateTime,
    orders: Vec<(Order, Vec<(OrderItem, Option<String>)>)>,
) -> SalesReport {
    let lines: Vec<ReportLine> = orders
        .into_iter()
        .map(|(order, items)| {
            let items: Vec<ReportItem> = items
                .into_iter()
                .map(|(item, name)| ReportItem {
                    name: name.unwrap_or_else(|| "Produk Dihapus".to_owned()),
                    quantity: item.quantity,
                    subtotal: item.subtotal,
                })
                .collect();
            let total = items.iter().map(|item| item.subtotal).sum();
            ReportLine {
                order_id: order.order_id,
                order_date: order.order_date,
                buyer_name: order.buyer_name,
                items,
                total,
            }
        })
        .collect();

    let total_orders = lines.len();
    let total_revenue = lines.iter().map(|line| line.total).sum();

    SalesReport {
        start_date,
        end_date,
        generated_at,
        lines,
        total_orders,
        total_revenue,
    }
}

/// Rupiah display format: no decimals, dot as the thousands separator.
pub fn format_rupiah(amount: f64) -> String {
    let rounded = amount.round() as i64;
    let (sign, magnitude) = if rounded < 0 {
        ("-", rounded.unsigned_abs())
    } else {
        ("", rounded.unsigned_abs())
    };

    let digits = magnitude.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    format!("Rp {}{}", sign, grouped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn order(id: i32, buyer: &str, day: u32) -> Order {
        Order {
            order_id: id,
            customer_id: None,
            order_code: format!("INV-2025080{}-AAAAA{}", day, id),
            buyer_name: buyer.to_owned(),
            buyer_phone: "0811".to_owned(),
            shipping_address: "Jl. Merdeka No 1, Yogyakarta".to_owned(),
            order_date: NaiveDate::from_ymd_opt(2025, 8, day)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
            status: "completed".to_owned(),
            payment_proof: None,
        }
    }

    fn item(id: i32, order_id: i32, quantity: i32, subtotal: f64) -> OrderItem {
        OrderItem {
            order_item_id: id,
            order_id,
            product_id: id,
            quantity,
            subtotal,
        }
    }

    fn range() -> (NaiveDate, NaiveDate, NaiveDateTime) {
        let start = NaiveDate::from_ymd_opt(2025, 8, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 8, 31).unwrap();
        let generated = end.and_hms_opt(17, 0, 0).unwrap();
        (start, end, generated)
    }

    #[test]
    fn empty_range_builds_a_valid_zero_report() {
        let (start, end, generated) = range();
        let report = build_report(start, end, generated, Vec::new());

        assert_eq!(report.total_orders, 0);
        assert_eq!(report.total_revenue, 0.0);
        assert!(report.lines.is_empty());
    }

    #[test]
    fn totals_sum_over_orders_and_items() {
        let (start, end, generated) = range();
        let orders = vec![
            (
                order(1, "Budi", 2),
                vec![
                    (item(1, 1, 2, 100_000.0), Some("Batu Andesit".to_owned())),
                    (item(2, 1, 1, 30_000.0), Some("Batu Candi".to_owned())),
                ],
            ),
            (
                order(2, "Sari", 5),
                vec![(item(3, 2, 4, 200_000.0), None)],
            ),
        ];

        let report = build_report(start, end, generated, orders);

        assert_eq!(report.total_orders, 2);
        assert_eq!(report.total_revenue, 330_000.0);
        assert_eq!(report.lines[0].total, 130_000.0);
        assert_eq!(report.lines[1].items[0].name, "Produk Dihapus");
    }

    #[test]
    fn rupiah_formatting_groups_thousands() {
        assert_eq!(format_rupiah(0.0), "Rp 0");
        assert_eq!(format_rupiah(950.0), "Rp 950");
        assert_eq!(format_rupiah(50_000.0), "Rp 50.000");
        assert_eq!(format_rupiah(1_250_000.0), "Rp 1.250.000");
        assert_eq!(format_rupiah(-75_500.0), "Rp -75.500");
    }
}
