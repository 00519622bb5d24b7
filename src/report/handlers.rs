use super::models::{ReportQuery, build_report};
use super::pdf;
use crate::order::models::{Order, OrderItem, OrderStatus};
use crate::utils::error::{bad_request, internal_error};
use crate::utils::types::Pool;
use axum::{
    extract::{Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use chrono::{Days, NaiveTime};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use std::collections::HashMap;

/// Streams the sales PDF for completed orders in `[start_date, end_date]`,
/// both days inclusive.
pub async fn sales_report(
    State(pool): State<Pool>,
    Query(query): Query<ReportQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    use stone_shop::schema::{order_items, orders, products};

    if query.end_date < query.start_date {
        return Err(bad_request("end_date must not be before start_date"));
    }

    let mut conn = pool.get().await.map_err(internal_error)?;

    let range_start = query.start_date.and_time(NaiveTime::MIN);
    let range_end = (query.end_date + Days::new(1)).and_time(NaiveTime::MIN);

    let completed: Vec<Order> = orders::table
        .filter(orders::status.eq(OrderStatus::Completed.as_str()))
        .filter(orders::order_date.ge(range_start))
        .filter(orders::order_date.lt(range_end))
        .order(orders::order_date.asc())
        .select(Order::as_select())
        .load(&mut conn)
        .await
        .map_err(internal_error)?;

    let order_ids: Vec<i32> = completed.iter().map(|order| order.order_id).collect();
    let item_rows: Vec<(OrderItem, Option<String>)> = if order_ids.is_empty() {
        Vec::new()
    } else {
        order_items::table
            .filter(order_items::order_id.eq_any(&order_ids))
            .left_join(products::table)
            .order(order_items::order_item_id.asc())
            .select((OrderItem::as_select(), products::name.nullable()))
            .load(&mut conn)
            .await
            .map_err(internal_error)?
    };

    let mut items_by_order: HashMap<i32, Vec<(OrderItem, Option<String>)>> = HashMap::new();
    for (item, name) in item_rows {
        items_by_order.entry(item.order_id).or_default().push((item, name));
    }

    let orders_with_items = completed
        .into_iter()
        .map(|order| {
            let items = items_by_order.remove(&order.order_id).unwrap_or_default();
            (order, items)
        })
        .collect();

    let report = build_report(
        query.start_date,
        query.end_date,
        chrono::Local::now().naive_local(),
        orders_with_items,
    );

    let bytes = pdf::render(&report).map_err(internal_error)?;

    let filename = format!(
        "laporan-penjualan-{}-sampai-{}.pdf",
        query.start_date, query.end_date
    );
    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_owned()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        ),
    ];

    Ok((headers, bytes))
}
