use super::models::{
    AdminOrderItemView, AdminOrderView, OrderFilter, SaveOrderPayload, price_items,
};
use crate::order::models::{NewOrder, NewOrderItem, Order, OrderItem, OrderStatus,
    generate_admin_order_code};
use crate::storage;
use crate::utils::error::{bad_request, conflict, internal_error, not_found};
use crate::utils::extract::ValidatedJson;
use crate::utils::types::Pool;
use axum::{
    extract::{Json, Multipart, Path, Query, State},
    http::StatusCode,
};
use chrono::{Days, NaiveTime};
use diesel::prelude::*;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use std::collections::HashMap;

pub async fn get_orders(
    State(pool): State<Pool>,
    Query(filter): Query<OrderFilter>,
) -> Result<Json<Vec<AdminOrderView>>, (StatusCode, String)> {
    use stone_shop::schema::orders;

    let mut conn = pool.get().await.map_err(internal_error)?;

    let mut query = orders::table.select(Order::as_select()).into_boxed();

    if let Some(search) = filter.search.filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        query = query.filter(
            orders::order_code
                .ilike(pattern.clone())
                .or(orders::buyer_name.ilike(pattern)),
        );
    }
    if let Some(status) = filter.status.filter(|s| !s.is_empty()) {
        let status = OrderStatus::parse(&status)
            .ok_or_else(|| bad_request("unknown status filter"))?;
        query = query.filter(orders::status.eq(status.as_str().to_owned()));
    }
    if let Some(date) = filter.date {
        let start = date.and_time(NaiveTime::MIN);
        let end = (date + Days::new(1)).and_time(NaiveTime::MIN);
        query = query
            .filter(orders::order_date.ge(start))
            .filter(orders::order_date.lt(end));
    }

    let order_rows: Vec<Order> = query
        .order(orders::order_date.desc())
        .offset(filter.offset.unwrap_or(0))
        .limit(filter.limit.unwrap_or(10))
        .load(&mut conn)
        .await
        .map_err(internal_error)?;

    let mut items_by_order = load_items(&mut conn, &order_rows).await?;

    let res = order_rows
        .into_iter()
        .map(|order| {
            let items = items_by_order.remove(&order.order_id).unwrap_or_default();
            AdminOrderView::assemble(order, items)
        })
        .collect();

    Ok(Json(res))
}

pub async fn get_order_by_id(
    State(pool): State<Pool>,
    Path(id): Path<i32>,
) -> Result<Json<AdminOrderView>, (StatusCode, String)> {
    use stone_shop::schema::orders;

    let mut conn = pool.get().await.map_err(internal_error)?;

    let order: Order = orders::table
        .find(id)
        .select(Order::as_select())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(internal_error)?
        .ok_or_else(|| not_found("order not found"))?;

    let rows = std::slice::from_ref(&order);
    let mut items_by_order = load_items(&mut conn, rows).await?;
    let items = items_by_order.remove(&order.order_id).unwrap_or_default();

    Ok(Json(AdminOrderView::assemble(order, items)))
}

pub async fn create_order(
    State(pool): State<Pool>,
    ValidatedJson(payload): ValidatedJson<SaveOrderPayload>,
) -> Result<Json<AdminOrderView>, (StatusCode, String)> {
    let mut conn = pool.get().await.map_err(internal_error)?;
    let order = save_order(&mut conn, payload, None).await?;

    let rows = std::slice::from_ref(&order);
    let mut items_by_order = load_items(&mut conn, rows).await?;
    let items = items_by_order.remove(&order.order_id).unwrap_or_default();

    Ok(Json(AdminOrderView::assemble(order, items)))
}

pub async fn update_order(
    State(pool): State<Pool>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<SaveOrderPayload>,
) -> Result<Json<AdminOrderView>, (StatusCode, String)> {
    use stone_shop::schema::orders;

    let mut conn = pool.get().await.map_err(internal_error)?;

    let existing: Order = orders::table
        .find(id)
        .select(Order::as_select())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(internal_error)?
        .ok_or_else(|| not_found("order not found"))?;

    let order = save_order(&mut conn, payload, Some(existing)).await?;

    let rows = std::slice::from_ref(&order);
    let mut items_by_order = load_items(&mut conn, rows).await?;
    let items = items_by_order.remove(&order.order_id).unwrap_or_default();

    Ok(Json(AdminOrderView::assemble(order, items)))
}

/// Replaces the payment proof from the admin form. The same image contract
/// as buyer confirmation applies; the previous blob is removed once the row
/// points at the new one.
pub async fn upload_payment_proof(
    State(pool): State<Pool>,
    Path(id): Path<i32>,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    use stone_shop::schema::orders;

    let mut proof: Option<(Option<String>, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(e.to_string()))?
    {
        if field.name() == Some("payment_proof") {
            let content_type = field.content_type().map(str::to_owned);
            let data = field
                .bytes()
                .await
                .map_err(|e| bad_request(e.to_string()))?;
            proof = Some((content_type, data.to_vec()));
        }
    }

    let (content_type, data) = proof.ok_or_else(|| bad_request("missing payment_proof field"))?;
    let ext = storage::validate_image(content_type.as_deref(), data.len())?;

    let mut conn = pool.get().await.map_err(internal_error)?;

    let order: Order = orders::table
        .find(id)
        .select(Order::as_select())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(internal_error)?
        .ok_or_else(|| not_found("order not found"))?;

    let path = storage::store(storage::PAYMENT_PROOFS, ext, &data)
        .await
        .map_err(internal_error)?;

    diesel::update(orders::table.find(order.order_id))
        .set(orders::payment_proof.eq(&path))
        .execute(&mut conn)
        .await
        .map_err(internal_error)?;

    if let Some(old) = order.payment_proof {
        if let Err(e) = storage::delete(&old).await {
            tracing::warn!(error = %e, path = %old, "failed to remove replaced payment proof");
        }
    }

    Ok(Json(serde_json::json!({ "url": storage::public_url(&path) })))
}

/// Deletes items first, then the order, then the stored proof blob so
/// nothing is orphaned.
pub async fn remove_order(
    State(pool): State<Pool>,
    Path(id): Path<i32>,
) -> Result<Json<Order>, (StatusCode, String)> {
    use stone_shop::schema::{order_items, orders};

    let mut conn = pool.get().await.map_err(internal_error)?;

    let order: Order = orders::table
        .find(id)
        .select(Order::as_select())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(internal_error)?
        .ok_or_else(|| not_found("order not found"))?;

    let deleted = conn
        .transaction::<Order, diesel::result::Error, _>(move |mut conn| {
            Box::pin(async move {
                diesel::delete(order_items::table.filter(order_items::order_id.eq(id)))
                    .execute(&mut conn)
                    .await?;

                diesel::delete(orders::table.find(id))
                    .returning(Order::as_returning())
                    .get_result(&mut conn)
                    .await
            })
        })
        .await
        .map_err(internal_error)?;

    if let Some(proof) = order.payment_proof {
        if let Err(e) = storage::delete(&proof).await {
            tracing::warn!(error = %e, path = %proof, "failed to remove payment proof of deleted order");
        }
    }

    Ok(Json(deleted))
}

/// Shared save path for create and edit. The item set is replaced wholesale
/// (delete-then-recreate); item identity is not preserved across edits.
async fn save_order(
    conn: &mut AsyncPgConnection,
    payload: SaveOrderPayload,
    existing: Option<Order>,
) -> Result<Order, (StatusCode, String)> {
    use stone_shop::schema::{order_items, orders, products};

    let status = OrderStatus::parse(&payload.status)
        .ok_or_else(|| bad_request("unknown order status"))?;

    let order_code = match payload.order_code.as_deref().filter(|c| !c.is_empty()) {
        Some(code) => code.to_owned(),
        None => match &existing {
            Some(order) => order.order_code.clone(),
            None => generate_admin_order_code(),
        },
    };

    // uniqueness excludes the row being edited
    let mut uniqueness = orders::table
        .filter(orders::order_code.eq(&order_code))
        .into_boxed();
    if let Some(order) = &existing {
        uniqueness = uniqueness.filter(orders::order_id.ne(order.order_id));
    }
    let duplicates: i64 = uniqueness
        .count()
        .get_result(&mut *conn)
        .await
        .map_err(internal_error)?;
    if duplicates > 0 {
        return Err(conflict("order code already in use"));
    }

    let product_ids: Vec<i32> = payload.items.iter().map(|item| item.product_id).collect();
    let prices: HashMap<i32, f64> = products::table
        .filter(products::product_id.eq_any(&product_ids))
        .select((products::product_id, products::price))
        .load::<(i32, f64)>(&mut *conn)
        .await
        .map_err(internal_error)?
        .into_iter()
        .collect();

    let lines = price_items(&prices, &payload.items)
        .map_err(|id| conflict(format!("order item references unknown product {}", id)))?;

    let new_order = NewOrder {
        customer_id: payload.customer_id,
        order_code,
        buyer_name: payload.buyer_name,
        buyer_phone: payload.buyer_phone,
        shipping_address: payload.shipping_address,
        order_date: payload.order_date,
        status: status.as_str().to_owned(),
    };
    let existing_id = existing.map(|order| order.order_id);

    conn.transaction::<Order, diesel::result::Error, _>(move |mut conn| {
        Box::pin(async move {
            let order = match existing_id {
                Some(id) => {
                    diesel::update(orders::table.find(id))
                        .set((
                            orders::customer_id.eq(new_order.customer_id),
                            orders::order_code.eq(&new_order.order_code),
                            orders::buyer_name.eq(&new_order.buyer_name),
                            orders::buyer_phone.eq(&new_order.buyer_phone),
                            orders::shipping_address.eq(&new_order.shipping_address),
                            orders::order_date.eq(new_order.order_date),
                            orders::status.eq(&new_order.status),
                        ))
                        .returning(Order::as_returning())
                        .get_result(&mut conn)
                        .await?
                }
                None => {
                    diesel::insert_into(orders::table)
                        .values(&new_order)
                        .returning(Order::as_returning())
                        .get_result(&mut conn)
                        .await?
                }
            };

            diesel::delete(order_items::table.filter(order_items::order_id.eq(order.order_id)))
                .execute(&mut conn)
                .await?;

            let items = lines
                .iter()
                .map(|&(product_id, quantity, subtotal)| NewOrderItem {
                    order_id: order.order_id,
                    product_id,
                    quantity,
                    subtotal,
                })
                .collect::<Vec<_>>();

            diesel::insert_into(order_items::table)
                .values(&items)
                .execute(&mut conn)
                .await?;

            Ok(order)
        })
    })
    .await
    .map_err(|e| match e {
        diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            _,
        ) => conflict("order code already in use"),
        other => internal_error(other),
    })
}

async fn load_items(
    conn: &mut AsyncPgConnection,
    orders: &[Order],
) -> Result<HashMap<i32, Vec<AdminOrderItemView>>, (StatusCode, String)> {
    use stone_shop::schema::{order_items, products};

    if orders.is_empty() {
        return Ok(HashMap::new());
    }

    let order_ids: Vec<i32> = orders.iter().map(|order| order.order_id).collect();

    let rows: Vec<(OrderItem, Option<String>)> = order_items::table
        .filter(order_items::order_id.eq_any(&order_ids))
        .left_join(products::table)
        .order(order_items::order_item_id.asc())
        .select((OrderItem::as_select(), products::name.nullable()))
        .load(&mut *conn)
        .await
        .map_err(internal_error)?;

    let mut by_order: HashMap<i32, Vec<AdminOrderItemView>> = HashMap::new();
    for (item, product_name) in rows {
        by_order
            .entry(item.order_id)
            .or_default()
            .push(AdminOrderItemView {
                order_item_id: item.order_item_id,
                product_id: item.product_id,
                product_name,
                quantity: item.quantity,
                subtotal: item.subtotal,
            });
    }

    Ok(by_order)
}
