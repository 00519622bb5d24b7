use super::models::{
    CreateOrderPayload, NewOrder, NewOrderItem, Order, OrderCreated, OrderStatus, OrderStatusView,
    generate_order_code,
};
use crate::storage;
use crate::utils::error::{bad_request, conflict, internal_error};
use crate::utils::extract::ValidatedJson;
use crate::utils::types::Pool;
use axum::{
    extract::{Json, Multipart, Path, State},
    http::StatusCode,
};
use diesel::prelude::*;
use diesel_async::{AsyncConnection, RunQueryDsl};

const CODE_ATTEMPTS: usize = 5;

/// Converts the submitted cart snapshot into an Order plus its OrderItems in
/// one transaction. Each line's subtotal is snapshotted as price x quantity
/// at this moment; later product price changes never touch it.
pub async fn create_order(
    State(pool): State<Pool>,
    ValidatedJson(payload): ValidatedJson<CreateOrderPayload>,
) -> Result<Json<OrderCreated>, (StatusCode, String)> {
    use stone_shop::schema::{order_items, orders};

    if payload.items.is_empty() {
        return Err(bad_request("cart is empty"));
    }

    let mut conn = pool.get().await.map_err(internal_error)?;

    let now = chrono::Local::now().naive_local();
    let lines: Vec<(i32, i32, f64)> = payload
        .items
        .items()
        .iter()
        .map(|item| (item.id, item.quantity, item.price * f64::from(item.quantity)))
        .collect();

    // The code is random; on the rare collision we re-derive it and retry the
    // whole insert rather than overwrite anything.
    for _ in 0..CODE_ATTEMPTS {
        let new_order = NewOrder {
            customer_id: payload.customer_id,
            order_code: generate_order_code(now),
            buyer_name: payload.buyer_name.clone(),
            buyer_phone: payload.buyer_phone.clone(),
            shipping_address: payload.shipping_address.clone(),
            order_date: now,
            status: OrderStatus::Pending.as_str().to_owned(),
        };
        let lines = lines.clone();

        let res = conn
            .transaction::<String, diesel::result::Error, _>(move |mut conn| {
                Box::pin(async move {
                    let order = diesel::insert_into(orders::table)
                        .values(&new_order)
                        .returning(Order::as_returning())
                        .get_result(&mut conn)
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

                    Ok(order.order_code)
                })
            })
            .await;

        match res {
            Ok(order_code) => return Ok(Json(OrderCreated { order_code })),
            Err(diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                _,
            )) => continue,
            Err(e) => return Err(internal_error(e)),
        }
    }

    Err((
        StatusCode::INTERNAL_SERVER_ERROR,
        "could not allocate a unique order code".to_owned(),
    ))
}

/// Attaches the bank-transfer proof to an order and moves it to
/// `processing` - the only way a new order leaves `pending`. A second
/// submission for a code that already carries a proof is rejected, never
/// overwritten.
pub async fn confirm_payment(
    State(pool): State<Pool>,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    use stone_shop::schema::orders;

    let mut order_code: Option<String> = None;
    let mut proof: Option<(Option<String>, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(e.to_string()))?
    {
        match field.name() {
            Some("order_code") => {
                order_code = Some(field.text().await.map_err(|e| bad_request(e.to_string()))?);
            }
            Some("payment_proof") => {
                let content_type = field.content_type().map(str::to_owned);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| bad_request(e.to_string()))?;
                proof = Some((content_type, data.to_vec()));
            }
            _ => {}
        }
    }

    let order_code = order_code
        .filter(|code| !code.is_empty())
        .ok_or_else(|| bad_request("order code is required"))?;
    let (content_type, data) = proof.ok_or_else(|| bad_request("payment proof is required"))?;

    // validated before anything touches storage
    let ext = storage::validate_image(content_type.as_deref(), data.len())?;

    let mut conn = pool.get().await.map_err(internal_error)?;

    let order: Option<Order> = orders::table
        .filter(orders::order_code.eq(&order_code))
        .select(Order::as_select())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(internal_error)?;

    let order = match order {
        Some(order) if order.payment_proof.is_none() => order,
        // one message for both cases so guessing codes reveals nothing
        _ => return Err(conflict("order already confirmed or invalid")),
    };

    let path = storage::store(storage::PAYMENT_PROOFS, ext, &data)
        .await
        .map_err(internal_error)?;

    // the is_null guard closes the race between two concurrent submissions
    let updated = diesel::update(
        orders::table
            .find(order.order_id)
            .filter(orders::payment_proof.is_null()),
    )
    .set((
        orders::payment_proof.eq(&path),
        orders::status.eq(OrderStatus::Processing.as_str()),
    ))
    .execute(&mut conn)
    .await
    .map_err(internal_error)?;

    if updated == 0 {
        if let Err(e) = storage::delete(&path).await {
            tracing::warn!(error = %e, path = %path, "failed to remove orphaned payment proof");
        }
        return Err(conflict("order already confirmed or invalid"));
    }

    Ok(Json(serde_json::json!({
        "order_code": order_code,
        "status": OrderStatus::Processing.as_str(),
    })))
}

/// Guest status lookup. An unknown code is a valid "no result", returned as
/// JSON null rather than an error.
pub async fn check_status(
    State(pool): State<Pool>,
    Path(code): Path<String>,
) -> Result<Json<Option<OrderStatusView>>, (StatusCode, String)> {
    use stone_shop::schema::{order_items, orders};

    let mut conn = pool.get().await.map_err(internal_error)?;

    let order: Option<Order> = orders::table
        .filter(orders::order_code.eq(&code))
        .select(Order::as_select())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(internal_error)?;

    let Some(order) = order else {
        return Ok(Json(None));
    };

    let total: Option<f64> = order_items::table
        .filter(order_items::order_id.eq(order.order_id))
        .select(diesel::dsl::sum(order_items::subtotal))
        .get_result(&mut conn)
        .await
        .map_err(internal_error)?;

    Ok(Json(Some(OrderStatusView::from_order(
        &order,
        total.unwrap_or(0.0),
    ))))
}
