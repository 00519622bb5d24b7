use axum::{
    Router,
    routing::{get, post},
};

use super::handlers;
use crate::utils::types::Pool;

pub fn get_routes() -> Router<Pool> {
    Router::new()
        .route(
            "/admin/orders",
            get(handlers::get_orders).post(handlers::create_order),
        )
        .route(
            "/admin/orders/{id}",
            get(handlers::get_order_by_id)
                .put(handlers::update_order)
                .delete(handlers::remove_order),
        )
        .route(
            "/admin/orders/{id}/payment-proof",
            post(handlers::upload_payment_proof),
        )
}
