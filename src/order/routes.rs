use axum::{
    Router,
    routing::{get, post},
};

use super::handlers;
use crate::utils::types::Pool;

pub fn get_routes() -> Router<Pool> {
    Router::new()
        .route("/orders", post(handlers::create_order))
        .route("/orders/confirm-payment", post(handlers::confirm_payment))
        .route("/orders/{code}/status", get(handlers::check_status))
}
