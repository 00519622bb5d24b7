use axum::{Router, routing::get};

use super::handlers;
use crate::utils::types::Pool;

pub fn get_routes() -> Router<Pool> {
    Router::new().route(
        "/admin/customers",
        get(handlers::get_customers).post(handlers::create_customer),
    )
}
