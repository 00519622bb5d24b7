use axum::{
    Router,
    routing::{get, post},
};

use super::handlers;
use crate::utils::types::Pool;

pub fn get_routes() -> Router<Pool> {
    Router::new()
        .route(
            "/products",
            get(handlers::get_products).post(handlers::create_product),
        )
        .route(
            "/products/{id}",
            get(handlers::get_product_by_id)
                .patch(handlers::update_product)
                .delete(handlers::remove_product),
        )
        .route("/products/{id}/image", post(handlers::upload_product_image))
}
