pub mod handlers;
pub mod models;
pub mod pdf;
pub mod routes;
