mod cart;
mod category;
mod customer;
mod order;
mod pool;
mod product;
mod report;
mod sale;
mod storage;
mod utils;

use axum::{Router, extract::DefaultBodyLimit};
use diesel::prelude::*;
use diesel_async::AsyncPgConnection;
use diesel_async::async_connection_wrapper::AsyncConnectionWrapper;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use listenfd::ListenFd;
use std::env;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations/");

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let db_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    run_migrations(db_url).await;

    let pool = pool::get_pool().await.expect("failed to create db pool");

    let routes = Router::new()
        .merge(category::routes::get_routes())
        .merge(customer::routes::get_routes())
        .merge(product::routes::get_routes())
        .merge(order::routes::get_routes())
        .merge(sale::routes::get_routes())
        .merge(report::routes::get_routes())
        // image contract caps files at 2MB; leave headroom for the multipart framing
        .layer(DefaultBodyLimit::max(4 * 1024 * 1024))
        .with_state(pool);

    let app = Router::new()
        .nest("/api", routes)
        .nest_service("/storage", ServeDir::new(storage::base_dir()))
        .layer(TraceLayer::new_for_http())
        .fallback(utils::handler_404);

    let mut listenfd = ListenFd::from_env();
    let listener = match listenfd.take_tcp_listener(0).unwrap() {
        // if we are given a tcp listener on listen fd 0, we use that one
        Some(listener) => {
            listener.set_nonblocking(true).unwrap();
            TcpListener::from_std(listener).unwrap()
        }
        // otherwise fall back to local listening
        None => TcpListener::bind("127.0.0.1:3000").await.unwrap(),
    };
    tracing::info!("listening on {}", listener.local_addr().unwrap());
    axum::serve(listener, app).await.unwrap();
}

async fn run_migrations(db_url: String) {
    tokio::task::spawn_blocking(move || {
        let mut conn = AsyncConnectionWrapper::<AsyncPgConnection>::establish(&db_url)
            .expect("failed to connect for migrations");
        conn.run_pending_migrations(MIGRATIONS)
            .map(|_| ())
            .expect("failed to run migrations");
    })
    .await
    .expect("migration task panicked");
}
