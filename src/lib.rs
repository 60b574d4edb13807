//! # Jokebook
//!
//! A small HTTP service that serves jokes grouped by category.
//!
//! ## Endpoints
//! - `GET /jokebook/categories` — all category names
//! - `GET /jokebook/joke/{category}` — one random joke from a category
//! - `POST /jokebook/joke/{category}` — append a `{joke, response}` pair
//! - `GET /jokebook/stats` — record count per category, zeroes included
//! - `GET /jokebook/search?word=term` — substring search over all joke text
//!
//! ## Backends
//! The store behind those routes is either in-memory (default) or a SQLite
//! database when `DATABASE_PATH` is set. Both are seeded with the default
//! multilingual joke set; SQLite only on first start, so appended jokes
//! survive restarts.
use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
    routing::{get, post},
};

use signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tokio::{net::TcpListener, signal};
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

pub mod config;
pub mod error;
pub mod routes;
pub mod seed;
pub mod state;
pub mod store;

use routes::{
    add_joke_handler, categories_handler, random_joke_handler, search_handler, stats_handler,
};
use state::State;

pub fn build_router(state: Arc<State>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/jokebook/categories", get(categories_handler))
        .route("/jokebook/joke/{category}", get(random_joke_handler))
        .route("/jokebook/joke/{category}", post(add_joke_handler))
        .route("/jokebook/stats", get(stats_handler))
        .route("/jokebook/search", get(search_handler))
        .layer(cors)
        .with_state(state)
}

pub async fn start_server() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Initializing state...");
    let state = State::new();

    info!("Starting server...");
    let app = build_router(state.clone());

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await.unwrap();
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    println!("Server shutting down...");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("Failed to install Ctrl+C handler");

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
