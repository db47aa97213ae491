//! CRUD HTTP service over a single restaurant collection, with a
//! server-rendered listing page and a token-issuing login stub.
//!
//! The record store ([`store::Store`]) is the only component that issues
//! queries; the routing layer translates its typed outcomes to status
//! codes, and the UI page reuses the same list query.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header::CONTENT_TYPE, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::signal::ctrl_c;
use tower_http::cors::CorsLayer;
use tracing::info;

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod store;
pub mod ui;

use state::AppState;

/// Builds the full router. `/health` and `/login` stay reachable even when
/// the store is down; everything store-backed sits behind the readiness
/// guard.
pub fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    let api = Router::new()
        .route(
            "/restaurants",
            get(routes::list_restaurants).post(routes::create_restaurant),
        )
        .route(
            "/restaurants/:id",
            get(routes::get_restaurant)
                .put(routes::update_restaurant)
                .delete(routes::delete_restaurant),
        );

    let store_backed = Router::new()
        .nest("/api", api)
        .route("/ui/restaurants", get(ui::restaurants_page))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            routes::ready_guard,
        ));

    Router::new()
        .merge(store_backed)
        .route("/login", post(routes::login_handler))
        .route("/health", get(routes::health_handler))
        .layer(cors)
        .with_state(state)
}

pub async fn serve(state: Arc<AppState>) -> std::io::Result<()> {
    let address = format!("0.0.0.0:{}", state.config.port);
    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    let interrupt = async {
        ctrl_c().await.expect("Failed to install Ctrl+C handler");
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = interrupt => {},
        _ = terminate => {},
    }
}
