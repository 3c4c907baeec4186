/*!
 * HTTP front end of the translation relay.
 *
 * - `routes`: route table under `/api/v1/translation` plus `/health`
 * - `handlers`: request validation and calls into the translation service
 * - `types`: request/response bodies, shared state and the error envelope
 */

pub mod handlers;
pub mod routes;
pub mod types;

pub use routes::{create_routes, API_PREFIX};
pub use types::{ApiError, AppState};

use anyhow::{Context, Result};
use axum::{
    extract::Request,
    http::{Method, StatusCode},
    middleware::{self, Next},
    response::Response,
    Router,
};
use log::info;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::cors::{Any, CorsLayer};

/// Build the application router with CORS applied
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    create_routes()
        .with_state(state)
        .layer(middleware::from_fn(log_requests))
        .layer(cors)
}

/// Log method, path, status and latency of every request
async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    info!(
        "{}",
        request_summary(&method, &path, response.status(), started.elapsed())
    );
    response
}

fn request_summary(method: &Method, path: &str, status: StatusCode, latency: Duration) -> String {
    format!(
        "{} {} {} {:.1}ms",
        method,
        path,
        status.as_u16(),
        latency.as_secs_f64() * 1000.0
    )
}

/// Bind `address` and serve until Ctrl-C
pub async fn serve(state: Arc<AppState>, address: &str) -> Result<()> {
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .with_context(|| format!("Failed to bind server to {}", address))?;

    info!("Translation service listening on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Translation service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
    }
}
