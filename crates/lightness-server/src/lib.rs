pub mod error;
pub mod routes;
pub mod state;

use axum::http::{header, Method};
use axum::routing::{get, post};
use axum::Router;
use std::path::PathBuf;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(app_state: state::AppState) -> Router {
    // Answers every OPTIONS preflight before routing.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        // Events (SSE)
        .route("/api/events", get(routes::events::sse_events))
        // Suggestions
        .route("/api/ai/suggestions", post(routes::suggestions::suggest))
        // Experiences
        .route(
            "/api/experiences",
            get(routes::experiences::list_experiences).post(routes::experiences::create_experience),
        )
        .route(
            "/api/experiences/refresh",
            post(routes::experiences::refresh_experiences),
        )
        .route("/api/experiences/{id}", get(routes::experiences::get_experience))
        .route(
            "/api/experiences/{id}/screens/{screen}",
            get(routes::experiences::open_screen),
        )
        .route(
            "/api/experiences/{id}/design",
            post(routes::experiences::complete_design),
        )
        .route(
            "/api/experiences/{id}/play",
            post(routes::experiences::complete_play),
        )
        .route(
            "/api/experiences/{id}/log",
            post(routes::experiences::complete_log),
        )
        // Playbook
        .route("/api/playbook", get(routes::playbook::get_playbook))
        // Catalog
        .route("/api/catalog", get(routes::catalog::get_catalog))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// Start the lightness server for the data root.
pub async fn serve(root: PathBuf, port: u16) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    serve_on(root, listener).await
}

/// Start the lightness server on a pre-bound listener.
///
/// Unlike `serve`, this accepts a `TcpListener` that was already bound so the
/// caller can read the actual port before starting (useful when `port = 0` and
/// the OS picks a free port).
pub async fn serve_on(root: PathBuf, listener: tokio::net::TcpListener) -> anyhow::Result<()> {
    let actual_port = listener.local_addr()?.port();
    let app = build_router(state::AppState::new(root)?);

    tracing::info!("lightness server listening on http://localhost:{actual_port}");

    axum::serve(listener, app).await?;
    Ok(())
}
