pub mod error;
pub mod generator;
pub mod routes;
pub mod state;
pub mod store;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Status
        .route("/api/health", get(routes::health::health))
        .route("/api/providers", get(routes::health::providers))
        // Generators
        .route(
            "/api/specifications/generate",
            post(routes::specifications::generate),
        )
        .route("/api/designs/generate", post(routes::designs::generate))
        .route("/api/code/generate", post(routes::code::generate))
        .route("/api/tests/generate", post(routes::tests::generate))
        .route("/api/pipelines/generate", post(routes::pipelines::generate))
        .route(
            "/api/documentation/generate",
            post(routes::documentation::generate),
        )
        // Mermaid
        .route("/api/mermaid/repair", post(routes::mermaid::repair))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

/// Bind `bind:port` and serve until the process is stopped.
pub async fn serve(app_state: AppState, bind: &str, port: u16) -> anyhow::Result<()> {
    let addr = format!("{bind}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    serve_on(app_state, listener).await
}

/// Serve on a pre-bound listener.
///
/// Unlike `serve`, this accepts a `TcpListener` that was already bound so the
/// caller can read the actual port before starting (useful when `port = 0` and
/// the OS picks a free port).
pub async fn serve_on(
    app_state: AppState,
    listener: tokio::net::TcpListener,
) -> anyhow::Result<()> {
    let actual_port = listener.local_addr()?.port();
    let providers = app_state.generator.llm().configured();
    let app = build_router(app_state);

    tracing::info!(
        ?providers,
        "SDLC Companion API listening on http://localhost:{actual_port}"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
