//! HTTP front end
//!
//! `GET /` is a health check; `POST /code-interpreter` takes `{"code": ...}`
//! and answers with `{"error": [...], "result": ...}`.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use serde_json::{Value, json};
use snipcheck::{CodeSubmission, ResponseEnvelope, Service};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

type SharedService = Arc<Service>;

/// Build the application router
pub fn router(service: Service, cors: bool) -> Router {
    let app = Router::new()
        .route("/", get(health))
        .route("/code-interpreter", post(code_interpreter))
        .with_state(Arc::new(service))
        .layer(TraceLayer::new_for_http());

    if cors {
        app.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else {
        app
    }
}

/// Bind and serve until Ctrl-C
pub async fn serve(service: Service, bind: &str, cors: bool) -> Result<()> {
    let listener = TcpListener::bind(bind)
        .await
        .with_context(|| format!("failed to bind to {bind}"))?;
    let addr = listener.local_addr().context("listener has no local address")?;

    info!(%addr, cors, "serving code interpreter");

    axum::serve(listener, router(service, cors))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn code_interpreter(
    State(service): State<SharedService>,
    Json(submission): Json<CodeSubmission>,
) -> Result<Json<ResponseEnvelope>, (StatusCode, Json<Value>)> {
    service.handle(&submission).await.map(Json).map_err(|e| {
        error!("execution failed: {e}");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "detail": e.to_string() })),
        )
    })
}
