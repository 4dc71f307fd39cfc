//! HTTP API for the Tukin Engine.
//!
//! This module exposes a minimal REST API around the deduction engine
//! using the [`axum`](https://crates.io/crates/axum) framework.  Report
//! pages submit a period's attendance data and receive per-employee
//! summaries and totals in JSON.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::engine::TukinEngine;
use crate::models::{EmployeeTukinInput, ReportingPeriod, TukinRunInput};

/// Application state shared across requests.
pub struct AppState {
    pub engine: TukinEngine,
}

/// Body of `POST /api/tukin/summary`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryRequest {
    pub period: ReportingPeriod,
    pub employee: EmployeeTukinInput,
}

/// Build the API router around an already validated engine.
pub fn build_router(engine: TukinEngine) -> Router {
    let state = Arc::new(AppState { engine });
    Router::new()
        .route("/api/tukin/report", post(report_handler))
        .route("/api/tukin/summary", post(summary_handler))
        .route("/api/tukin/rules", get(rules_handler))
        .with_state(state)
}

/// Handler for POST /api/tukin/report
async fn report_handler(
    State(app_state): State<Arc<AppState>>,
    Json(input): Json<TukinRunInput>,
) -> impl IntoResponse {
    let engine = app_state.engine.clone();
    // The computation is CPU-bound; keep it off the async workers.
    match tokio::task::spawn_blocking(move || engine.run_report(input)).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(err) => {
            let body = Json(serde_json::json!({"error": err.to_string()}));
            (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
        }
    }
}

/// Handler for POST /api/tukin/summary
async fn summary_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<SummaryRequest>,
) -> impl IntoResponse {
    match app_state.engine.summarize(&request.period, &request.employee) {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(err) => {
            let body = Json(serde_json::json!({
                "employeeId": request.employee.employee_id,
                "error": err.to_string(),
            }));
            (StatusCode::UNPROCESSABLE_ENTITY, body).into_response()
        }
    }
}

/// Handler for GET /api/tukin/rules
async fn rules_handler(State(app_state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(app_state.engine.config().clone())
}

/// Launch the API server.  Binds to `addr` and blocks until the
/// server terminates.
pub async fn serve(addr: &str, engine: TukinEngine) -> Result<()> {
    let router = build_router(engine);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "server listening");
    axum::serve(listener, router).await?;
    Ok(())
}
