use axum::http::StatusCode;
use axum::{Json, Router, routing::post};
use log::{error, info};
use serde::Deserialize;

use crate::data::{TimetableConfig, TimetableInput, TimetableReport};
use crate::error::TimetableError;
use crate::solver;

pub const DEFAULT_ADDR: &str = "127.0.0.1:8080";

#[derive(Debug, Clone, Deserialize)]
pub struct SolveRequest {
    pub input: TimetableInput,
    #[serde(default)]
    pub config: TimetableConfig,
}

fn status_for(error: &TimetableError) -> StatusCode {
    match error {
        TimetableError::Configuration(_) => StatusCode::BAD_REQUEST,
        TimetableError::Infeasible | TimetableError::Timeout(_) => StatusCode::UNPROCESSABLE_ENTITY,
        TimetableError::NotSolved | TimetableError::AlreadySolved | TimetableError::Engine(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

async fn solve_handler(
    Json(request): Json<SolveRequest>,
) -> Result<Json<TimetableReport>, (StatusCode, String)> {
    // the solver blocks; keep it off the async workers
    let outcome = tokio::task::spawn_blocking(move || solver::solve(&request.input, &request.config))
        .await
        .map_err(|e| {
            error!("Solver task failed: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?;

    match outcome {
        Ok(report) => Ok(Json(report)),
        Err(e) => Err((status_for(&e), e.to_string())),
    }
}

pub fn router() -> Router {
    Router::new().route("/v1/timetable/solve", post(solve_handler))
}

/// Serves the router on `TIMETABLE_ADDR`, or [`DEFAULT_ADDR`] when unset.
pub async fn run_server() -> std::io::Result<()> {
    let addr = std::env::var("TIMETABLE_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Server running at http://{}", listener.local_addr()?);

    axum::serve(listener, router()).await
}
