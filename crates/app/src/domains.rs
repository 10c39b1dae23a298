use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use metrics::counter;
use serde::Serialize;
use tracing::{error, info, warn};

use ssl_dashboard_core::types::{DomainRecord, DomainStats};
use ssl_dashboard_core::validation::DomainInput;

use crate::problem::ProblemResponse;
use crate::router::AppState;
use crate::service::DomainServiceError;

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    message: String,
}

pub async fn list(
    State(state): State<AppState>,
) -> Result<Json<Vec<DomainRecord>>, ProblemResponse> {
    let records = state
        .domains()
        .list()
        .await
        .map_err(|err| problem("list", err, "Failed to fetch domains"))?;
    record_success("list");
    Ok(Json(records))
}

pub async fn stats(State(state): State<AppState>) -> Result<Json<DomainStats>, ProblemResponse> {
    let stats = state
        .domains()
        .stats()
        .await
        .map_err(|err| problem("stats", err, "Failed to fetch domain stats"))?;
    record_success("stats");
    Ok(Json(stats))
}

pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<DomainInput>, JsonRejection>,
) -> Result<(StatusCode, Json<DomainRecord>), ProblemResponse> {
    let Json(input) = payload.map_err(|rejection| {
        warn!(stage = "api", error = %rejection, "rejected malformed create body");
        counter!("domain_api_requests_total", "route" => "create", "result" => "client_error")
            .increment(1);
        ProblemResponse::new(
            StatusCode::BAD_REQUEST,
            "invalid_json",
            rejection.body_text(),
        )
    })?;

    let record = state
        .domains()
        .create(input)
        .await
        .map_err(|err| problem("create", err, "Failed to create domain"))?;
    record_success("create");
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn install_ssl(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<DomainRecord>, ProblemResponse> {
    let id = parse_id("install_ssl", &raw_id)?;
    let record = state
        .domains()
        .install_ssl(id)
        .await
        .map_err(|err| problem("install_ssl", err, "Failed to install SSL certificate"))?;
    record_success("install_ssl");
    Ok(Json(record))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<DeleteResponse>, ProblemResponse> {
    let id = parse_id("delete", &raw_id)?;
    let removed = state
        .domains()
        .delete(id)
        .await
        .map_err(|err| problem("delete", err, "Failed to delete domain"))?;
    record_success("delete");
    Ok(Json(DeleteResponse {
        message: format!("Domain {} deleted successfully", removed.name),
    }))
}

// Only the canonical decimal form of an id matches a record, so `+5` and `05`
// are as unknown as `abc`.
fn parse_id(route: &'static str, raw: &str) -> Result<u64, ProblemResponse> {
    raw.parse::<u64>()
        .ok()
        .filter(|id| id.to_string() == raw)
        .ok_or_else(|| problem(route, DomainServiceError::NotFound, ""))
}

fn record_success(route: &'static str) {
    counter!("domain_api_requests_total", "route" => route, "result" => "ok").increment(1);
}

/// Maps a service error onto the public error taxonomy.
///
/// `internal_message` is the only text returned for unexpected failures; the
/// underlying error is logged instead.
fn problem(
    route: &'static str,
    err: DomainServiceError,
    internal_message: &'static str,
) -> ProblemResponse {
    let response = match &err {
        DomainServiceError::Validation(validation) => {
            warn!(stage = "api", route, reason = %validation, "validation failed");
            ProblemResponse::new(
                StatusCode::BAD_REQUEST,
                "validation_failed",
                validation.to_string(),
            )
        }
        DomainServiceError::AlreadyExists(_) => {
            info!(stage = "api", route, reason = %err, "duplicate domain");
            ProblemResponse::new(StatusCode::BAD_REQUEST, "domain_exists", err.to_string())
        }
        DomainServiceError::NotFound => {
            ProblemResponse::new(StatusCode::NOT_FOUND, "domain_not_found", err.to_string())
        }
        DomainServiceError::Storage(_) => {
            error!(stage = "api", route, error = %err, "domain request failed");
            ProblemResponse::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                internal_message,
            )
        }
    };

    let result = if response.status().is_server_error() {
        "server_error"
    } else {
        "client_error"
    };
    counter!("domain_api_requests_total", "route" => route, "result" => result).increment(1);
    response
}
