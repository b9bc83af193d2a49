use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use crate::app::dto;
use crate::app::routes::common::{csv_attachment, run};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_movements).post(log_movement))
        .route("/export.csv", get(export_movements))
}

pub async fn list_movements(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match run(services, |s| s.movements()).await {
        Ok(log) => (StatusCode::OK, Json(log)).into_response(),
        Err(resp) => resp,
    }
}

/// Rejected movements (unknown item, blocked negative stock) are still a 200:
/// the body carries `status: "rejected"` and the warning.
pub async fn log_movement(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::LogMovementRequest>,
) -> axum::response::Response {
    let cmd = match body.into_command() {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    match run(services, move |s| s.log_movement(cmd)).await {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(resp) => resp,
    }
}

pub async fn export_movements(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match run(services, |s| s.movements_csv()).await {
        Ok(csv) => csv_attachment("stock_history.csv", csv),
        Err(resp) => resp,
    }
}
