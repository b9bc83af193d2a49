use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
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
        .route("/usage", get(usage_summary))
        .route("/usage.csv", get(usage_csv))
}

pub async fn usage_summary(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::UsageQuery>,
) -> axum::response::Response {
    let period = match query.into_period() {
        Ok(p) => p,
        Err(resp) => return resp,
    };

    match run(services, move |s| s.usage_summary(&period)).await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(resp) => resp,
    }
}

pub async fn usage_csv(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::UsageQuery>,
) -> axum::response::Response {
    let period = match query.into_period() {
        Ok(p) => p,
        Err(resp) => return resp,
    };
    let filename = format!("usage_{}-{:02}.csv", period.year, period.month);

    match run(services, move |s| s.usage_csv(&period)).await {
        Ok(csv) => csv_attachment(&filename, csv),
        Err(resp) => resp,
    }
}
