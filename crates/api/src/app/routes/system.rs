use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use larder_core::Branch;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn branches() -> impl IntoResponse {
    let list: Vec<_> = Branch::ALL
        .iter()
        .map(|b| json!({ "name": b.name(), "slug": b.slug() }))
        .collect();
    Json(list)
}
