use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;

use larder_inventory::{DeleteOutcome, RegisterOutcome};

use crate::app::routes::common::run;
use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(query_inventory).put(register_item).delete(delete_item))
        .route("/options", get(filter_options))
        .route("/print", get(print_inventory))
}

pub async fn query_inventory(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::InventoryQuery>,
) -> axum::response::Response {
    let filter = match query.into_filter() {
        Ok(f) => f,
        Err(resp) => return resp,
    };

    match run(services, move |s| s.query(&filter)).await {
        Ok(rows) => (StatusCode::OK, Json(rows)).into_response(),
        Err(resp) => resp,
    }
}

pub async fn register_item(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::RegisterItemRequest>,
) -> axum::response::Response {
    let cmd = match body.into_command() {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let key = cmd.key.clone();

    let outcome = match run(services, move |s| s.register_item(cmd)).await {
        Ok(o) => o,
        Err(resp) => return resp,
    };

    let status = match outcome {
        RegisterOutcome::Created => StatusCode::CREATED,
        RegisterOutcome::Updated => StatusCode::OK,
    };
    (status, Json(json!({ "outcome": outcome, "key": key }))).into_response()
}

pub async fn delete_item(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::ItemKeyQuery>,
) -> axum::response::Response {
    let key = match query.into_key() {
        Ok(k) => k,
        Err(resp) => return resp,
    };
    let label = key.to_string();

    match run(services, move |s| s.delete_item(&key)).await {
        Ok(DeleteOutcome::Deleted(record)) => (StatusCode::OK, Json(record)).into_response(),
        Ok(DeleteOutcome::NotFound) => errors::json_error(
            StatusCode::NOT_FOUND,
            "not_found",
            format!("no inventory row for {label}"),
        ),
        Err(resp) => resp,
    }
}

pub async fn filter_options(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::OptionsQuery>,
) -> axum::response::Response {
    let branch = match dto::parse_optional_branch(query.branch.as_deref()) {
        Ok(b) => b,
        Err(resp) => return resp,
    };
    let category = query.category;

    match run(services, move |s| s.filter_options(branch, category.as_deref())).await {
        Ok(options) => (StatusCode::OK, Json(options)).into_response(),
        Err(resp) => resp,
    }
}

pub async fn print_inventory(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::InventoryQuery>,
) -> axum::response::Response {
    let filter = match query.into_filter() {
        Ok(f) => f,
        Err(resp) => return resp,
    };

    match run(services, move |s| s.inventory_print(&filter)).await {
        Ok(html) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
            html,
        )
            .into_response(),
        Err(resp) => resp,
    }
}
