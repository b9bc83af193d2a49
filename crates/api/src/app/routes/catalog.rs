use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;

use larder_inventory::CatalogEntry;

use crate::app::routes::common::run;
use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/categories", get(categories))
        .route("/units", get(units))
        .route("/items", get(items).put(upsert_item).delete(remove_item))
}

pub async fn categories(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match run(services, |s| s.catalog()).await {
        Ok(catalog) => (StatusCode::OK, Json(catalog.categories())).into_response(),
        Err(resp) => resp,
    }
}

pub async fn units(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match run(services, |s| s.catalog()).await {
        Ok(catalog) => (StatusCode::OK, Json(catalog.units())).into_response(),
        Err(resp) => resp,
    }
}

/// With `category`: sorted item names of that category. Without: every entry.
pub async fn items(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::CategoryQuery>,
) -> axum::response::Response {
    let catalog = match run(services, |s| s.catalog()).await {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    match query.category.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
        Some(category) => (StatusCode::OK, Json(catalog.items_by_category(category))).into_response(),
        None => (StatusCode::OK, Json(catalog.entries())).into_response(),
    }
}

pub async fn upsert_item(
    Extension(services): Extension<Arc<AppServices>>,
    Json(entry): Json<CatalogEntry>,
) -> axum::response::Response {
    match run(services, move |s| s.upsert_catalog_entry(entry)).await {
        Ok(true) => (StatusCode::CREATED, Json(json!({ "created": true }))).into_response(),
        Ok(false) => (StatusCode::OK, Json(json!({ "created": false }))).into_response(),
        Err(resp) => resp,
    }
}

pub async fn remove_item(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::CatalogItemQuery>,
) -> axum::response::Response {
    let label = format!("{}/{}", query.category, query.item);
    match run(services, move |s| s.remove_catalog_entry(&query.category, &query.item)).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => errors::json_error(
            StatusCode::NOT_FOUND,
            "not_found",
            format!("no catalog entry for {label}"),
        ),
        Err(resp) => resp,
    }
}
