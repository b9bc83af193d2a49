use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use crate::app::dto;
use crate::app::routes::common::run;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/vendors/lookup", get(lookup_vendor))
        .route("/orders", get(list_orders).post(place_orders))
        .route("/orders/:id/confirm", post(confirm_receipt))
}

pub async fn lookup_vendor(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::VendorLookupQuery>,
) -> axum::response::Response {
    match run(services, move |s| s.vendor_for(&query.category, &query.item)).await {
        Ok(contact) => (StatusCode::OK, Json(contact)).into_response(),
        Err(resp) => resp,
    }
}

/// Split the cart per vendor; one pending order (and request message) each.
pub async fn place_orders(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::PlaceOrdersRequest>,
) -> axum::response::Response {
    let branch = match dto::parse_branch(&body.branch) {
        Ok(b) => b,
        Err(resp) => return resp,
    };
    let date = body.date.unwrap_or_else(dto::today);
    let lines = body.lines;

    match run(services, move |s| s.place_orders(branch, date, &lines)).await {
        Ok(placed) => (StatusCode::CREATED, Json(placed)).into_response(),
        Err(resp) => resp,
    }
}

pub async fn list_orders(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match run(services, |s| s.orders()).await {
        Ok(orders) => (StatusCode::OK, Json(orders)).into_response(),
        Err(resp) => resp,
    }
}

pub async fn confirm_receipt(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::ConfirmReceiptRequest>,
) -> axum::response::Response {
    let id = match dto::parse_order_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let today = dto::today();

    match run(services, move |s| s.confirm_receipt(&id, body.lines, today)).await {
        Ok(receipt) => (StatusCode::OK, Json(receipt)).into_response(),
        Err(resp) => resp,
    }
}
