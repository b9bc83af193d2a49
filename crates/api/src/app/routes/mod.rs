use axum::{routing::get, Router};

pub mod catalog;
pub mod common;
pub mod inventory;
pub mod movements;
pub mod purchasing;
pub mod reports;
pub mod system;

/// Router for every endpoint except `/health`.
pub fn router() -> Router {
    Router::new()
        .route("/branches", get(system::branches))
        .nest("/inventory", inventory::router())
        .nest("/movements", movements::router())
        .nest("/reports", reports::router())
        .nest("/catalog", catalog::router())
        .merge(purchasing::router())
}
