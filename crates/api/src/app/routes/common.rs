use std::sync::Arc;

use axum::http::{header, StatusCode};
use axum::response::IntoResponse;

use larder_infra::ServiceResult;

use crate::app::errors;
use crate::app::services::AppServices;

/// Run a service call on the blocking pool; storage is synchronous file I/O.
pub async fn run<T, F>(services: Arc<AppServices>, f: F) -> Result<T, axum::response::Response>
where
    T: Send + 'static,
    F: FnOnce(&AppServices) -> ServiceResult<T> + Send + 'static,
{
    match tokio::task::spawn_blocking(move || f(&services)).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(errors::service_error_to_response(e)),
        Err(e) => Err(errors::json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            e.to_string(),
        )),
    }
}

/// CSV download with a fixed file name.
pub fn csv_attachment(filename: &str, body: String) -> axum::response::Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
        .into_response()
}
