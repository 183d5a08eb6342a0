//! PDF report export.

use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderName, HeaderValue};
use axum::response::IntoResponse;
use axum::Json;

use dfd_models::ResultRecord;
use dfd_report::REPORT_FILE_NAME;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Response header carrying the path the report was written to.
pub const REPORT_PATH_HEADER: &str = "x-report-path";

/// Render the posted result record as a PDF.
///
/// The document is written to the result directory and returned inline.
pub async fn generate_report(
    State(state): State<AppState>,
    Json(result): Json<ResultRecord>,
) -> ApiResult<impl IntoResponse> {
    let (path, bytes) = state.analysis.generate_report(&result).await?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/pdf"),
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&format!("attachment; filename=\"{}\"", REPORT_FILE_NAME))
            .map_err(|e| ApiError::internal(e.to_string()))?,
    );
    if let Ok(value) = HeaderValue::from_str(&path.display().to_string()) {
        headers.insert(HeaderName::from_static(REPORT_PATH_HEADER), value);
    }

    Ok((headers, bytes))
}
