//! POST /api/v1/admin/refresh — synchronous on-demand collection.

use axum::{extract::State, Extension, Json};
use serde::Serialize;

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(in crate::api) struct RefreshData {
    status: &'static str,
    count: usize,
}

/// Runs a full collection and replaces the snapshot, returning the record
/// count. A run that produced nothing leaves the previous snapshot in
/// place — replacing real data with an empty set because every upstream
/// was down would be worse than staying stale.
pub(in crate::api) async fn refresh(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<RefreshData>>, ApiError> {
    let records = state.collector.collect_all().await;

    if records.is_empty() {
        tracing::warn!("manual refresh produced no records; keeping previous snapshot");
    } else {
        state.store.save_all(&records).map_err(|e| {
            tracing::error!(error = %e, "manual refresh failed to write snapshot");
            ApiError::new(req_id.0.clone(), "internal_error", "snapshot write failed")
        })?;
    }

    Ok(Json(ApiResponse {
        data: RefreshData {
            status: "ok",
            count: records.len(),
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}
