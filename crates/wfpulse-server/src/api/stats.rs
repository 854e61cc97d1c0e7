//! GET /api/v1/stats — snapshot counts by platform and country.

use axum::{extract::State, Extension, Json};

use wfpulse_store::SnapshotStats;

use crate::middleware::RequestId;

use super::{ApiResponse, AppState, ResponseMeta};

pub(in crate::api) async fn get_stats(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<SnapshotStats>> {
    Json(ApiResponse {
        data: state.store.stats(),
        meta: ResponseMeta::new(req_id.0),
    })
}
