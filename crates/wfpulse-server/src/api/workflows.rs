//! GET /api/v1/workflows — filter, sort, and paginate the snapshot.

use std::cmp::Ordering;

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use wfpulse_core::{Country, Platform, WorkflowRecord};

use crate::middleware::RequestId;

use super::{ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Default, Deserialize)]
pub(in crate::api) struct ListParams {
    platform: Option<String>,
    country: Option<String>,
    sort_by: Option<String>,
    order: Option<String>,
    limit: Option<usize>,
    offset: Option<usize>,
}

#[derive(Debug, Serialize)]
pub(in crate::api) struct WorkflowsData {
    total: usize,
    items: Vec<WorkflowRecord>,
    limit: usize,
    offset: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SortField {
    Score,
    Workflow,
    Platform,
    Country,
}

/// Resolve the requested sort. An unknown field degrades to the
/// deterministic default — score descending — exactly as if the caller had
/// asked for the default field with the default order.
fn parse_sort(sort_by: Option<&str>, order: Option<&str>) -> (SortField, bool) {
    let descending = !order.is_some_and(|o| o.eq_ignore_ascii_case("asc"));
    match sort_by {
        None | Some("popularity_score") => (SortField::Score, descending),
        Some("workflow") => (SortField::Workflow, descending),
        Some("platform") => (SortField::Platform, descending),
        Some("country") => (SortField::Country, descending),
        Some(_) => (SortField::Score, true),
    }
}

fn sort_records(records: &mut [WorkflowRecord], field: SortField, descending: bool) {
    records.sort_by(|a, b| {
        let ord = match field {
            SortField::Score => a
                .popularity_score
                .partial_cmp(&b.popularity_score)
                .unwrap_or(Ordering::Equal),
            SortField::Workflow => a.workflow.cmp(&b.workflow),
            SortField::Platform => a.platform.name().cmp(b.platform.name()),
            SortField::Country => a.country.cmp(&b.country),
        };
        if descending {
            ord.reverse()
        } else {
            ord
        }
    });
}

pub(in crate::api) async fn list_workflows(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<ListParams>,
) -> Json<ApiResponse<WorkflowsData>> {
    let mut items = state.store.load_all();

    // Unknown filter values match nothing rather than erroring.
    if let Some(platform) = params.platform.as_deref() {
        let wanted = Platform::from_name(platform);
        items.retain(|r| Some(r.platform) == wanted);
    }
    if let Some(country) = params.country.as_deref() {
        let wanted = Country::from_code(country);
        items.retain(|r| Some(r.country) == wanted);
    }

    let (field, descending) = parse_sort(params.sort_by.as_deref(), params.order.as_deref());
    sort_records(&mut items, field, descending);

    let limit = params.limit.unwrap_or(50).clamp(1, 500);
    let offset = params.offset.unwrap_or(0);
    let total = items.len();
    let items: Vec<WorkflowRecord> = items.into_iter().skip(offset).take(limit).collect();

    Json(ApiResponse {
        data: WorkflowsData {
            total,
            items,
            limit,
            offset,
        },
        meta: ResponseMeta::new(req_id.0),
    })
}
