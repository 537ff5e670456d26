//! Saved map views. Read-only over HTTP.

use crate::{collection, run, ApiError, AppState, Page};
use axum::extract::{Query, State};
use axum::Json;

pub(crate) async fn list(
    State(service): State<AppState>,
    Query(page): Query<Page>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let maps = run(&service, move |svc| svc.stores().maps.list(page.offset, page.limit)).await?;
    collection("list", maps)
}
