//! RADIUS endpoint writes.
//!
//! Bodies are parsed as a [`RadiusEndpointDocument`] so that a bad `type`,
//! `poolStrategy`, server pool or `index` is reported with its own code
//! before anything is stored.

use crate::{parse_id, run, ApiError, AppState};
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::Json;
use fleetprov_model::{RadiusEndpoint, RadiusEndpointDocument};

pub(crate) async fn create(
    State(service): State<AppState>,
    Path(_id): Path<String>,
    body: Bytes,
) -> Result<Json<RadiusEndpoint>, ApiError> {
    let endpoint = RadiusEndpointDocument::from_json(&body)?.validate()?;
    let created = run(&service, move |svc| {
        svc.stores().radius_endpoints.create_shared(endpoint)
    })
    .await?;
    Ok(Json(created))
}

pub(crate) async fn update(
    State(service): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<RadiusEndpoint>, ApiError> {
    let id = parse_id(&id)?;
    let endpoint = RadiusEndpointDocument::from_json(&body)?.validate()?;
    let updated = run(&service, move |svc| {
        svc.stores().radius_endpoints.replace_shared(id, endpoint)
    })
    .await?;
    Ok(Json(updated))
}
