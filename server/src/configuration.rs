//! Device configurations. Reads go through the generic resource handlers;
//! writes check the policy link and device types first.

use crate::{parse_body, parse_id, run, ApiError, AppState};
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use fleetprov_model::DeviceConfiguration;

pub(crate) async fn create(
    State(service): State<AppState>,
    Path(_id): Path<String>,
    body: Bytes,
) -> Result<Json<DeviceConfiguration>, ApiError> {
    let config: DeviceConfiguration = parse_body(&body)?;
    let created = run(&service, move |svc| svc.create_configuration(config)).await?;
    Ok(Json(created))
}

pub(crate) async fn update(
    State(service): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<DeviceConfiguration>, ApiError> {
    let id = parse_id(&id)?;
    let config: DeviceConfiguration = parse_body(&body)?;
    let updated = run(&service, move |svc| svc.update_configuration(id, config)).await?;
    Ok(Json(updated))
}

pub(crate) async fn delete(
    State(service): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    run(&service, move |svc| svc.delete_configuration(id)).await?;
    Ok(StatusCode::OK)
}
