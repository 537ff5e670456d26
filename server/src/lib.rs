//! HTTP API for the fleet provisioning store.
//!
//! Handlers are thin: they parse the request, hand the work to the
//! [`StorageService`] on the blocking pool and map failures to [`ApiError`].

mod configuration;
mod entity;
pub mod error;
mod map;
mod radius;
mod resources;

use axum::body::Bytes;
use axum::routing::get;
use axum::{Json, Router};
use fleetprov_model::{
    Contact, DeviceConfiguration, Location, ManagementPolicy, ManagementRole, ModelError,
    RadiusEndpoint,
};
use fleetprov_storage::{ErrorKind, StorageResult, StorageService};
use fleetprov_types::ObjectId;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

pub use error::{ApiError, ErrorBody};

/// Shared handler state.
pub type AppState = Arc<StorageService>;

/// Builds the API router over `service`.
pub fn build_router(service: AppState) -> Router {
    Router::new()
        .route("/api/v1/entity", get(entity::list))
        .route(
            "/api/v1/entity/{id}",
            get(entity::get)
                .post(entity::create)
                .put(entity::update)
                .delete(entity::delete),
        )
        .route(
            "/api/v1/configurations",
            get(resources::list::<DeviceConfiguration>),
        )
        .route(
            "/api/v1/configurations/{id}",
            get(resources::get::<DeviceConfiguration>)
                .post(configuration::create)
                .put(configuration::update)
                .delete(configuration::delete),
        )
        .route(
            "/api/v1/radius_endpoints",
            get(resources::list::<RadiusEndpoint>),
        )
        .route(
            "/api/v1/radius_endpoint/{id}",
            get(resources::get::<RadiusEndpoint>)
                .post(radius::create)
                .put(radius::update)
                .delete(resources::delete::<RadiusEndpoint>),
        )
        .route(
            "/api/v1/managementPolicy",
            get(resources::list::<ManagementPolicy>),
        )
        .route(
            "/api/v1/managementPolicy/{id}",
            get(resources::get::<ManagementPolicy>)
                .post(resources::create::<ManagementPolicy>)
                .put(resources::update::<ManagementPolicy>)
                .delete(resources::delete::<ManagementPolicy>),
        )
        .route("/api/v1/location", get(resources::list::<Location>))
        .route(
            "/api/v1/location/{id}",
            get(resources::get::<Location>)
                .post(resources::create::<Location>)
                .put(resources::update::<Location>)
                .delete(resources::delete::<Location>),
        )
        .route("/api/v1/contact", get(resources::list::<Contact>))
        .route(
            "/api/v1/contact/{id}",
            get(resources::get::<Contact>)
                .post(resources::create::<Contact>)
                .put(resources::update::<Contact>)
                .delete(resources::delete::<Contact>),
        )
        .route(
            "/api/v1/managementRole",
            get(resources::list::<ManagementRole>),
        )
        .route("/api/v1/map", get(map::list))
        .with_state(service)
}

/// `offset`/`limit` query of list routes.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub(crate) struct Page {
    offset: u64,
    limit: u64,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 100,
        }
    }
}

/// Runs a storage call on the blocking pool.
pub(crate) async fn run<T, F>(service: &AppState, f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&StorageService) -> StorageResult<T> + Send + 'static,
{
    let service = Arc::clone(service);
    tokio::task::spawn_blocking(move || f(&service))
        .await
        .map_err(|e| {
            ApiError::new(
                ErrorKind::StorageUnavailable,
                "StorageUnavailable",
                format!("storage task failed: {e}"),
            )
        })?
        .map_err(ApiError::from)
}

pub(crate) fn parse_id(raw: &str) -> Result<ObjectId, ApiError> {
    ObjectId::parse(raw).map_err(|_| ModelError::InvalidId(raw.to_string()).into())
}

pub(crate) fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| ModelError::InvalidJson(e.to_string()).into())
}

/// Like [`parse_body`], but an empty body is the default document.
pub(crate) fn parse_optional_body<T: DeserializeOwned + Default>(
    body: &Bytes,
) -> Result<T, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    parse_body(body)
}

/// Query pairs as borrowed `(key, value)` tuples.
pub(crate) fn pairs(params: &[(String, String)]) -> impl Iterator<Item = (&str, &str)> {
    params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
}

/// `{"<name>": [...]}`, the shape of every list response.
pub(crate) fn collection<T: Serialize>(name: &str, items: Vec<T>) -> Result<Json<Value>, ApiError> {
    let items = serde_json::to_value(items).map_err(|e| {
        ApiError::new(ErrorKind::CorruptRecord, "CorruptRecord", e.to_string())
    })?;
    let mut body = Map::new();
    body.insert(name.to_string(), items);
    Ok(Json(Value::Object(body)))
}
