//! Generic CRUD over shared resources.

use crate::{collection, parse_body, parse_id, run, ApiError, AppState, Page};
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use fleetprov_model::{
    Contact, DeviceConfiguration, Location, ManagementPolicy, ManagementRole, RadiusEndpoint,
    SharedResource,
};
use fleetprov_storage::{Record, StorageError, Stores, Table};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A shared resource served over HTTP.
pub(crate) trait Resource: Record + SharedResource + Serialize + DeserializeOwned {
    /// Key of the list response.
    const COLLECTION: &'static str;

    fn table(stores: &Stores) -> &Table<Self>;
}

macro_rules! resource {
    ($ty:ty, $collection:literal, $field:ident) => {
        impl Resource for $ty {
            const COLLECTION: &'static str = $collection;

            fn table(stores: &Stores) -> &Table<Self> {
                &stores.$field
            }
        }
    };
}

resource!(ManagementPolicy, "managementPolicies", policies);
resource!(Location, "locations", locations);
resource!(Contact, "contacts", contacts);
resource!(ManagementRole, "roles", roles);
resource!(DeviceConfiguration, "configurations", configurations);
resource!(RadiusEndpoint, "endpoints", radius_endpoints);

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct GetParams {
    expand_in_use: bool,
}

pub(crate) async fn list<T: Resource>(
    State(service): State<AppState>,
    Query(page): Query<Page>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let items = run(&service, move |svc| {
        T::table(svc.stores()).list(page.offset, page.limit)
    })
    .await?;
    collection(T::COLLECTION, items)
}

/// The object, or its resolved in-use set with `expandInUse=true`.
pub(crate) async fn get<T: Resource>(
    State(service): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<GetParams>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    let record = run(&service, move |svc| {
        let table = T::table(svc.stores());
        table
            .get_by_id(id)?
            .ok_or_else(|| StorageError::not_found(table.name(), id))
    })
    .await?;

    if !params.expand_in_use {
        return Ok(Json(record).into_response());
    }
    let references = record.in_use().clone();
    let expansion = run(&service, move |svc| svc.validator().expand_in_use(&references)).await?;
    Ok(Json(expansion).into_response())
}

/// The path id is ignored; the store assigns one.
pub(crate) async fn create<T: Resource>(
    State(service): State<AppState>,
    Path(_id): Path<String>,
    body: Bytes,
) -> Result<Json<T>, ApiError> {
    let record: T = parse_body(&body)?;
    let created = run(&service, move |svc| T::table(svc.stores()).create_shared(record)).await?;
    Ok(Json(created))
}

pub(crate) async fn update<T: Resource>(
    State(service): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<T>, ApiError> {
    let id = parse_id(&id)?;
    let record: T = parse_body(&body)?;
    let updated = run(&service, move |svc| {
        T::table(svc.stores()).replace_shared(id, record)
    })
    .await?;
    Ok(Json(updated))
}

pub(crate) async fn delete<T: Resource>(
    State(service): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    run(&service, move |svc| T::table(svc.stores()).delete_shared(id)).await?;
    Ok(StatusCode::OK)
}
