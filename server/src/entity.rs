//! Entity routes.
//!
//! A PUT carries ordinary field updates in its body and relation commands
//! either as query parameters (`?add=con:<uuid>`) or as a body `commands`
//! array. Every query value is checked against the reference validator
//! before the hierarchy is touched.

use crate::{
    collection, pairs, parse_body, parse_id, parse_optional_body, run, ApiError, AppState, Page,
};
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use fleetprov_model::{Entity, NoteInfo, RelationCommand};
use fleetprov_storage::{EntityUpdate, ErrorKind, StorageError};
use fleetprov_types::ObjectId;
use serde::Deserialize;

pub(crate) async fn list(
    State(service): State<AppState>,
    Query(page): Query<Page>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let entities = run(&service, move |svc| {
        svc.hierarchy().entities().list(page.offset, page.limit)
    })
    .await?;
    collection("entities", entities)
}

pub(crate) async fn get(
    State(service): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Entity>, ApiError> {
    let id = parse_id(&id)?;
    let entity = run(&service, move |svc| {
        svc.hierarchy()
            .get(id)?
            .ok_or_else(|| StorageError::not_found(svc.hierarchy().entities().name(), id))
    })
    .await?;
    Ok(Json(entity))
}

/// POST to the root id creates the root; any other id creates a child of the
/// body's `parent`.
pub(crate) async fn create(
    State(service): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
    body: Bytes,
) -> Result<Json<Entity>, ApiError> {
    let id = parse_id(&id)?;
    let entity: Entity = parse_body(&body)?;
    let parent = match (id.is_root(), entity.parent) {
        (true, _) => None,
        (false, Some(parent)) => Some(parent),
        (false, None) => {
            return Err(ApiError::new(
                ErrorKind::InvalidInput,
                "ParentNotFound",
                "a non-root entity needs a parent",
            ))
        }
    };

    let created = run(&service, move |svc| {
        svc.validator().validate_pairs(pairs(&params))?;
        match parent {
            None => svc.hierarchy().create_root(entity),
            Some(parent) => svc.hierarchy().create_child(parent, entity),
        }
    })
    .await?;
    Ok(Json(created))
}

/// Body of an entity PUT. Links sent as `""` are unset.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct EntityUpdateBody {
    name: Option<String>,
    description: Option<String>,
    rrm: Option<String>,
    notes: Vec<NoteInfo>,
    device_configuration: Option<String>,
    management_policy: Option<String>,
    commands: Vec<String>,
}

fn link(value: Option<String>) -> Result<Option<Option<ObjectId>>, ApiError> {
    match value.as_deref() {
        None => Ok(None),
        Some("") => Ok(Some(None)),
        Some(raw) => parse_id(raw).map(|id| Some(Some(id))),
    }
}

impl EntityUpdateBody {
    fn into_update(self, query: &[(String, String)]) -> Result<EntityUpdate, ApiError> {
        let mut commands = RelationCommand::parse_pairs(pairs(query))?;
        for command in &self.commands {
            commands.push(RelationCommand::parse_assignment(command)?);
        }
        Ok(EntityUpdate {
            name: self.name,
            description: self.description,
            rrm: self.rrm,
            notes: self.notes,
            device_configuration: link(self.device_configuration)?,
            management_policy: link(self.management_policy)?,
            commands,
        })
    }
}

pub(crate) async fn update(
    State(service): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
    body: Bytes,
) -> Result<Json<Entity>, ApiError> {
    let id = parse_id(&id)?;
    let update = parse_optional_body::<EntityUpdateBody>(&body)?.into_update(&params)?;

    let updated = run(&service, move |svc| {
        svc.validator().validate_pairs(pairs(&params))?;
        svc.hierarchy().update(id, update)
    })
    .await?;
    Ok(Json(updated))
}

pub(crate) async fn delete(
    State(service): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    run(&service, move |svc| svc.hierarchy().delete(id)).await?;
    Ok(StatusCode::OK)
}
