//! Core type definitions for the fleet provisioning store.
//!
//! This crate defines the small, storage-agnostic types every other crate
//! depends on:
//! - Object identifiers (UUID v7) and the well-known root entity id
//! - Composite `prefix:uuid` references used for in-use tracking
//! - Epoch-second timestamps
//!
//! Domain objects (entities, policies, contacts, ...) live in
//! `fleetprov-model`, not here.

mod ids;
mod reference;
pub mod serde_helpers;
mod timestamp;

pub use ids::{ObjectId, ROOT_ENTITY_ID};
pub use reference::Reference;
pub use timestamp::{now, Timestamp};

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid UUID: {0}")]
    InvalidUuid(#[from] uuid::Error),

    #[error("invalid reference '{0}': expected <prefix>:<uuid>")]
    InvalidReference(String),
}
