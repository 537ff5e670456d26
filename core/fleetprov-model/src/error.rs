//! Validation errors for client-supplied documents.

use thiserror::Error;

/// Result type for model validation.
pub type ModelResult<T> = Result<T, ModelError>;

/// Reasons a client document is rejected before it reaches storage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// Body did not parse as the expected JSON shape.
    #[error("invalid JSON document: {0}")]
    InvalidJson(String),

    /// The request did not name the object it applies to.
    #[error("missing object id")]
    MissingId,

    /// An id that should be a UUID was not one.
    #[error("invalid object id '{0}'")]
    InvalidId(String),

    #[error("invalid RADIUS endpoint type '{0}' (expected radius or radsec)")]
    InvalidRadiusType(String),

    #[error("invalid RADIUS endpoint pool strategy '{0}' (expected none, random or weighted)")]
    InvalidPoolStrategy(String),

    /// Both `radiusServers` and `radsecServers` were populated.
    #[error("endpoint must have only one type of servers")]
    DualServerPools,

    #[error("RADIUS endpoint index must not be empty")]
    EmptyIndex,

    /// A relation command token could not be parsed.
    #[error("invalid relation command '{0}'")]
    InvalidCommand(String),
}

impl ModelError {
    /// Stable machine-readable code, reported alongside the message.
    pub fn code(&self) -> &'static str {
        match self {
            ModelError::InvalidJson(_) => "InvalidJSONDocument",
            ModelError::MissingId => "MissingUUID",
            ModelError::InvalidId(_) => "InvalidUUID",
            ModelError::InvalidRadiusType(_) => "InvalidRadiusTypeEndpoint",
            ModelError::InvalidPoolStrategy(_) => "InvalidRadiusEndpointPoolStrategy",
            ModelError::DualServerPools => "EndpointMustHaveOneTypeOfServers",
            ModelError::EmptyIndex => "RadiusEndpointIndexInvalid",
            ModelError::InvalidCommand(_) => "InvalidCommand",
        }
    }
}
