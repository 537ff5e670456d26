//! RADIUS endpoints.
//!
//! Clients send a [`RadiusEndpointDocument`] whose enum fields are plain
//! strings, so each problem can be reported in a fixed order:
//! type, pool strategy, server pools, index. [`RadiusEndpointDocument::validate`]
//! turns a document into the typed [`RadiusEndpoint`] that gets stored.

use crate::object::domain_object;
use crate::{ModelError, ModelResult, ObjectInfo};
use fleetprov_types::Reference;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RadiusEndpointType {
    #[default]
    Radius,
    Radsec,
}

impl RadiusEndpointType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Radius => "radius",
            Self::Radsec => "radsec",
        }
    }
}

impl fmt::Display for RadiusEndpointType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RadiusEndpointType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "radius" => Ok(Self::Radius),
            "radsec" => Ok(Self::Radsec),
            other => Err(ModelError::InvalidRadiusType(other.to_string())),
        }
    }
}

/// How requests are spread over the servers of an endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PoolStrategy {
    #[default]
    None,
    Random,
    Weighted,
}

impl PoolStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Random => "random",
            Self::Weighted => "weighted",
        }
    }
}

impl fmt::Display for PoolStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PoolStrategy {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "random" => Ok(Self::Random),
            "weighted" => Ok(Self::Weighted),
            other => Err(ModelError::InvalidPoolStrategy(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RadiusServer {
    pub hostname: String,
    pub ip: String,
    pub port: u16,
    pub secret: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RadsecServer {
    pub hostname: String,
    pub ip: String,
    pub port: u16,
    pub certificate: String,
    pub private_key: String,
    pub ca_certs: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RadiusEndpoint {
    #[serde(flatten)]
    pub info: ObjectInfo,
    #[serde(rename = "type")]
    pub endpoint_type: RadiusEndpointType,
    pub pool_strategy: PoolStrategy,
    pub radius_servers: Vec<RadiusServer>,
    pub radsec_servers: Vec<RadsecServer>,
    pub index: String,
    #[serde(rename = "useGWProxy")]
    pub use_gw_proxy: bool,
    pub in_use: BTreeSet<Reference>,
}

domain_object!(RadiusEndpoint, shared);

impl RadiusEndpoint {
    /// An endpoint serves exactly one kind of server pool.
    pub fn check_server_pools(&self) -> ModelResult<()> {
        if !self.radius_servers.is_empty() && !self.radsec_servers.is_empty() {
            return Err(ModelError::DualServerPools);
        }
        Ok(())
    }
}

/// Client-facing shape of a RADIUS endpoint, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RadiusEndpointDocument {
    #[serde(flatten)]
    pub info: ObjectInfo,
    #[serde(rename = "type")]
    pub endpoint_type: String,
    pub pool_strategy: String,
    pub radius_servers: Vec<RadiusServer>,
    pub radsec_servers: Vec<RadsecServer>,
    pub index: String,
    #[serde(rename = "useGWProxy")]
    pub use_gw_proxy: bool,
}

impl RadiusEndpointDocument {
    /// Parses a request body. Any JSON or shape error is `InvalidJson`.
    pub fn from_json(body: &[u8]) -> ModelResult<Self> {
        serde_json::from_slice(body).map_err(|e| ModelError::InvalidJson(e.to_string()))
    }

    /// Checks the document and produces the typed endpoint.
    pub fn validate(self) -> ModelResult<RadiusEndpoint> {
        let endpoint_type: RadiusEndpointType = self.endpoint_type.parse()?;
        let pool_strategy: PoolStrategy = self.pool_strategy.parse()?;
        let endpoint = RadiusEndpoint {
            info: self.info,
            endpoint_type,
            pool_strategy,
            radius_servers: self.radius_servers,
            radsec_servers: self.radsec_servers,
            index: self.index,
            use_gw_proxy: self.use_gw_proxy,
            in_use: BTreeSet::new(),
        };
        endpoint.check_server_pools()?;
        if endpoint.index.is_empty() {
            return Err(ModelError::EmptyIndex);
        }
        Ok(endpoint)
    }
}
