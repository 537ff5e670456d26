//! Relation commands carried by entity updates.
//!
//! On the wire they are `add=con:<uuid>`-style tokens; they are parsed once
//! at the request boundary into [`RelationCommand`] values.

use crate::{ModelError, ModelResult};
use fleetprov_types::{ObjectId, Reference};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationVerb {
    Add,
    Del,
}

impl RelationVerb {
    /// Recognizes a command key. Anything else is not a command.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "add" => Some(Self::Add),
            "del" => Some(Self::Del),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Del => "del",
        }
    }
}

/// Which entity relation a command touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationKind {
    Contact,
    Location,
}

impl RelationKind {
    /// Store prefix of the relation's target.
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Contact => "con",
            Self::Location => "loc",
        }
    }

    pub fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "con" => Some(Self::Contact),
            "loc" => Some(Self::Location),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RelationCommand {
    pub verb: RelationVerb,
    pub kind: RelationKind,
    pub target: ObjectId,
}

impl RelationCommand {
    pub fn add(kind: RelationKind, target: ObjectId) -> Self {
        Self {
            verb: RelationVerb::Add,
            kind,
            target,
        }
    }

    pub fn del(kind: RelationKind, target: ObjectId) -> Self {
        Self {
            verb: RelationVerb::Del,
            kind,
            target,
        }
    }

    /// The target as a `prefix:uuid` reference.
    pub fn target_reference(&self) -> Reference {
        Reference::new(self.kind.prefix(), self.target)
    }

    /// Parses one `(key, token)` pair such as `("add", "con:<uuid>")`.
    ///
    /// Returns `Ok(None)` when `key` is not a command verb, so that ordinary
    /// query parameters can be fed through unchanged.
    pub fn parse(key: &str, token: &str) -> ModelResult<Option<Self>> {
        let Some(verb) = RelationVerb::from_key(key) else {
            return Ok(None);
        };
        let invalid = || ModelError::InvalidCommand(format!("{key}={token}"));
        let (prefix, id) = Reference::split_token(token).ok_or_else(invalid)?;
        let kind = RelationKind::from_prefix(prefix).ok_or_else(invalid)?;
        let target = ObjectId::parse(id).map_err(|_| invalid())?;
        Ok(Some(Self { verb, kind, target }))
    }

    /// Parses the `add=con:<uuid>` string form.
    pub fn parse_assignment(s: &str) -> ModelResult<Self> {
        let (key, token) = s
            .split_once('=')
            .ok_or_else(|| ModelError::InvalidCommand(s.to_string()))?;
        Self::parse(key, token)?.ok_or_else(|| ModelError::InvalidCommand(s.to_string()))
    }

    /// Collects every command among `pairs`, skipping non-command keys.
    pub fn parse_pairs<'a, I>(pairs: I) -> ModelResult<Vec<Self>>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut commands = Vec::new();
        for (key, token) in pairs {
            if let Some(cmd) = Self::parse(key, token)? {
                commands.push(cmd);
            }
        }
        Ok(commands)
    }
}

impl fmt::Display for RelationCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.verb.as_str(), self.target_reference())
    }
}
