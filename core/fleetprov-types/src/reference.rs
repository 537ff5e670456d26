//! Composite `prefix:uuid` references.
//!
//! A reference names an object together with the store it lives in, e.g.
//! `ent:0190c1f2-...`. In-use sets on shared resources are sets of these.

use crate::{Error, ObjectId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A typed pointer to an object in a specific store.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Reference {
    prefix: String,
    id: ObjectId,
}

impl Reference {
    /// Creates a reference to `id` in the store identified by `prefix`.
    pub fn new(prefix: impl Into<String>, id: ObjectId) -> Self {
        Self {
            prefix: prefix.into(),
            id,
        }
    }

    /// The store prefix (e.g. `ent`, `pol`).
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The referenced object's id.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Splits a token on its first `:` without validating the id part.
    pub fn split_token(token: &str) -> Option<(&str, &str)> {
        token.split_once(':')
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.prefix, self.id)
    }
}

impl FromStr for Reference {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix, id) =
            Self::split_token(s).ok_or_else(|| Error::InvalidReference(s.to_string()))?;
        if prefix.is_empty() {
            return Err(Error::InvalidReference(s.to_string()));
        }
        Ok(Self::new(prefix, ObjectId::parse(id)?))
    }
}

impl TryFrom<String> for Reference {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Reference> for String {
    fn from(value: Reference) -> Self {
        value.to_string()
    }
}
