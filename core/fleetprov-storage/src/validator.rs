//! Prefix-keyed reference validation.
//!
//! Request parameters and stored in-use sets carry `prefix:uuid` tokens. The
//! [`ReferenceValidator`] maps each prefix to the table that can answer
//! whether the id exists. It is assembled once at startup and never changes.

use crate::{StorageError, StorageResult};
use fleetprov_types::{ObjectId, Reference};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::debug;

/// Something a `prefix:uuid` token can point into.
pub trait ReferenceTarget: Send + Sync {
    /// Whether any row has `field = value`.
    fn exists(&self, field: &str, value: &str) -> StorageResult<bool>;

    /// Name and description of the row with `id`, if it exists.
    fn describe(&self, id: ObjectId) -> StorageResult<Option<(String, String)>>;
}

/// One resolved entry of an expanded in-use set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceInfo {
    pub uuid: ObjectId,
    pub name: String,
    pub description: String,
}

/// In-use references grouped by store prefix, plus the ones that did not
/// resolve.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InUseExpansion {
    pub entries: BTreeMap<String, Vec<ReferenceInfo>>,
    pub errors: Vec<String>,
}

#[derive(Default)]
pub struct ReferenceValidatorBuilder {
    targets: BTreeMap<String, Arc<dyn ReferenceTarget>>,
}

impl ReferenceValidatorBuilder {
    pub fn register(mut self, prefix: &str, target: Arc<dyn ReferenceTarget>) -> Self {
        self.targets.insert(prefix.to_string(), target);
        self
    }

    pub fn build(self) -> ReferenceValidator {
        ReferenceValidator {
            targets: Arc::new(self.targets),
        }
    }
}

/// Immutable registry from prefix to existence check.
#[derive(Clone)]
pub struct ReferenceValidator {
    targets: Arc<BTreeMap<String, Arc<dyn ReferenceTarget>>>,
}

impl ReferenceValidator {
    pub fn builder() -> ReferenceValidatorBuilder {
        ReferenceValidatorBuilder::default()
    }

    pub fn is_registered(&self, prefix: &str) -> bool {
        self.targets.contains_key(prefix)
    }

    pub fn prefixes(&self) -> impl Iterator<Item = &str> {
        self.targets.keys().map(String::as_str)
    }

    /// Checks one token.
    ///
    /// Tokens without a `:` and tokens with an unregistered prefix are not
    /// references and pass. A registered prefix whose id is not a UUID or
    /// does not exist fails with `UnknownReference`.
    pub fn validate_token(&self, token: &str) -> StorageResult<()> {
        let Some((prefix, id)) = Reference::split_token(token) else {
            return Ok(());
        };
        let Some(target) = self.targets.get(prefix) else {
            return Ok(());
        };
        let Ok(id) = ObjectId::parse(id) else {
            return Err(StorageError::unknown_reference(prefix, id));
        };
        if target.exists(fleetprov_model::PRIMARY_KEY, &id.to_string())? {
            Ok(())
        } else {
            debug!(prefix, %id, "reference does not resolve");
            Err(StorageError::unknown_reference(prefix, id))
        }
    }

    /// Validates every token, stopping at the first failure.
    pub fn validate_all<'a, I>(&self, tokens: I) -> StorageResult<()>
    where
        I: IntoIterator<Item = &'a str>,
    {
        tokens
            .into_iter()
            .try_for_each(|token| self.validate_token(token))
    }

    /// Validates the values of `(key, value)` query parameters.
    pub fn validate_pairs<'a, I>(&self, pairs: I) -> StorageResult<()>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        self.validate_all(pairs.into_iter().map(|(_, value)| value))
    }

    /// Resolves an in-use set into `{prefix: [{uuid, name, description}]}`.
    /// References that do not resolve are reported in `errors`.
    pub fn expand_in_use(&self, references: &BTreeSet<Reference>) -> StorageResult<InUseExpansion> {
        let mut expansion = InUseExpansion::default();
        for reference in references {
            let Some(target) = self.targets.get(reference.prefix()) else {
                expansion
                    .errors
                    .push(format!("{reference}: unknown prefix"));
                continue;
            };
            match target.describe(reference.id())? {
                Some((name, description)) => expansion
                    .entries
                    .entry(reference.prefix().to_string())
                    .or_default()
                    .push(ReferenceInfo {
                        uuid: reference.id(),
                        name,
                        description,
                    }),
                None => expansion.errors.push(format!("{reference}: not found")),
            }
        }
        Ok(expansion)
    }
}
