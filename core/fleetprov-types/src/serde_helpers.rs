//! Serde adapters for the wire conventions of the provisioning API.
//!
//! Unset object links are transmitted as empty strings rather than `null`.
//! Use with `#[serde(default, with = "fleetprov_types::serde_helpers::optional_id")]`.

/// `Option<ObjectId>` encoded as `""` when `None`.
pub mod optional_id {
    use crate::ObjectId;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<ObjectId>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(id) => serializer.collect_str(id),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<ObjectId>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref() {
            None | Some("") => Ok(None),
            Some(s) => ObjectId::parse(s).map(Some).map_err(serde::de::Error::custom),
        }
    }

    /// Parses the storage/wire form, where `""` means unset.
    pub fn parse(s: &str) -> Result<Option<ObjectId>, uuid::Error> {
        if s.is_empty() {
            Ok(None)
        } else {
            ObjectId::parse(s).map(Some)
        }
    }

    /// Formats to the storage/wire form.
    pub fn format(value: &Option<ObjectId>) -> String {
        value.map(|id| id.to_string()).unwrap_or_default()
    }
}
