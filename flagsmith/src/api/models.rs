//! Wire types of the Flagsmith Admin API

use serde::{Deserialize, Serialize};
use std::fmt;

/// Type tags used by the API for feature state values
pub const TAG_STRING: &str = "unicode";
pub const TAG_INTEGER: &str = "int";
pub const TAG_BOOLEAN: &str = "bool";

/// A feature state (or multivariate option) value.
///
/// On the wire this is `{"type", "string_value", "integer_value",
/// "boolean_value"}` where only the field named by `type` carries the
/// payload. Decoding rejects unknown tags, a tag whose payload is null and
/// a payload set beside the tagged one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawFeatureStateValue", into = "RawFeatureStateValue")]
pub enum FeatureStateValue {
    String(String),
    Integer(i64),
    Boolean(bool),
}

impl FeatureStateValue {
    pub fn tag(&self) -> &'static str {
        match self {
            FeatureStateValue::String(_) => TAG_STRING,
            FeatureStateValue::Integer(_) => TAG_INTEGER,
            FeatureStateValue::Boolean(_) => TAG_BOOLEAN,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawFeatureStateValue {
    #[serde(rename = "type")]
    pub value_type: String,
    #[serde(default)]
    pub string_value: Option<String>,
    #[serde(default)]
    pub integer_value: Option<i64>,
    #[serde(default)]
    pub boolean_value: Option<bool>,
}

impl RawFeatureStateValue {
    /// The API sends a value object with every payload null when nothing is set
    pub fn is_empty(&self) -> bool {
        self.string_value.is_none() && self.integer_value.is_none() && self.boolean_value.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValueTagError {
    #[error("unrecognized feature state value type {0:?}, expected unicode, int or bool")]
    UnknownTag(String),
    #[error("feature state value of type {0:?} has no {1}")]
    MissingPayload(String, &'static str),
    #[error("feature state value of type {0:?} also sets {1}")]
    ConflictingPayload(String, &'static str),
}

impl TryFrom<RawFeatureStateValue> for FeatureStateValue {
    type Error = ValueTagError;

    fn try_from(raw: RawFeatureStateValue) -> Result<Self, Self::Error> {
        let missing = |field| ValueTagError::MissingPayload(raw.value_type.clone(), field);
        let tag = raw.value_type.as_str();
        let payloads = [
            (TAG_STRING, "string_value", raw.string_value.is_some()),
            (TAG_INTEGER, "integer_value", raw.integer_value.is_some()),
            (TAG_BOOLEAN, "boolean_value", raw.boolean_value.is_some()),
        ];
        if !payloads.iter().any(|(payload_tag, _, _)| *payload_tag == tag) {
            return Err(ValueTagError::UnknownTag(tag.to_string()));
        }
        if let Some((_, field, _)) = payloads
            .iter()
            .find(|(payload_tag, _, set)| *set && *payload_tag != tag)
        {
            return Err(ValueTagError::ConflictingPayload(tag.to_string(), *field));
        }

        match tag {
            TAG_STRING => raw
                .string_value
                .clone()
                .map(FeatureStateValue::String)
                .ok_or_else(|| missing("string_value")),
            TAG_INTEGER => raw
                .integer_value
                .map(FeatureStateValue::Integer)
                .ok_or_else(|| missing("integer_value")),
            TAG_BOOLEAN => raw
                .boolean_value
                .map(FeatureStateValue::Boolean)
                .ok_or_else(|| missing("boolean_value")),
            other => Err(ValueTagError::UnknownTag(other.to_string())),
        }
    }
}

impl From<FeatureStateValue> for RawFeatureStateValue {
    fn from(value: FeatureStateValue) -> Self {
        let value_type = value.tag().to_string();
        match value {
            FeatureStateValue::String(s) => Self {
                value_type,
                string_value: Some(s),
                ..Default::default()
            },
            FeatureStateValue::Integer(i) => Self {
                value_type,
                integer_value: Some(i),
                ..Default::default()
            },
            FeatureStateValue::Boolean(b) => Self {
                value_type,
                boolean_value: Some(b),
                ..Default::default()
            },
        }
    }
}

/// Optional value field: a null object or an object with every payload
/// null both decode as `None`
pub(crate) mod optional_value {
    use super::{FeatureStateValue, RawFeatureStateValue};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<FeatureStateValue>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<RawFeatureStateValue>::deserialize(deserializer)? {
            Some(raw) if !raw.is_empty() => FeatureStateValue::try_from(raw)
                .map(Some)
                .map_err(serde::de::Error::custom),
            _ => Ok(None),
        }
    }

    pub fn serialize<S>(value: &Option<FeatureStateValue>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.serialize(serializer)
    }
}

/// Feature state of one feature in one environment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureState {
    pub id: i64,
    #[serde(default, with = "optional_value")]
    pub feature_state_value: Option<FeatureStateValue>,
    pub enabled: bool,
    pub feature: i64,
    pub environment: i64,
}

/// Paginated list wrapper used by list endpoints
#[derive(Debug, Deserialize)]
pub struct Paginated<T> {
    #[serde(default)]
    pub count: Option<usize>,
    pub results: Vec<T>,
}

/// Feature type, `STANDARD` unless it has multivariate options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeatureType {
    Standard,
    Multivariate,
}

impl FeatureType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureType::Standard => "STANDARD",
            FeatureType::Multivariate => "MULTIVARIATE",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "STANDARD" => Some(FeatureType::Standard),
            "MULTIVARIATE" => Some(FeatureType::Multivariate),
            _ => None,
        }
    }
}

impl fmt::Display for FeatureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One weighted variant of a multivariate feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultivariateOption {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(flatten)]
    pub value: FeatureStateValue,
    pub default_percentage_allocation: f64,
}

/// Feature definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub feature_type: Option<FeatureType>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_value: Option<String>,
    #[serde(default)]
    pub default_enabled: bool,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owners: Option<Vec<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multivariate_options: Option<Vec<MultivariateOption>>,
    #[serde(rename = "project", default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<i64>,
}

/// The subset of a project needed to address feature endpoints
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Project {
    pub id: i64,
    pub uuid: String,
    pub name: String,
}
