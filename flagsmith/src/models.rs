//! Attribute-side models and their mapping to the API wire types
//!
//! Each model reads itself from Terraform state (`from_state`), writes itself
//! back (`to_state`) and converts to and from the API structs in
//! [`crate::api::models`].

use std::collections::HashMap;

use tfplug::types::{AttributePath, Dynamic, DynamicValue, Number};
use tfplug::TfplugError;

use crate::api::models::{TAG_BOOLEAN, TAG_INTEGER, TAG_STRING};
use crate::api::{Feature, FeatureState, FeatureStateValue, FeatureType, MultivariateOption};

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("unrecognized value type {0:?}, expected unicode, int or bool")]
    UnknownTag(String),

    #[error("value of type {tag:?} has no {field}")]
    MissingPayload { tag: String, field: &'static str },

    #[error("value of type {tag:?} also sets {field}")]
    ConflictingPayload { tag: String, field: &'static str },

    #[error("integer_value {value} cannot be sent to the API: {source}")]
    InvalidInteger { value: String, source: TfplugError },

    #[error("{0:?} is not a valid feature type, expected STANDARD or MULTIVARIATE")]
    InvalidFeatureType(String),

    #[error("{0} is missing from the API response")]
    MissingField(&'static str),

    #[error("attribute {path}: {source}")]
    Attribute { path: String, source: TfplugError },
}

impl ModelError {
    fn attribute(path: &AttributePath) -> impl FnOnce(TfplugError) -> ModelError + '_ {
        move |source| ModelError::Attribute {
            path: path.to_string(),
            source,
        }
    }
}

type Result<T> = std::result::Result<T, ModelError>;

/// A string, integer or boolean selected by a `unicode`/`int`/`bool` tag.
///
/// In state this is the object `{type, string_value, integer_value,
/// boolean_value}` with only the tagged payload set. Integers stay
/// arbitrary-precision until they are sent to the API.
#[derive(Debug, Clone, PartialEq)]
pub enum TaggedValue {
    String(String),
    Integer(Number),
    Boolean(bool),
}

impl TaggedValue {
    pub fn tag(&self) -> &'static str {
        match self {
            TaggedValue::String(_) => TAG_STRING,
            TaggedValue::Integer(_) => TAG_INTEGER,
            TaggedValue::Boolean(_) => TAG_BOOLEAN,
        }
    }

    /// Reads the value object. A null object, or one whose fields are all
    /// null, is `None`.
    pub fn from_attributes(value: &Dynamic) -> Result<Option<Self>> {
        if value.is_null() || value.is_unknown() {
            return Ok(None);
        }
        let object = DynamicValue::new(value.clone());

        let type_path = AttributePath::new("type");
        let string_path = AttributePath::new("string_value");
        let integer_path = AttributePath::new("integer_value");
        let boolean_path = AttributePath::new("boolean_value");

        let tag = object
            .get_optional_string(&type_path)
            .map_err(ModelError::attribute(&type_path))?;
        let string_value = object
            .get_optional_string(&string_path)
            .map_err(ModelError::attribute(&string_path))?;
        let integer_value = object
            .get_optional_number(&integer_path)
            .map_err(ModelError::attribute(&integer_path))?;
        let boolean_value = object
            .get_optional_bool(&boolean_path)
            .map_err(ModelError::attribute(&boolean_path))?;

        let Some(tag) = tag else {
            if string_value.is_none() && integer_value.is_none() && boolean_value.is_none() {
                return Ok(None);
            }
            return Err(ModelError::Attribute {
                path: type_path.to_string(),
                source: TfplugError::AttributeNotFound("type".to_string()),
            });
        };

        let payloads = [
            (TAG_STRING, "string_value", string_value.is_some()),
            (TAG_INTEGER, "integer_value", integer_value.is_some()),
            (TAG_BOOLEAN, "boolean_value", boolean_value.is_some()),
        ];
        if !payloads.iter().any(|(payload_tag, _, _)| *payload_tag == tag) {
            return Err(ModelError::UnknownTag(tag));
        }
        if let Some((_, field, _)) = payloads
            .iter()
            .find(|(payload_tag, _, set)| *set && *payload_tag != tag)
        {
            return Err(ModelError::ConflictingPayload { tag, field: *field });
        }

        let missing = |field| ModelError::MissingPayload {
            tag: tag.clone(),
            field,
        };
        let value = match tag.as_str() {
            TAG_STRING => TaggedValue::String(string_value.ok_or_else(|| missing("string_value"))?),
            TAG_INTEGER => {
                TaggedValue::Integer(integer_value.ok_or_else(|| missing("integer_value"))?)
            }
            TAG_BOOLEAN => {
                TaggedValue::Boolean(boolean_value.ok_or_else(|| missing("boolean_value"))?)
            }
            _ => return Err(ModelError::UnknownTag(tag.clone())),
        };
        Ok(Some(value))
    }

    /// The value object, inactive payloads set to null
    pub fn to_attributes(&self) -> Dynamic {
        Dynamic::Map(self.attribute_map())
    }

    /// Integers must be whole and fit in 64 bits
    pub fn to_transport(&self) -> Result<FeatureStateValue> {
        Ok(match self {
            TaggedValue::String(s) => FeatureStateValue::String(s.clone()),
            TaggedValue::Integer(n) => {
                FeatureStateValue::Integer(n.as_i64().map_err(|source| {
                    ModelError::InvalidInteger {
                        value: n.to_string(),
                        source,
                    }
                })?)
            }
            TaggedValue::Boolean(b) => FeatureStateValue::Boolean(*b),
        })
    }

    pub fn from_transport(value: &FeatureStateValue) -> Self {
        match value {
            FeatureStateValue::String(s) => TaggedValue::String(s.clone()),
            FeatureStateValue::Integer(i) => TaggedValue::Integer(Number::from_i64(*i)),
            FeatureStateValue::Boolean(b) => TaggedValue::Boolean(*b),
        }
    }

    fn attribute_map(&self) -> HashMap<String, Dynamic> {
        let (string_value, integer_value, boolean_value) = match self {
            TaggedValue::String(s) => (Some(s.clone()), None, None),
            TaggedValue::Integer(n) => (None, Some(n.clone()), None),
            TaggedValue::Boolean(b) => (None, None, Some(*b)),
        };
        HashMap::from([
            ("type".to_string(), Dynamic::from(self.tag())),
            ("string_value".to_string(), Dynamic::from(string_value)),
            ("integer_value".to_string(), Dynamic::from(integer_value)),
            ("boolean_value".to_string(), Dynamic::from(boolean_value)),
        ])
    }
}

fn optional_i64(state: &DynamicValue, path: &AttributePath) -> Result<Option<i64>> {
    state
        .get_optional_number(path)
        .and_then(|n| n.map(|n| n.as_i64()).transpose())
        .map_err(ModelError::attribute(path))
}

fn set(state: &mut DynamicValue, name: &str, value: impl Into<Dynamic>) -> Result<()> {
    let path = AttributePath::new(name);
    state
        .set(&path, value)
        .map_err(ModelError::attribute(&path))
}

/// State of `flagsmith_feature_state`
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureStateData {
    pub id: Option<i64>,
    pub enabled: bool,
    pub feature_state_value: Option<TaggedValue>,
    pub feature: Option<i64>,
    pub environment: Option<i64>,
    pub environment_key: String,
    pub feature_name: String,
}

impl FeatureStateData {
    /// The composite key `(environment_key, feature_name)`, the only
    /// attributes present right after import
    pub fn key_from_state(state: &DynamicValue) -> Result<(String, String)> {
        let env_path = AttributePath::new("environment_key");
        let name_path = AttributePath::new("feature_name");
        let environment_key = state
            .get_string(&env_path)
            .map_err(ModelError::attribute(&env_path))?;
        let feature_name = state
            .get_string(&name_path)
            .map_err(ModelError::attribute(&name_path))?;
        Ok((environment_key, feature_name))
    }

    pub fn from_state(state: &DynamicValue) -> Result<Self> {
        let (environment_key, feature_name) = Self::key_from_state(state)?;

        let enabled_path = AttributePath::new("enabled");
        let enabled = state
            .get_bool(&enabled_path)
            .map_err(ModelError::attribute(&enabled_path))?;

        let value_path = AttributePath::new("feature_state_value");
        let feature_state_value = match state.get(&value_path) {
            Ok(value) => TaggedValue::from_attributes(value)?,
            Err(TfplugError::AttributeNotFound(_)) => None,
            Err(e) => return Err(ModelError::attribute(&value_path)(e)),
        };

        Ok(Self {
            id: optional_i64(state, &AttributePath::new("id"))?,
            enabled,
            feature_state_value,
            feature: optional_i64(state, &AttributePath::new("feature"))?,
            environment: optional_i64(state, &AttributePath::new("environment"))?,
            environment_key,
            feature_name,
        })
    }

    pub fn to_state(&self) -> Result<DynamicValue> {
        let mut state = DynamicValue::object();
        set(&mut state, "id", self.id)?;
        set(&mut state, "enabled", self.enabled)?;
        set(
            &mut state,
            "feature_state_value",
            self.feature_state_value
                .as_ref()
                .map(TaggedValue::to_attributes)
                .unwrap_or(Dynamic::Null),
        )?;
        set(&mut state, "feature", self.feature)?;
        set(&mut state, "environment", self.environment)?;
        set(&mut state, "environment_key", self.environment_key.as_str())?;
        set(&mut state, "feature_name", self.feature_name.as_str())?;
        Ok(state)
    }

    /// The ids come from the API, never from state
    pub fn to_client(
        &self,
        feature_state_id: i64,
        feature: i64,
        environment: i64,
    ) -> Result<FeatureState> {
        Ok(FeatureState {
            id: feature_state_id,
            feature_state_value: self
                .feature_state_value
                .as_ref()
                .map(TaggedValue::to_transport)
                .transpose()?,
            enabled: self.enabled,
            feature,
            environment,
        })
    }

    pub fn from_client(
        feature_state: &FeatureState,
        environment_key: &str,
        feature_name: &str,
    ) -> Self {
        Self {
            id: Some(feature_state.id),
            enabled: feature_state.enabled,
            feature_state_value: feature_state
                .feature_state_value
                .as_ref()
                .map(TaggedValue::from_transport),
            feature: Some(feature_state.feature),
            environment: Some(feature_state.environment),
            environment_key: environment_key.to_string(),
            feature_name: feature_name.to_string(),
        }
    }
}

/// One element of `multivariate_options`
#[derive(Debug, Clone, PartialEq)]
pub struct MultivariateOptionData {
    pub id: Option<i64>,
    pub value: TaggedValue,
    pub default_percentage_allocation: Number,
}

impl MultivariateOptionData {
    pub fn from_attributes(value: &Dynamic) -> Result<Self> {
        let object = DynamicValue::new(value.clone());

        let tagged = TaggedValue::from_attributes(value)?.ok_or_else(|| ModelError::Attribute {
            path: "type".to_string(),
            source: TfplugError::AttributeNotFound("type".to_string()),
        })?;

        let allocation_path = AttributePath::new("default_percentage_allocation");
        let default_percentage_allocation = object
            .get_number(&allocation_path)
            .map_err(ModelError::attribute(&allocation_path))?;

        Ok(Self {
            id: optional_i64(&object, &AttributePath::new("id"))?,
            value: tagged,
            default_percentage_allocation,
        })
    }

    pub fn to_attributes(&self) -> Dynamic {
        let mut map = self.value.attribute_map();
        map.insert("id".to_string(), Dynamic::from(self.id));
        map.insert(
            "default_percentage_allocation".to_string(),
            Dynamic::from(self.default_percentage_allocation.clone()),
        );
        Dynamic::Map(map)
    }

    pub fn from_state(state: &DynamicValue) -> Result<Self> {
        Self::from_attributes(&state.value)
    }

    pub fn to_state(&self) -> DynamicValue {
        DynamicValue::new(self.to_attributes())
    }

    pub fn to_client(&self) -> Result<MultivariateOption> {
        Ok(MultivariateOption {
            id: self.id,
            value: self.value.to_transport()?,
            default_percentage_allocation: self.default_percentage_allocation.as_f64(),
        })
    }

    pub fn from_client(option: &MultivariateOption) -> Result<Self> {
        let allocation_path = AttributePath::new("default_percentage_allocation");
        Ok(Self {
            id: option.id,
            value: TaggedValue::from_transport(&option.value),
            default_percentage_allocation: Number::from_f64(option.default_percentage_allocation)
                .map_err(ModelError::attribute(&allocation_path))?,
        })
    }
}

/// State of `flagsmith_feature`
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureData {
    pub uuid: Option<String>,
    pub id: Option<i64>,
    pub feature_name: String,
    pub feature_type: Option<FeatureType>,
    pub description: Option<String>,
    pub initial_value: Option<String>,
    pub default_enabled: bool,
    pub is_archived: bool,
    pub owners: Option<Vec<i64>>,
    pub multivariate_options: Option<Vec<MultivariateOptionData>>,
    pub project_id: Option<i64>,
    pub project_uuid: String,
}

impl FeatureData {
    pub fn from_state(state: &DynamicValue) -> Result<Self> {
        let string = |name: &str| {
            let path = AttributePath::new(name);
            state
                .get_optional_string(&path)
                .map_err(ModelError::attribute(&path))
        };
        let flag = |name: &str| {
            let path = AttributePath::new(name);
            state
                .get_optional_bool(&path)
                .map(Option::unwrap_or_default)
                .map_err(ModelError::attribute(&path))
        };

        let name_path = AttributePath::new("feature_name");
        let feature_name = state
            .get_string(&name_path)
            .map_err(ModelError::attribute(&name_path))?;
        let project_path = AttributePath::new("project_uuid");
        let project_uuid = state
            .get_string(&project_path)
            .map_err(ModelError::attribute(&project_path))?;

        let feature_type = string("type")?
            .map(|t| FeatureType::parse(&t).ok_or(ModelError::InvalidFeatureType(t)))
            .transpose()?;

        let owners_path = AttributePath::new("owners");
        let owners = state
            .get_optional_list(&owners_path)
            .map_err(ModelError::attribute(&owners_path))?
            .map(|owners| {
                owners
                    .iter()
                    .enumerate()
                    .map(|(i, owner)| {
                        let path = owners_path.clone().index(i as i64);
                        owner
                            .as_number()
                            .ok_or_else(|| TfplugError::TypeMismatch {
                                expected: "number".to_string(),
                                actual: owner.type_name().to_string(),
                            })
                            .and_then(Number::as_i64)
                            .map_err(ModelError::attribute(&path))
                    })
                    .collect::<Result<Vec<_>>>()
            })
            .transpose()?;

        let options_path = AttributePath::new("multivariate_options");
        let multivariate_options = state
            .get_optional_list(&options_path)
            .map_err(ModelError::attribute(&options_path))?
            .map(|options| {
                options
                    .iter()
                    .map(MultivariateOptionData::from_attributes)
                    .collect::<Result<Vec<_>>>()
            })
            .transpose()?;

        Ok(Self {
            uuid: string("uuid")?,
            id: optional_i64(state, &AttributePath::new("id"))?,
            feature_name,
            feature_type,
            description: string("description")?,
            initial_value: string("initial_value")?,
            default_enabled: flag("default_enabled")?,
            is_archived: flag("is_archived")?,
            owners,
            multivariate_options,
            project_id: optional_i64(state, &AttributePath::new("project_id"))?,
            project_uuid,
        })
    }

    pub fn to_state(&self) -> Result<DynamicValue> {
        let mut state = DynamicValue::object();
        set(&mut state, "uuid", self.uuid.clone())?;
        set(&mut state, "id", self.id)?;
        set(&mut state, "feature_name", self.feature_name.as_str())?;
        set(
            &mut state,
            "type",
            self.feature_type.map(|t| t.as_str().to_string()),
        )?;
        set(&mut state, "description", self.description.clone())?;
        set(&mut state, "initial_value", self.initial_value.clone())?;
        set(&mut state, "default_enabled", self.default_enabled)?;
        set(&mut state, "is_archived", self.is_archived)?;
        set(
            &mut state,
            "owners",
            self.owners
                .as_ref()
                .map(|owners| Dynamic::List(owners.iter().copied().map(Dynamic::from).collect())),
        )?;
        set(
            &mut state,
            "multivariate_options",
            self.multivariate_options.as_ref().map(|options| {
                Dynamic::List(
                    options
                        .iter()
                        .map(MultivariateOptionData::to_attributes)
                        .collect(),
                )
            }),
        )?;
        set(&mut state, "project_id", self.project_id)?;
        set(&mut state, "project_uuid", self.project_uuid.as_str())?;
        Ok(state)
    }

    pub fn to_client(&self) -> Result<Feature> {
        Ok(Feature {
            name: self.feature_name.clone(),
            id: self.id,
            uuid: self.uuid.clone(),
            feature_type: self.feature_type,
            description: self.description.clone(),
            initial_value: self.initial_value.clone(),
            default_enabled: self.default_enabled,
            is_archived: self.is_archived,
            owners: self.owners.clone(),
            multivariate_options: self
                .multivariate_options
                .as_ref()
                .map(|options| {
                    options
                        .iter()
                        .map(MultivariateOptionData::to_client)
                        .collect::<Result<Vec<_>>>()
                })
                .transpose()?,
            project_id: self.project_id,
        })
    }

    /// Multivariate options come back sorted by id so that state does not
    /// depend on the order the API lists them in. A feature without options
    /// has a null list.
    pub fn from_client(feature: &Feature, project_uuid: &str) -> Result<Self> {
        let multivariate_options = match feature.multivariate_options.as_deref() {
            None | Some([]) => None,
            Some(options) => {
                let mut options = options
                    .iter()
                    .map(MultivariateOptionData::from_client)
                    .collect::<Result<Vec<_>>>()?;
                options.sort_by_key(|option| option.id);
                Some(options)
            }
        };

        Ok(Self {
            uuid: Some(feature.uuid.clone().ok_or(ModelError::MissingField("uuid"))?),
            id: Some(feature.id.ok_or(ModelError::MissingField("id"))?),
            feature_name: feature.name.clone(),
            feature_type: Some(feature.feature_type.unwrap_or(FeatureType::Standard)),
            description: feature.description.clone(),
            initial_value: feature.initial_value.clone(),
            default_enabled: feature.default_enabled,
            is_archived: feature.is_archived,
            owners: feature.owners.clone(),
            multivariate_options,
            project_id: feature.project_id,
            project_uuid: project_uuid.to_string(),
        })
    }
}
