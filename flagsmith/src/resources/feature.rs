//! Feature resource implementation

use async_trait::async_trait;
use tfplug::context::Context;
use tfplug::import::import_state_passthrough_id;
use tfplug::resource::{
    CreateResourceRequest, CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse,
    ImportResourceStateRequest, ImportResourceStateResponse, ProviderData, ReadResourceRequest,
    ReadResourceResponse, Resource, ResourceWithProviderData, UpdateResourceRequest,
    UpdateResourceResponse, ValidateResourceConfigRequest, ValidateResourceConfigResponse,
};
use tfplug::schema::{AttributeBuilder, AttributeType, NestedType, Schema, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, DynamicValue};

use super::{api_error, has_unknown, model_error};
use crate::api::{Feature, FeatureType};
use crate::models::{FeatureData, MultivariateOptionData};
use crate::FlagsmithProviderData;

pub const TYPE_NAME: &str = "flagsmith_feature";

pub struct FeatureResource {
    provider_data: FlagsmithProviderData,
}

impl FeatureResource {
    pub fn new(provider_data: FlagsmithProviderData) -> Self {
        Self { provider_data }
    }

    pub fn schema_static() -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Manages a Flagsmith feature")
            .attribute(
                AttributeBuilder::new("uuid", AttributeType::String)
                    .description("UUID of the feature")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("id", AttributeType::Number)
                    .description("ID of the feature")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("feature_name", AttributeType::String)
                    .description("Name of the feature")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("type", AttributeType::String)
                    .description("Type of the feature, STANDARD or MULTIVARIATE")
                    .optional()
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("description", AttributeType::String)
                    .description("Description of the feature")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("initial_value", AttributeType::String)
                    .description("Initial value of the feature")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("default_enabled", AttributeType::Bool)
                    .description("Whether the feature is enabled in new environments")
                    .optional()
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("is_archived", AttributeType::Bool)
                    .description("Whether the feature is archived")
                    .optional()
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("owners", AttributeType::List(Box::new(AttributeType::Number)))
                    .description("IDs of the users owning the feature")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new(
                    "multivariate_options",
                    AttributeType::List(Box::new(AttributeType::Object(Default::default()))),
                )
                .description("Weighted variants of a multivariate feature")
                .optional()
                .nested_type(NestedType::list(option_attributes()))
                .build(),
            )
            .attribute(
                AttributeBuilder::new("project_id", AttributeType::Number)
                    .description("ID of the project")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("project_uuid", AttributeType::String)
                    .description("UUID of the project the feature belongs to")
                    .required()
                    .build(),
            )
            .build()
    }

    async fn fetch(&self, uuid: &str) -> Result<Feature, FetchError> {
        self.provider_data
            .client
            .features()
            .get_by_uuid(uuid)
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    FetchError::NotFound
                } else {
                    FetchError::Diagnostic(api_error("Failed to read feature", &e))
                }
            })
    }

    /// Imported features only know their uuid; the project uuid comes from
    /// the feature's project
    async fn project_uuid_of(&self, feature: &Feature) -> Result<String, Diagnostic> {
        let project_id = feature.project_id.ok_or_else(|| {
            Diagnostic::error(
                "Failed to read feature",
                format!("feature {} has no project", feature.name),
            )
        })?;
        self.provider_data
            .client
            .projects()
            .get(project_id)
            .await
            .map(|project| project.uuid)
            .map_err(|e| api_error("Failed to read project", &e))
    }

    /// Read back a feature after a write so computed fields come from the API
    async fn state_for(&self, uuid: &str, project_uuid: &str) -> Result<DynamicValue, Diagnostic> {
        let feature = self.fetch(uuid).await.map_err(|e| match e {
            FetchError::NotFound => Diagnostic::error(
                "Failed to read feature",
                format!("feature {} was not found after it was written", uuid),
            ),
            FetchError::Diagnostic(diag) => diag,
        })?;
        FeatureData::from_client(&feature, project_uuid)
            .and_then(|data| data.to_state())
            .map_err(|e| model_error("Failed to build feature state", &e))
    }
}

enum FetchError {
    NotFound,
    Diagnostic(Diagnostic),
}

fn option_attributes() -> Vec<tfplug::schema::Attribute> {
    vec![
        AttributeBuilder::new("id", AttributeType::Number)
            .description("ID of the multivariate option")
            .computed()
            .build(),
        AttributeBuilder::new("type", AttributeType::String)
            .description("Type of the value, one of unicode, int or bool")
            .required()
            .build(),
        AttributeBuilder::new("string_value", AttributeType::String)
            .description("String value, set when type is unicode")
            .optional()
            .build(),
        AttributeBuilder::new("integer_value", AttributeType::Number)
            .description("Integer value, set when type is int")
            .optional()
            .build(),
        AttributeBuilder::new("boolean_value", AttributeType::Bool)
            .description("Boolean value, set when type is bool")
            .optional()
            .build(),
        AttributeBuilder::new("default_percentage_allocation", AttributeType::Number)
            .description("Share of identities served this option by default")
            .required()
            .build(),
    ]
}

impl ResourceWithProviderData for FeatureResource {
    fn from_provider_data(provider_data: Option<&ProviderData>) -> Result<Self, Diagnostic> {
        FlagsmithProviderData::from_provider_data(provider_data).map(Self::new)
    }
}

#[async_trait]
impl Resource for FeatureResource {
    fn type_name(&self) -> &str {
        TYPE_NAME
    }

    async fn validate(
        &self,
        _ctx: Context,
        request: ValidateResourceConfigRequest,
    ) -> ValidateResourceConfigResponse {
        let mut diagnostics = vec![];
        let config = &request.config;

        let type_path = AttributePath::new("type");
        if let Ok(Some(feature_type)) = config.get_optional_string(&type_path) {
            if FeatureType::parse(&feature_type).is_none() {
                diagnostics.push(
                    Diagnostic::error(
                        "Invalid feature type",
                        format!(
                            "type must be STANDARD or MULTIVARIATE, got {:?}",
                            feature_type
                        ),
                    )
                    .with_attribute(type_path),
                );
            }
        }

        let project_path = AttributePath::new("project_uuid");
        if let Ok(Some(project_uuid)) = config.get_optional_string(&project_path) {
            if let Err(e) = uuid::Uuid::parse_str(&project_uuid) {
                diagnostics.push(
                    Diagnostic::error(
                        "Invalid project UUID",
                        format!("{:?} is not a UUID: {}", project_uuid, e),
                    )
                    .with_attribute(project_path),
                );
            }
        }

        let options_path = AttributePath::new("multivariate_options");
        if let Ok(Some(options)) = config.get_optional_list(&options_path) {
            for (i, option) in options.iter().enumerate() {
                if has_unknown(option) {
                    continue;
                }
                if let Err(e) = MultivariateOptionData::from_attributes(option) {
                    diagnostics.push(
                        Diagnostic::error("Invalid multivariate option", e.to_string())
                            .with_attribute(options_path.clone().index(i as i64)),
                    );
                }
            }
        }

        ValidateResourceConfigResponse { diagnostics }
    }

    async fn create(&self, _ctx: Context, request: CreateResourceRequest) -> CreateResourceResponse {
        let mut diagnostics = vec![];

        match self.create_feature(&request.planned_state).await {
            Ok(new_state) => CreateResourceResponse {
                new_state,
                diagnostics,
            },
            Err(diag) => {
                diagnostics.push(diag);
                CreateResourceResponse {
                    new_state: request.planned_state,
                    diagnostics,
                }
            }
        }
    }

    async fn read(&self, _ctx: Context, request: ReadResourceRequest) -> ReadResourceResponse {
        let mut diagnostics = vec![];

        let uuid_path = AttributePath::new("uuid");
        let uuid = match request.current_state.get_string(&uuid_path) {
            Ok(uuid) => uuid,
            Err(e) => {
                tracing::warn!("Feature has no usable uuid in state ({}), removing it", e);
                return ReadResourceResponse {
                    new_state: None,
                    diagnostics,
                };
            }
        };
        let known_project_uuid = request
            .current_state
            .get_optional_string(&AttributePath::new("project_uuid"))
            .ok()
            .flatten();

        let feature = match self.fetch(&uuid).await {
            Ok(feature) => feature,
            Err(FetchError::NotFound) => {
                tracing::warn!("Feature {} no longer exists, removing from state", uuid);
                return ReadResourceResponse {
                    new_state: None,
                    diagnostics,
                };
            }
            Err(FetchError::Diagnostic(diag)) => {
                diagnostics.push(diag);
                return ReadResourceResponse {
                    new_state: Some(request.current_state),
                    diagnostics,
                };
            }
        };

        let project_uuid = match known_project_uuid {
            Some(project_uuid) => project_uuid,
            None => match self.project_uuid_of(&feature).await {
                Ok(project_uuid) => project_uuid,
                Err(diag) => {
                    diagnostics.push(diag);
                    return ReadResourceResponse {
                        new_state: Some(request.current_state),
                        diagnostics,
                    };
                }
            },
        };

        match FeatureData::from_client(&feature, &project_uuid).and_then(|data| data.to_state()) {
            Ok(new_state) => ReadResourceResponse {
                new_state: Some(new_state),
                diagnostics,
            },
            Err(e) => {
                diagnostics.push(model_error("Failed to build feature state", &e));
                ReadResourceResponse {
                    new_state: Some(request.current_state),
                    diagnostics,
                }
            }
        }
    }

    async fn update(&self, _ctx: Context, request: UpdateResourceRequest) -> UpdateResourceResponse {
        let mut diagnostics = vec![];

        match self
            .update_feature(&request.prior_state, &request.planned_state)
            .await
        {
            Ok(new_state) => UpdateResourceResponse {
                new_state,
                diagnostics,
            },
            Err(diag) => {
                diagnostics.push(diag);
                UpdateResourceResponse {
                    new_state: request.prior_state,
                    diagnostics,
                }
            }
        }
    }

    async fn delete(&self, _ctx: Context, request: DeleteResourceRequest) -> DeleteResourceResponse {
        let mut diagnostics = vec![];

        let prior = match FeatureData::from_state(&request.prior_state) {
            Ok(prior) => prior,
            Err(e) => {
                diagnostics.push(model_error("Invalid feature state", &e));
                return DeleteResourceResponse { diagnostics };
            }
        };
        let (Some(project_id), Some(id)) = (prior.project_id, prior.id) else {
            diagnostics.push(Diagnostic::error(
                "Failed to delete feature",
                format!("feature {} has no id or project_id in state", prior.feature_name),
            ));
            return DeleteResourceResponse { diagnostics };
        };

        tracing::info!("Deleting feature {} ({})", prior.feature_name, id);

        match self
            .provider_data
            .client
            .features()
            .delete(project_id, id)
            .await
        {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                tracing::warn!("Feature {} was already deleted", id);
            }
            Err(e) => diagnostics.push(api_error("Failed to delete feature", &e)),
        }

        DeleteResourceResponse { diagnostics }
    }

    async fn import_state(
        &self,
        ctx: Context,
        request: ImportResourceStateRequest,
    ) -> ImportResourceStateResponse {
        let mut response = ImportResourceStateResponse {
            imported_resources: vec![],
            diagnostics: vec![],
        };
        import_state_passthrough_id(&ctx, AttributePath::new("uuid"), &request, &mut response);
        response
    }
}

impl FeatureResource {
    async fn create_feature(&self, planned_state: &DynamicValue) -> Result<DynamicValue, Diagnostic> {
        let plan = FeatureData::from_state(planned_state)
            .map_err(|e| model_error("Invalid feature configuration", &e))?;
        let client = &self.provider_data.client;

        let project = client
            .projects()
            .get_by_uuid(&plan.project_uuid)
            .await
            .map_err(|e| api_error("Failed to look up project", &e))?;

        tracing::info!(
            "Creating feature {} in project {} ({})",
            plan.feature_name,
            project.name,
            project.id
        );

        let mut payload = plan
            .to_client()
            .map_err(|e| model_error("Invalid feature configuration", &e))?;
        payload.id = None;
        payload.uuid = None;
        payload.project_id = Some(project.id);

        let created = client
            .features()
            .create(project.id, &payload)
            .await
            .map_err(|e| api_error("Failed to create feature", &e))?;
        let uuid = created.uuid.ok_or_else(|| {
            Diagnostic::error(
                "Failed to create feature",
                "The API response did not include the feature uuid",
            )
        })?;

        // The create response does not carry option ids; read back the full feature
        self.state_for(&uuid, &plan.project_uuid).await
    }

    async fn update_feature(
        &self,
        prior_state: &DynamicValue,
        planned_state: &DynamicValue,
    ) -> Result<DynamicValue, Diagnostic> {
        let plan = FeatureData::from_state(planned_state)
            .map_err(|e| model_error("Invalid feature configuration", &e))?;
        let prior = FeatureData::from_state(prior_state)
            .map_err(|e| model_error("Invalid feature state", &e))?;
        let uuid = prior.uuid.clone().ok_or_else(|| {
            Diagnostic::error("Failed to update feature", "feature uuid is missing from state")
        })?;

        let mut payload = plan
            .to_client()
            .map_err(|e| model_error("Invalid feature configuration", &e))?;
        payload.id = prior.id;
        payload.uuid = Some(uuid.clone());
        payload.project_id = prior.project_id;

        tracing::info!("Updating feature {} ({})", plan.feature_name, uuid);

        self.provider_data
            .client
            .features()
            .update(&payload)
            .await
            .map_err(|e| api_error("Failed to update feature", &e))?;

        self.state_for(&uuid, &plan.project_uuid).await
    }
}
