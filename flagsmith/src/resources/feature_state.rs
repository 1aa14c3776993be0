//! Feature state resource implementation
//!
//! A feature state always exists once its feature and environment do, so
//! create adopts the existing state and delete only forgets it.

use std::collections::HashMap;

use async_trait::async_trait;
use tfplug::context::Context;
use tfplug::import::import_state_composite_id;
use tfplug::resource::{
    CreateResourceRequest, CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse,
    ImportResourceStateRequest, ImportResourceStateResponse, ProviderData, ReadResourceRequest,
    ReadResourceResponse, Resource, ResourceWithProviderData, UpdateResourceRequest,
    UpdateResourceResponse, ValidateResourceConfigRequest, ValidateResourceConfigResponse,
};
use tfplug::schema::{AttributeBuilder, AttributeType, NestedType, Schema, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, DynamicValue};

use super::{api_error, has_unknown, model_error};
use crate::models::{FeatureStateData, TaggedValue};
use crate::FlagsmithProviderData;

pub const TYPE_NAME: &str = "flagsmith_feature_state";

pub struct FeatureStateResource {
    provider_data: FlagsmithProviderData,
}

impl FeatureStateResource {
    pub fn new(provider_data: FlagsmithProviderData) -> Self {
        Self { provider_data }
    }

    pub fn schema_static() -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Manages the state of a feature in a Flagsmith environment")
            .attribute(
                AttributeBuilder::new("id", AttributeType::Number)
                    .description("ID of the feature state")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("environment_key", AttributeType::String)
                    .description("Client side key of the environment")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("feature_name", AttributeType::String)
                    .description("Name of the feature")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("feature_state_value", AttributeType::Object(HashMap::new()))
                    .description("Value for the feature state")
                    .optional()
                    .nested_type(NestedType::single(value_attributes()))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("enabled", AttributeType::Bool)
                    .description("Whether the feature is enabled in the environment")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("feature", AttributeType::Number)
                    .description("ID of the feature")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("environment", AttributeType::Number)
                    .description("ID of the environment")
                    .computed()
                    .build(),
            )
            .build()
    }

    async fn fetch(
        &self,
        environment_key: &str,
        feature_name: &str,
    ) -> Result<FeatureStateData, Diagnostic> {
        tracing::debug!(
            "Fetching feature state for {} in environment {}",
            feature_name,
            environment_key
        );
        let feature_state = self
            .provider_data
            .client
            .feature_states()
            .get(environment_key, feature_name)
            .await
            .map_err(|e| api_error("Failed to read feature state", &e))?;

        Ok(FeatureStateData::from_client(
            &feature_state,
            environment_key,
            feature_name,
        ))
    }

    /// PUT the planned payload onto the feature state identified by `current`
    async fn apply(
        &self,
        plan: &FeatureStateData,
        current: &FeatureStateData,
    ) -> Result<DynamicValue, Diagnostic> {
        let (Some(id), Some(feature), Some(environment)) =
            (current.id, current.feature, current.environment)
        else {
            return Err(Diagnostic::error(
                "Missing feature state identifiers",
                "id, feature and environment must be known before the feature state can be updated",
            ));
        };

        let payload = plan
            .to_client(id, feature, environment)
            .map_err(|e| model_error("Invalid feature state value", &e))?;

        let updated = self
            .provider_data
            .client
            .feature_states()
            .update(&payload)
            .await
            .map_err(|e| api_error("Failed to update feature state", &e))?;

        FeatureStateData::from_client(&updated, &plan.environment_key, &plan.feature_name)
            .to_state()
            .map_err(|e| model_error("Failed to build feature state", &e))
    }
}

fn value_attributes() -> Vec<tfplug::schema::Attribute> {
    vec![
        AttributeBuilder::new("type", AttributeType::String)
            .description("Type of the value, one of unicode, int or bool")
            .optional()
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
    ]
}

impl ResourceWithProviderData for FeatureStateResource {
    fn from_provider_data(provider_data: Option<&ProviderData>) -> Result<Self, Diagnostic> {
        FlagsmithProviderData::from_provider_data(provider_data).map(Self::new)
    }
}

#[async_trait]
impl Resource for FeatureStateResource {
    fn type_name(&self) -> &str {
        TYPE_NAME
    }

    async fn validate(
        &self,
        _ctx: Context,
        request: ValidateResourceConfigRequest,
    ) -> ValidateResourceConfigResponse {
        let mut diagnostics = vec![];

        let value_path = AttributePath::new("feature_state_value");
        match request.config.get(&value_path) {
            Ok(value) if !has_unknown(value) => {
                if let Err(e) = TaggedValue::from_attributes(value) {
                    diagnostics.push(
                        Diagnostic::error("Invalid feature state value", e.to_string())
                            .with_attribute(value_path),
                    );
                }
            }
            _ => {}
        }

        ValidateResourceConfigResponse { diagnostics }
    }

    async fn create(&self, ctx: Context, request: CreateResourceRequest) -> CreateResourceResponse {
        let mut diagnostics = vec![];

        let plan = match FeatureStateData::from_state(&request.planned_state) {
            Ok(plan) => plan,
            Err(e) => {
                diagnostics.push(model_error("Invalid feature state configuration", &e));
                return CreateResourceResponse {
                    new_state: request.planned_state,
                    diagnostics,
                };
            }
        };

        tracing::info!(
            "Creating feature state for {} in environment {}",
            plan.feature_name,
            plan.environment_key
        );

        let current = match self.fetch(&plan.environment_key, &plan.feature_name).await {
            Ok(current) => current,
            Err(diag) => {
                diagnostics.push(diag);
                return CreateResourceResponse {
                    new_state: request.planned_state,
                    diagnostics,
                };
            }
        };

        if ctx.is_cancelled() {
            diagnostics.push(Diagnostic::error(
                "Operation cancelled",
                "Feature state creation was cancelled before the update was sent",
            ));
            return CreateResourceResponse {
                new_state: request.planned_state,
                diagnostics,
            };
        }

        match self.apply(&plan, &current).await {
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

        let (environment_key, feature_name) =
            match FeatureStateData::key_from_state(&request.current_state) {
                Ok(key) => key,
                Err(e) => {
                    diagnostics.push(model_error("Invalid feature state", &e));
                    return ReadResourceResponse {
                        new_state: Some(request.current_state),
                        diagnostics,
                    };
                }
            };

        let new_state = self
            .fetch(&environment_key, &feature_name)
            .await
            .and_then(|data| {
                data.to_state()
                    .map_err(|e| model_error("Failed to build feature state", &e))
            });

        match new_state {
            Ok(new_state) => ReadResourceResponse {
                new_state: Some(new_state),
                diagnostics,
            },
            Err(diag) => {
                diagnostics.push(diag);
                ReadResourceResponse {
                    new_state: Some(request.current_state),
                    diagnostics,
                }
            }
        }
    }

    async fn update(&self, _ctx: Context, request: UpdateResourceRequest) -> UpdateResourceResponse {
        let mut diagnostics = vec![];

        let states = FeatureStateData::from_state(&request.planned_state).and_then(|plan| {
            FeatureStateData::from_state(&request.prior_state).map(|prior| (plan, prior))
        });
        let (plan, prior) = match states {
            Ok(states) => states,
            Err(e) => {
                diagnostics.push(model_error("Invalid feature state configuration", &e));
                return UpdateResourceResponse {
                    new_state: request.prior_state,
                    diagnostics,
                };
            }
        };

        tracing::info!(
            "Updating feature state {:?} for {} in environment {}",
            prior.id,
            plan.feature_name,
            plan.environment_key
        );

        match self.apply(&plan, &prior).await {
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
        // Feature states cannot be deleted through the API; removing the
        // resource only drops it from Terraform state
        if let Ok((environment_key, feature_name)) =
            FeatureStateData::key_from_state(&request.prior_state)
        {
            tracing::info!(
                "Removing feature state for {} in environment {} from state",
                feature_name,
                environment_key
            );
        }
        DeleteResourceResponse {
            diagnostics: vec![],
        }
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
        import_state_composite_id(
            &ctx,
            &[
                AttributePath::new("environment_key"),
                AttributePath::new("feature_name"),
            ],
            ',',
            &request,
            &mut response,
        );
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Client;
    use mockito::{Matcher, Server};
    use serde_json::json;
    use tfplug::types::{Diagnostics, Number};

    fn resource(server: &Server) -> FeatureStateResource {
        let client = Client::new(&server.url(), "secret").unwrap();
        FeatureStateResource::new(FlagsmithProviderData::new(client))
    }

    fn planned(enabled: bool, value: Option<TaggedValue>) -> DynamicValue {
        FeatureStateData {
            id: None,
            enabled,
            feature_state_value: value,
            feature: None,
            environment: None,
            environment_key: "env_abc".to_string(),
            feature_name: "colour".to_string(),
        }
        .to_state()
        .unwrap()
    }

    #[test]
    fn schema_marks_ids_computed() {
        let schema = FeatureStateResource::schema_static();
        for name in ["id", "feature", "environment"] {
            assert!(schema.attribute(name).unwrap().computed, "{}", name);
        }
        assert!(schema.attribute("environment_key").unwrap().required);
        assert!(schema.attribute("enabled").unwrap().required);
        let nested = schema
            .attribute("feature_state_value")
            .unwrap()
            .nested_type
            .as_ref()
            .unwrap();
        assert_eq!(nested.attributes.len(), 4);
    }

    #[tokio::test]
    async fn validate_rejects_unknown_value_type() {
        let server = Server::new_async().await;
        let mut config = planned(true, None);
        config
            .set(
                &AttributePath::new("feature_state_value"),
                tfplug::types::Dynamic::Map(HashMap::from([(
                    "type".to_string(),
                    tfplug::types::Dynamic::from("float"),
                )])),
            )
            .unwrap();

        let response = resource(&server)
            .validate(
                Context::new(),
                ValidateResourceConfigRequest {
                    type_name: TYPE_NAME.to_string(),
                    config,
                },
            )
            .await;

        assert_eq!(response.diagnostics.len(), 1);
        assert!(response.diagnostics[0].detail.contains("float"));
    }

    #[tokio::test]
    async fn create_is_cancelled_between_read_and_update() {
        let mut server = Server::new_async().await;
        let _get = server
            .mock("GET", Matcher::Regex("^/environments/env_abc/featurestates/".into()))
            .with_body(
                r#"{"results": [{"id": 41, "feature_state_value": null, "enabled": false, "feature": 7, "environment": 2}]}"#,
            )
            .create_async()
            .await;
        let put = server
            .mock("PUT", "/features/featurestates/41/")
            .expect(0)
            .create_async()
            .await;

        let ctx = Context::new();
        ctx.cancel();
        let response = resource(&server)
            .create(
                ctx,
                CreateResourceRequest {
                    type_name: TYPE_NAME.to_string(),
                    planned_state: planned(true, None),
                    config: planned(true, None),
                },
            )
            .await;

        assert_eq!(response.diagnostics[0].summary, "Operation cancelled");
        put.assert_async().await;
    }

    #[tokio::test]
    async fn validate_rejects_conflicting_payloads() {
        let server = Server::new_async().await;
        let mut config = planned(true, None);
        config
            .set(
                &AttributePath::new("feature_state_value"),
                serde_json::from_value::<tfplug::types::Dynamic>(json!({
                    "type": "int",
                    "string_value": "hello",
                    "integer_value": 5,
                    "boolean_value": null
                }))
                .unwrap(),
            )
            .unwrap();

        let response = resource(&server)
            .validate(
                Context::new(),
                ValidateResourceConfigRequest {
                    type_name: TYPE_NAME.to_string(),
                    config,
                },
            )
            .await;

        assert_eq!(response.diagnostics.len(), 1);
        assert_eq!(response.diagnostics[0].summary, "Invalid feature state value");
        assert!(response.diagnostics[0].detail.contains("string_value"));
    }

    #[tokio::test]
    async fn create_stops_when_feature_state_lookup_fails() {
        let mut server = Server::new_async().await;
        let get = server
            .mock("GET", Matcher::Regex("^/environments/env_abc/featurestates/".into()))
            .with_body(r#"{"count": 0, "results": []}"#)
            .create_async()
            .await;
        let put = server
            .mock("PUT", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let plan = planned(true, Some(TaggedValue::Boolean(true)));
        let response = resource(&server)
            .create(
                Context::new(),
                CreateResourceRequest {
                    type_name: TYPE_NAME.to_string(),
                    planned_state: plan.clone(),
                    config: plan.clone(),
                },
            )
            .await;

        assert_eq!(response.diagnostics.len(), 1);
        assert!(response.diagnostics.has_errors());
        assert_eq!(response.new_state, plan);
        get.assert_async().await;
        put.assert_async().await;
    }

    #[tokio::test]
    async fn update_uses_ids_from_prior_state() {
        let mut server = Server::new_async().await;
        let put = server
            .mock("PUT", "/features/featurestates/41/")
            .match_body(Matcher::PartialJson(json!({
                "id": 41,
                "feature": 7,
                "environment": 2,
                "enabled": true,
                "feature_state_value": {"type": "int", "integer_value": 25}
            })))
            .with_body(
                r#"{"id": 41, "feature_state_value": {"type": "int", "integer_value": 25}, "enabled": true, "feature": 7, "environment": 2}"#,
            )
            .create_async()
            .await;

        let prior = FeatureStateData {
            id: Some(41),
            enabled: false,
            feature_state_value: None,
            feature: Some(7),
            environment: Some(2),
            environment_key: "env_abc".to_string(),
            feature_name: "colour".to_string(),
        };
        let response = resource(&server)
            .update(
                Context::new(),
                UpdateResourceRequest {
                    type_name: TYPE_NAME.to_string(),
                    prior_state: prior.to_state().unwrap(),
                    planned_state: planned(
                        true,
                        Some(TaggedValue::Integer(Number::from_i64(25))),
                    ),
                    config: planned(true, None),
                },
            )
            .await;

        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
        let state = FeatureStateData::from_state(&response.new_state).unwrap();
        assert_eq!(state.id, Some(41));
        assert_eq!(state.environment_key, "env_abc");
        assert_eq!(
            state.feature_state_value,
            Some(TaggedValue::Integer(Number::from_i64(25)))
        );
        put.assert_async().await;
    }

    #[tokio::test]
    async fn read_failure_keeps_state_and_reports_error() {
        let mut server = Server::new_async().await;
        let _get = server
            .mock("GET", Matcher::Regex("^/environments/env_abc/featurestates/".into()))
            .with_status(500)
            .with_body("boom")
            .expect_at_least(1)
            .create_async()
            .await;

        let client = Client::with_config(
            &server.url(),
            "secret",
            crate::api::RetryConfig {
                max_retries: 0,
                ..Default::default()
            },
        )
        .unwrap();
        let resource = FeatureStateResource::new(FlagsmithProviderData::new(client));
        let current = planned(true, None);
        let response = resource
            .read(
                Context::new(),
                ReadResourceRequest {
                    type_name: TYPE_NAME.to_string(),
                    current_state: current.clone(),
                },
            )
            .await;

        assert_eq!(response.new_state, Some(current));
        assert_eq!(response.diagnostics[0].summary, "Failed to read feature state");
    }

    #[tokio::test]
    async fn delete_makes_no_api_call() {
        let server = Server::new_async().await;
        let response = resource(&server)
            .delete(
                Context::new(),
                DeleteResourceRequest {
                    type_name: TYPE_NAME.to_string(),
                    prior_state: planned(true, None),
                },
            )
            .await;

        assert!(response.diagnostics.is_empty());
    }
}
