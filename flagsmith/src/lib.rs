pub mod api;
pub mod models;
pub mod provider_data;
pub mod resources;

pub use provider_data::FlagsmithProviderData;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tfplug::context::Context;
use tfplug::provider::{
    ConfigureProviderRequest, ConfigureProviderResponse, Provider, ProviderSchemaRequest,
    ProviderSchemaResponse,
};
use tfplug::resource::{ProviderData, Resource, ResourceFactory, ResourceWithProviderData};
use tfplug::schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, DynamicValue};

pub const ENV_MASTER_API_KEY: &str = "FLAGSMITH_MASTER_API_KEY";
pub const ENV_BASE_API_URL: &str = "FLAGSMITH_BASE_API_URL";

pub struct FlagsmithProvider {
    provider_data: Option<FlagsmithProviderData>,
}

impl Default for FlagsmithProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl FlagsmithProvider {
    pub fn new() -> Self {
        Self {
            provider_data: None,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.provider_data.is_some()
    }

    pub fn schema_static() -> Schema {
        SchemaBuilder::new()
            .description("Manage Flagsmith features and feature states")
            .attribute(
                AttributeBuilder::new("master_api_key", AttributeType::String)
                    .description(
                        "Master API key of the organisation, defaults to the FLAGSMITH_MASTER_API_KEY environment variable",
                    )
                    .optional()
                    .sensitive()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("base_api_url", AttributeType::String)
                    .description(
                        "Base URL of the Flagsmith Admin API, defaults to the FLAGSMITH_BASE_API_URL environment variable or https://api.flagsmith.com/api/v1",
                    )
                    .optional()
                    .build(),
            )
            .build()
    }
}

/// Provider block value, falling back to the environment variable
fn config_or_env(
    config: &DynamicValue,
    name: &str,
    env_var: &str,
) -> Result<Option<String>, Diagnostic> {
    let path = AttributePath::new(name);
    let value = config.get_optional_string(&path).map_err(|e| {
        Diagnostic::error(format!("Invalid {}", name), e.to_string()).with_attribute(path.clone())
    })?;
    Ok(value
        .filter(|v| !v.is_empty())
        .or_else(|| std::env::var(env_var).ok().filter(|v| !v.is_empty())))
}

fn factory<R>() -> ResourceFactory
where
    R: ResourceWithProviderData + 'static,
{
    Box::new(|provider_data: Option<&ProviderData>| {
        R::from_provider_data(provider_data).map(|r| Box::new(r) as Box<dyn Resource>)
    })
}

#[async_trait]
impl Provider for FlagsmithProvider {
    fn type_name(&self) -> &str {
        "flagsmith"
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: ProviderSchemaRequest,
    ) -> ProviderSchemaResponse {
        ProviderSchemaResponse {
            schema: Self::schema_static(),
            diagnostics: vec![],
        }
    }

    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureProviderRequest,
    ) -> ConfigureProviderResponse {
        let mut diagnostics = vec![];

        let master_api_key =
            match config_or_env(&request.config, "master_api_key", ENV_MASTER_API_KEY) {
                Ok(value) => value,
                Err(diag) => {
                    diagnostics.push(diag);
                    None
                }
            };
        let base_api_url = match config_or_env(&request.config, "base_api_url", ENV_BASE_API_URL)
        {
            Ok(value) => value.unwrap_or_else(|| api::DEFAULT_BASE_URL.to_string()),
            Err(diag) => {
                diagnostics.push(diag);
                api::DEFAULT_BASE_URL.to_string()
            }
        };

        let Some(master_api_key) = master_api_key else {
            if diagnostics.is_empty() {
                diagnostics.push(Diagnostic::error(
                    "master_api_key is required (set in provider config or FLAGSMITH_MASTER_API_KEY env var)",
                    "The provider cannot talk to Flagsmith without a master API key",
                ));
            }
            return ConfigureProviderResponse {
                diagnostics,
                provider_data: None,
            };
        };

        match api::Client::new(&base_api_url, &master_api_key) {
            Ok(client) => {
                tracing::info!(
                    "Configured Flagsmith provider for {} (terraform {})",
                    client.base_url(),
                    request.terraform_version
                );
                let data = FlagsmithProviderData::new(client);
                self.provider_data = Some(data.clone());
                ConfigureProviderResponse {
                    diagnostics,
                    provider_data: Some(Arc::new(data) as ProviderData),
                }
            }
            Err(e) => {
                tracing::error!("Failed to create API client: {}", e);
                diagnostics.push(
                    Diagnostic::error("Failed to create API client", e.to_string())
                        .with_attribute(AttributePath::new("base_api_url")),
                );
                ConfigureProviderResponse {
                    diagnostics,
                    provider_data: None,
                }
            }
        }
    }

    fn resource_schemas(&self) -> HashMap<String, Schema> {
        static SCHEMAS: std::sync::OnceLock<HashMap<String, Schema>> = std::sync::OnceLock::new();

        SCHEMAS
            .get_or_init(|| {
                let mut schemas = HashMap::new();
                schemas.insert(
                    resources::feature::TYPE_NAME.to_string(),
                    resources::FeatureResource::schema_static(),
                );
                schemas.insert(
                    resources::feature_state::TYPE_NAME.to_string(),
                    resources::FeatureStateResource::schema_static(),
                );
                schemas
            })
            .clone()
    }

    fn resources(&self) -> HashMap<String, ResourceFactory> {
        let mut factories = HashMap::new();
        factories.insert(
            resources::feature::TYPE_NAME.to_string(),
            factory::<resources::FeatureResource>(),
        );
        factories.insert(
            resources::feature_state::TYPE_NAME.to_string(),
            factory::<resources::FeatureStateResource>(),
        );
        factories
    }
}
