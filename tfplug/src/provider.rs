//! Provider trait and related types

use crate::context::Context;
use crate::resource::{ProviderData, Resource, ResourceFactory};
use crate::schema::Schema;
use crate::types::{Diagnostic, DynamicValue};
use async_trait::async_trait;
use std::collections::HashMap;

/// Main provider trait - implement this for your provider
/// Providers are long-lived and handle multiple requests
#[async_trait]
pub trait Provider: Send + Sync {
    /// Type name should be constant (e.g., "flagsmith")
    fn type_name(&self) -> &str;

    async fn metadata(
        &self,
        _ctx: Context,
        _request: ProviderMetadataRequest,
    ) -> ProviderMetadataResponse {
        ProviderMetadataResponse {
            type_name: self.type_name().to_string(),
        }
    }

    /// Provider configuration schema
    async fn schema(&self, ctx: Context, request: ProviderSchemaRequest) -> ProviderSchemaResponse;

    /// Called once with the provider block. The returned provider_data is
    /// handed to every resource factory.
    async fn configure(
        &mut self,
        ctx: Context,
        request: ConfigureProviderRequest,
    ) -> ConfigureProviderResponse;

    /// Schemas keyed by resource type name, available before configure
    fn resource_schemas(&self) -> HashMap<String, Schema>;

    /// Resource factories keyed by resource type name
    fn resources(&self) -> HashMap<String, ResourceFactory>;

    /// Build one resource from provider data
    fn resource(
        &self,
        type_name: &str,
        provider_data: Option<&ProviderData>,
    ) -> Result<Box<dyn Resource>, Diagnostic> {
        let factories = self.resources();
        let factory = factories.get(type_name).ok_or_else(|| {
            Diagnostic::error(
                "Resource type not found",
                format!("{} does not provide {}", self.type_name(), type_name),
            )
        })?;
        factory(provider_data)
    }
}

pub struct ProviderMetadataRequest;

pub struct ProviderMetadataResponse {
    pub type_name: String,
}

pub struct ProviderSchemaRequest;

pub struct ProviderSchemaResponse {
    pub schema: Schema,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct ConfigureProviderRequest {
    pub terraform_version: String,
    pub config: DynamicValue,
}

pub struct ConfigureProviderResponse {
    pub diagnostics: Vec<Diagnostic>,
    pub provider_data: Option<ProviderData>,
}
