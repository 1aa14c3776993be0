//! Resource trait and related types
//!
//! This module defines the Resource trait, the request/response types the
//! host passes through it, and the construction of resources from provider
//! data.

use crate::context::Context;
use crate::types::{Diagnostic, DynamicValue};
use async_trait::async_trait;
use std::any::Any;
use std::sync::Arc;

/// Data from ConfigureProviderResponse.provider_data
/// Downcast to your provider's specific type
pub type ProviderData = Arc<dyn Any + Send + Sync>;

/// Builds a resource from configured provider data
/// Fails with a diagnostic when the provider has not been configured
pub type ResourceFactory =
    Box<dyn Fn(Option<&ProviderData>) -> Result<Box<dyn Resource>, Diagnostic> + Send + Sync>;

/// Base trait for resources - implement CRUD operations
/// Type name should be constant and match the key in Provider.resources()
#[async_trait]
pub trait Resource: Send + Sync {
    /// Type name should be constant (e.g., "flagsmith_feature")
    /// MUST match the key used in Provider.resources()
    fn type_name(&self) -> &str;

    /// Called during plan to validate configuration
    async fn validate(
        &self,
        _ctx: Context,
        _request: ValidateResourceConfigRequest,
    ) -> ValidateResourceConfigResponse {
        ValidateResourceConfigResponse {
            diagnostics: vec![],
        }
    }

    /// Called to create a new resource
    /// MUST populate all attributes in response.new_state (including computed)
    async fn create(&self, ctx: Context, request: CreateResourceRequest) -> CreateResourceResponse;

    /// Called to read current state - used for refresh and after import
    /// MUST return accurate current state or None if resource doesn't exist
    async fn read(&self, ctx: Context, request: ReadResourceRequest) -> ReadResourceResponse;

    /// Called to update an existing resource
    /// MUST apply all changes from planned_state to the resource
    async fn update(&self, ctx: Context, request: UpdateResourceRequest) -> UpdateResourceResponse;

    /// Called to delete a resource
    async fn delete(&self, ctx: Context, request: DeleteResourceRequest) -> DeleteResourceResponse;

    /// Called during "terraform import" command
    /// Parse the ID into the attributes Read needs; Read runs afterwards
    async fn import_state(
        &self,
        _ctx: Context,
        request: ImportResourceStateRequest,
    ) -> ImportResourceStateResponse {
        ImportResourceStateResponse {
            imported_resources: vec![],
            diagnostics: vec![Diagnostic::error(
                "Resource Import Not Implemented",
                format!("{} does not support import", request.type_name),
            )],
        }
    }
}

/// Resources receive their dependencies at construction time
pub trait ResourceWithProviderData: Resource + Sized {
    fn from_provider_data(provider_data: Option<&ProviderData>) -> Result<Self, Diagnostic>;
}

/// Downcast provider data to the concrete type a resource expects
pub fn downcast_provider_data<T>(provider_data: Option<&ProviderData>) -> Result<T, Diagnostic>
where
    T: Clone + Send + Sync + 'static,
{
    let data = provider_data.ok_or_else(|| {
        Diagnostic::error(
            "Provider not configured",
            "No provider data was provided to the resource",
        )
    })?;

    data.downcast_ref::<T>().cloned().ok_or_else(|| {
        Diagnostic::error(
            "Unexpected Resource Configure Type",
            format!(
                "Expected {}. Please report this issue to the provider developers.",
                std::any::type_name::<T>()
            ),
        )
    })
}

// Request/Response types for Resource trait

pub struct ValidateResourceConfigRequest {
    pub type_name: String,
    pub config: DynamicValue,
}

pub struct ValidateResourceConfigResponse {
    pub diagnostics: Vec<Diagnostic>,
}

pub struct CreateResourceRequest {
    pub type_name: String,
    pub planned_state: DynamicValue,
    pub config: DynamicValue,
}

pub struct CreateResourceResponse {
    pub new_state: DynamicValue,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct ReadResourceRequest {
    pub type_name: String,
    pub current_state: DynamicValue,
}

pub struct ReadResourceResponse {
    /// None removes the resource from state
    pub new_state: Option<DynamicValue>,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct UpdateResourceRequest {
    pub type_name: String,
    pub prior_state: DynamicValue,
    pub planned_state: DynamicValue,
    pub config: DynamicValue,
}

pub struct UpdateResourceResponse {
    pub new_state: DynamicValue,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct DeleteResourceRequest {
    pub type_name: String,
    pub prior_state: DynamicValue,
}

pub struct DeleteResourceResponse {
    pub diagnostics: Vec<Diagnostic>,
}

pub struct ImportResourceStateRequest {
    pub type_name: String,
    pub id: String,
}

pub struct ImportResourceStateResponse {
    pub imported_resources: Vec<ImportedResource>,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct ImportedResource {
    pub type_name: String,
    pub state: DynamicValue,
}
