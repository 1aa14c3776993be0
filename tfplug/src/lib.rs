//! tfplug - Terraform Plugin Framework for Rust
//!
//! The provider-facing half of a Terraform plugin framework: dynamic values,
//! schemas, diagnostics and the Provider/Resource traits a host drives.

// Core modules
pub mod context;
pub mod error;
pub mod schema;
pub mod types;

// Provider API modules
pub mod provider;
pub mod resource;

// Helper modules
pub mod import;

// Re-exports for convenience
pub use context::Context;
pub use error::{Result, TfplugError};
pub use import::{import_state_composite_id, import_state_passthrough_id};
pub use provider::{ConfigureProviderRequest, ConfigureProviderResponse, Provider};
pub use resource::{
    downcast_provider_data, ProviderData, Resource, ResourceFactory, ResourceWithProviderData,
};
pub use schema::{AttributeBuilder, AttributeType, NestedType, Schema, SchemaBuilder};
pub use types::{
    AttributePath, Config, Diagnostic, DiagnosticSeverity, Diagnostics, Dynamic, DynamicValue,
    Number, State,
};
