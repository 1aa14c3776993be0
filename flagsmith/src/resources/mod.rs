//! Resource implementations

pub mod feature;
pub mod feature_state;

pub use feature::FeatureResource;
pub use feature_state::FeatureStateResource;

use tfplug::types::{Diagnostic, Dynamic};

use crate::api::ApiError;
use crate::models::ModelError;

/// Error diagnostic for a failed API call, logged where it is raised
pub(crate) fn api_error(summary: &str, err: &ApiError) -> Diagnostic {
    tracing::error!("{}: {}", summary, err);
    Diagnostic::error(summary, format!("API error: {}", err))
}

/// Error diagnostic for state that cannot be mapped to or from the API
pub(crate) fn model_error(summary: &str, err: &ModelError) -> Diagnostic {
    tracing::warn!("{}: {}", summary, err);
    Diagnostic::error(summary, err.to_string())
}

/// Values still unknown at plan time are validated once they are applied
pub(crate) fn has_unknown(value: &Dynamic) -> bool {
    match value {
        Dynamic::Unknown => true,
        Dynamic::Map(map) => map.values().any(has_unknown),
        Dynamic::List(list) => list.iter().any(has_unknown),
        _ => false,
    }
}
