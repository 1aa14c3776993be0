//! Flagsmith Admin API client

pub mod client;
pub mod error;
pub mod feature_states;
pub mod features;
pub mod models;
pub mod projects;

pub use client::{Client, RetryConfig, DEFAULT_BASE_URL};
pub use error::ApiError;
pub use models::{
    Feature, FeatureState, FeatureStateValue, FeatureType, MultivariateOption, Project,
};
