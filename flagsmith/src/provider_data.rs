//! Provider data structure passed to resources

use crate::api::Client;
use tfplug::{downcast_provider_data, ProviderData};
use tfplug::types::Diagnostic;

#[derive(Clone)]
pub struct FlagsmithProviderData {
    pub client: Client,
}

impl FlagsmithProviderData {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Recover the configured data from what the host hands a resource factory
    pub fn from_provider_data(provider_data: Option<&ProviderData>) -> Result<Self, Diagnostic> {
        downcast_provider_data::<Self>(provider_data)
    }
}
