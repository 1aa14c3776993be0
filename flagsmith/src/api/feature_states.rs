use super::error::ApiError;
use super::models::{FeatureState, Paginated};
use super::Client;

/// Feature states API
pub struct FeatureStatesApi<'a> {
    client: &'a Client,
}

impl<'a> FeatureStatesApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// GET /environments/{environment_key}/featurestates/?feature_name={feature_name}
    ///
    /// The listing is filtered server side; anything other than exactly one
    /// result is an error.
    pub async fn get(
        &self,
        environment_key: &str,
        feature_name: &str,
    ) -> Result<FeatureState, ApiError> {
        let path = format!(
            "/environments/{}/featurestates/?feature_name={}",
            urlencoding::encode(environment_key),
            urlencoding::encode(feature_name)
        );
        let page: Paginated<FeatureState> = self.client.get(&path).await?;

        // count is the total across pages, results only this page
        let found = page
            .count
            .map_or(page.results.len(), |count| count.max(page.results.len()));
        let unexpected = || ApiError::UnexpectedResultCount {
            kind: "feature state",
            key: format!("{}/{}", environment_key, feature_name),
            found,
        };
        if found != 1 {
            return Err(unexpected());
        }
        page.results.into_iter().next().ok_or_else(unexpected)
    }

    /// PUT /features/featurestates/{id}/
    pub async fn update(&self, feature_state: &FeatureState) -> Result<FeatureState, ApiError> {
        self.client
            .put(
                &format!("/features/featurestates/{}/", feature_state.id),
                feature_state,
            )
            .await
    }
}
