use super::error::ApiError;
use super::models::Feature;
use super::Client;

/// Features API
pub struct FeaturesApi<'a> {
    client: &'a Client,
}

impl<'a> FeaturesApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// GET /features/get-by-uuid/{uuid}/
    pub async fn get_by_uuid(&self, uuid: &str) -> Result<Feature, ApiError> {
        self.client
            .get(&format!(
                "/features/get-by-uuid/{}/",
                urlencoding::encode(uuid)
            ))
            .await
    }

    /// POST /projects/{project_id}/features/
    pub async fn create(&self, project_id: i64, feature: &Feature) -> Result<Feature, ApiError> {
        self.client
            .post(&format!("/projects/{}/features/", project_id), feature)
            .await
    }

    /// PUT /projects/{project_id}/features/{id}/
    pub async fn update(&self, feature: &Feature) -> Result<Feature, ApiError> {
        let (project_id, id) = match (feature.project_id, feature.id) {
            (Some(project_id), Some(id)) => (project_id, id),
            _ => {
                return Err(ApiError::EncodeError(format!(
                    "feature {:?} needs both a project and an id to be updated",
                    feature.name
                )))
            }
        };
        self.client
            .put(&format!("/projects/{}/features/{}/", project_id, id), feature)
            .await
    }

    /// DELETE /projects/{project_id}/features/{id}/
    pub async fn delete(&self, project_id: i64, id: i64) -> Result<(), ApiError> {
        self.client
            .delete(&format!("/projects/{}/features/{}/", project_id, id))
            .await
    }
}
