use super::error::ApiError;
use super::models::Project;
use super::Client;

/// Projects API for resolving project UUIDs
pub struct ProjectsApi<'a> {
    client: &'a Client,
}

impl<'a> ProjectsApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// GET /projects/{id}/
    pub async fn get(&self, id: i64) -> Result<Project, ApiError> {
        self.client.get(&format!("/projects/{}/", id)).await
    }

    /// GET /projects/get-by-uuid/{uuid}/
    pub async fn get_by_uuid(&self, uuid: &str) -> Result<Project, ApiError> {
        self.client
            .get(&format!(
                "/projects/get-by-uuid/{}/",
                urlencoding::encode(uuid)
            ))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    #[tokio::test]
    async fn get_project_by_uuid() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/projects/get-by-uuid/10421b1f-5f29-4da9-abe2-30f88c07c9e8/")
            .with_body(
                r#"{"id": 12, "uuid": "10421b1f-5f29-4da9-abe2-30f88c07c9e8", "name": "Acme", "organisation": 3}"#,
            )
            .create_async()
            .await;

        let client = Client::new(&server.url(), "secret").unwrap();
        let project = client
            .projects()
            .get_by_uuid("10421b1f-5f29-4da9-abe2-30f88c07c9e8")
            .await
            .unwrap();

        assert_eq!(project.id, 12);
        assert_eq!(project.name, "Acme");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn get_project_by_id() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/projects/12/")
            .with_body(r#"{"id": 12, "uuid": "10421b1f-5f29-4da9-abe2-30f88c07c9e8", "name": "Acme"}"#)
            .create_async()
            .await;

        let client = Client::new(&server.url(), "secret").unwrap();
        let project = client.projects().get(12).await.unwrap();

        assert_eq!(project.uuid, "10421b1f-5f29-4da9-abe2-30f88c07c9e8");
        mock.assert_async().await;
    }
}
