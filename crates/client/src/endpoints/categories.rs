use sellhub_shared::{ApiError, CategoriesResponse, Category};

use crate::api_client::{with_credential, ApiClient};

impl ApiClient {
    pub async fn list_categories(&self, access_token: &str) -> Result<Vec<Category>, ApiError> {
        let rb = with_credential(self.get("/categories"), access_token);
        let resp: CategoriesResponse = self.dispatch_json(rb).await?;
        Ok(resp.categories)
    }
}
