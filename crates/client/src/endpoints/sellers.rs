//! Seller profile endpoints.

use sellhub_shared::{ApiError, CreateSellerRequest, Resource, Seller, SellerResponse, UpdateSellerRequest};

use crate::api_client::{with_credential, ApiClient};

impl ApiClient {
    /// The signed-in seller's profile.
    pub async fn get_seller_profile(&self, access_token: &str) -> Result<Seller, ApiError> {
        let rb = with_credential(self.get("/sellers/me"), access_token);
        let resp: SellerResponse = self.dispatch_json(rb).await?;
        Ok(resp.seller)
    }

    /// Register a new seller.
    ///
    /// A 404 means the referenced avatar does not exist and a 409 that the
    /// e-mail or phone is taken.
    pub async fn create_seller(
        &self,
        body: &CreateSellerRequest,
        access_token: &str,
    ) -> Result<Seller, ApiError> {
        let rb = with_credential(self.post("/sellers"), access_token).json(body);
        let resp: SellerResponse = self.dispatch_json(rb).await.map_err(|e| match e {
            ApiError::Http { status: 409, .. } => ApiError::Conflict,
            other => other.or_not_found(Resource::Avatar),
        })?;
        Ok(resp.seller)
    }

    pub async fn update_seller(
        &self,
        body: &UpdateSellerRequest,
        access_token: &str,
    ) -> Result<Seller, ApiError> {
        let rb = with_credential(self.put("/sellers"), access_token).json(body);
        let resp: SellerResponse = self.dispatch_json(rb).await?;
        Ok(resp.seller)
    }
}
