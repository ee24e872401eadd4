//! Product listing, detail and metrics endpoints.

use sellhub_shared::{
    ApiError, Product, ProductQuery, ProductResponse, ProductsResponse, Resource, ViewsResponse,
};

use crate::api_client::{with_credential, ApiClient};

impl ApiClient {
    /// Products owned by the signed-in seller, optionally filtered.
    /// A 404 means the seller no longer exists.
    pub async fn list_seller_products(
        &self,
        query: &ProductQuery,
        access_token: &str,
    ) -> Result<Vec<Product>, ApiError> {
        let rb = with_credential(self.get("/products/me"), access_token).query(&query.to_pairs());
        let resp: ProductsResponse = self
            .dispatch_json(rb)
            .await
            .map_err(|e| e.or_not_found(Resource::Seller))?;
        Ok(resp.products)
    }

    pub async fn get_product_by_id(&self, id: &str, access_token: &str) -> Result<Product, ApiError> {
        let path = format!("/products/{}", urlencoding::encode(id));
        let rb = with_credential(self.get(&path), access_token);
        let resp: ProductResponse = self
            .dispatch_json(rb)
            .await
            .map_err(|e| e.or_not_found(Resource::Product))?;
        Ok(resp.product)
    }

    /// How many times the product was viewed over the last seven days.
    pub async fn product_views_last_7_days(
        &self,
        id: &str,
        access_token: &str,
    ) -> Result<u64, ApiError> {
        let path = format!("/products/{}/metrics/views", urlencoding::encode(id));
        let rb = with_credential(self.get(&path), access_token);
        let resp: ViewsResponse = self
            .dispatch_json(rb)
            .await
            .map_err(|e| e.or_not_found(Resource::Product))?;
        Ok(resp.amount)
    }
}
