use super::{ApiClient, ApiError};
use serde_json::Value;

impl ApiClient {
    /// Lists every product available to order, alongside pricing and package details.
    pub async fn list_products(&self) -> Result<Value, ApiError> {
        self.get("v1/products", None).await
    }
}
