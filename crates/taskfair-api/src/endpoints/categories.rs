// Service category endpoints.

use serde::Deserialize;

use crate::client::{ApiClient, ApiRequest};
use crate::error::Error;

/// A service category as the API returns it.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub provider_count: Option<u32>,
}

/// `GET /get-categories`
pub fn list_categories_request() -> ApiRequest {
    ApiRequest::get("get-categories")
}

impl ApiClient {
    /// List all service categories.
    pub async fn list_categories(&self) -> Result<Vec<CategoryRecord>, Error> {
        self.execute(&list_categories_request()).await
    }
}
