// Provider search and detail endpoints.
//
// Search criteria are assembled client-side by the browse screen and
// posted as one payload; the server owns ranking.

use serde::{Deserialize, Serialize};

use crate::client::{ApiClient, ApiRequest};
use crate::error::Error;

/// Server-side sort order for provider search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderSort {
    TopRated,
    PriceLowHigh,
    PriceHighLow,
    Newest,
}

/// Search criteria for `POST /provider/search`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProviderSearch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<ProviderSort>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

/// A provider profile as the API returns it. Money fields arrive as
/// decimal strings (e.g. `"45.00"`); conversion happens in core.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub review_count: Option<u32>,
    #[serde(default)]
    pub hourly_rate: Option<String>,
    #[serde(default)]
    pub is_verified: Option<bool>,
}

/// `POST /provider/search`
pub fn search_providers_request(search: &ProviderSearch) -> Result<ApiRequest, Error> {
    ApiRequest::post("provider/search", search)
}

impl ApiClient {
    /// Search providers with the given criteria.
    pub async fn search_providers(
        &self,
        search: &ProviderSearch,
    ) -> Result<Vec<ProviderRecord>, Error> {
        self.execute(&search_providers_request(search)?).await
    }

    /// Fetch a single provider profile.
    ///
    /// `GET /provider/{id}`
    pub async fn get_provider(&self, id: &str) -> Result<ProviderRecord, Error> {
        self.execute(&ApiRequest::get(format!("provider/{id}"))).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn empty_search_serializes_to_empty_object() {
        let req = search_providers_request(&ProviderSearch::default()).unwrap();
        assert_eq!(req.body.unwrap(), serde_json::json!({}));
    }

    #[test]
    fn sort_serializes_snake_case() {
        let search = ProviderSearch {
            sort_by: Some(ProviderSort::PriceLowHigh),
            ..ProviderSearch::default()
        };
        let req = search_providers_request(&search).unwrap();
        assert_eq!(
            req.body.unwrap(),
            serde_json::json!({ "sort_by": "price_low_high" })
        );
    }
}
