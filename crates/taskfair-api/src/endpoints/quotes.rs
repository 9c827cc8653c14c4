// Quote endpoints: incoming customer requests and provider responses.
//
// Quote submission optionally carries a document attachment, which is
// the one multipart surface in the API.

use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};

use crate::client::{ApiClient, ApiRequest};
use crate::error::Error;

/// A customer's request for a quote, addressed to this provider.
#[derive(Debug, Clone, Deserialize)]
pub struct QuoteRequestRecord {
    pub id: String,
    pub customer_name: String,
    pub service_name: String,
    #[serde(default)]
    pub details: Option<String>,
    /// Decimal string, the customer's stated budget.
    #[serde(default)]
    pub budget: Option<String>,
    /// RFC 3339 timestamp.
    #[serde(default)]
    pub created_at: Option<String>,
}

/// A quote submitted by the provider.
#[derive(Debug, Clone, Deserialize)]
pub struct QuoteRecord {
    pub id: String,
    pub request_id: String,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Payload for `POST /provider/quotes/submit`.
#[derive(Debug, Clone, Serialize)]
pub struct SubmitQuote {
    pub request_id: String,
    /// Decimal string, e.g. `"180.00"`.
    pub price: String,
    pub message: String,
}

/// `GET /provider/quote-requests`
pub fn list_quote_requests_request() -> ApiRequest {
    ApiRequest::get("provider/quote-requests")
}

impl ApiClient {
    /// List quote requests awaiting a response.
    pub async fn list_quote_requests(&self) -> Result<Vec<QuoteRequestRecord>, Error> {
        self.execute(&list_quote_requests_request()).await
    }

    /// Submit a quote without an attachment.
    pub async fn submit_quote(&self, quote: &SubmitQuote) -> Result<QuoteRecord, Error> {
        self.execute(&ApiRequest::post("provider/quotes/submit", quote)?)
            .await
    }

    /// Submit a quote with a document attachment (multipart).
    pub async fn submit_quote_with_attachment(
        &self,
        quote: &SubmitQuote,
        file_name: String,
        contents: Vec<u8>,
    ) -> Result<QuoteRecord, Error> {
        let form = Form::new()
            .text("request_id", quote.request_id.clone())
            .text("price", quote.price.clone())
            .text("message", quote.message.clone())
            .part("attachment", Part::bytes(contents).file_name(file_name));

        self.post_multipart("provider/quotes/submit", form).await
    }
}
