use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use review_common::{
    CatalogFilter, CatalogPage, FilterOptions, RemarkEdit, SaveRemarksRequest, SaveRemarksResponse,
};
use serde::{de::DeserializeOwned, Deserialize};
use tracing::debug;

use crate::error::ClientError;

/// The request/response boundary between the review session and the backend.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn fetch_products(
        &self,
        filter: &CatalogFilter,
        page: u64,
        limit: u64,
    ) -> Result<CatalogPage, ClientError>;

    async fn fetch_filters(&self) -> Result<FilterOptions, ClientError>;

    async fn save_remarks(&self, edits: Vec<RemarkEdit>) -> Result<SaveRemarksResponse, ClientError>;
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// `CatalogApi` over HTTP. Requests are never retried.
pub struct HttpCatalogApi {
    client: Client,
    base_url: String,
}

impl HttpCatalogApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = error_message(status, &body);
            return Err(ClientError::Api { status, message });
        }
        Ok(response.json::<T>().await?)
    }
}

/// The server's `{"error": ...}` text, or the status reason for any other body.
fn error_message(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed.error,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("Unexpected response")
            .to_string(),
    }
}

#[async_trait]
impl CatalogApi for HttpCatalogApi {
    async fn fetch_products(
        &self,
        filter: &CatalogFilter,
        page: u64,
        limit: u64,
    ) -> Result<CatalogPage, ClientError> {
        debug!(?filter, page, limit, "Fetching catalog page.");
        let response = self
            .client
            .get(self.url("products"))
            .query(filter)
            .query(&[("page", page), ("limit", limit)])
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn fetch_filters(&self) -> Result<FilterOptions, ClientError> {
        let response = self.client.get(self.url("filters")).send().await?;
        Self::decode(response).await
    }

    async fn save_remarks(&self, edits: Vec<RemarkEdit>) -> Result<SaveRemarksResponse, ClientError> {
        debug!(count = edits.len(), "Submitting remark batch.");
        let payload = SaveRemarksRequest { products: edits };
        let response = self
            .client
            .post(self.url("products/save-remarks"))
            .json(&payload)
            .send()
            .await?;
        Self::decode(response).await
    }
}
