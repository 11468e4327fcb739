use crate::api::SearchApi;
use async_trait::async_trait;
use munch_error::error::ApiError;
use munch_settings::config::ApiSettings;
use munch_types::{
    FilterCount, FilterPriceRange, ResponseEnvelope, SearchCard, SearchPage, SearchQuery,
    SearchRequest,
};
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, warn};

const CLIENT_VERSION_HEADER: &str = "X-Client-Version";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Routes {
    Search,
    FilterCount,
    FilterPrice,
}

impl Routes {
    pub fn as_str(&self) -> &str {
        match self {
            Routes::Search => "search",
            Routes::FilterCount => "search/filter/count",
            Routes::FilterPrice => "search/filter/price",
        }
    }
}

/// Create a new HTTP client that can be shared across different api clients
pub fn build_http_client(settings: &ApiSettings) -> Result<Client, ApiError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        CLIENT_VERSION_HEADER,
        HeaderValue::from_str(&settings.client_version)
            .map_err(|e| ApiError::Error(format!("Failed to create header with error: {}", e)))?,
    );

    let client_builder =
        Client::builder().timeout(std::time::Duration::from_secs(settings.timeout_secs));
    let client = client_builder
        .default_headers(headers)
        .build()
        .map_err(|e| ApiError::Error(format!("Failed to create client with error: {}", e)))?;
    Ok(client)
}

/// Client for the search backend. Requests are never retried: a failure is
/// returned to the caller which ends the pagination session.
#[derive(Debug, Clone)]
pub struct MunchApiClient {
    client: Client,
    settings: ApiSettings,
    base_path: String,
}

impl MunchApiClient {
    pub fn new(settings: &ApiSettings, client: &Client) -> Self {
        Self {
            client: client.clone(),
            settings: settings.clone(),
            base_path: settings.base_path(),
        }
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    async fn request(
        &self,
        route: Routes,
        body_params: &SearchQuery,
        query_params: HashMap<String, String>,
    ) -> Result<Value, ApiError> {
        let url = format!("{}/{}", self.base_path, route.as_str());

        let mut builder = self.client.post(url).query(&query_params).json(body_params);
        if let Some(token) = &self.settings.auth_token {
            builder = builder.bearer_auth(token);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Error(format!("Failed to send request with error: {}", e)))?;

        // error envelopes may come back with a non-2xx status, so the body is inspected first
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Error(format!("Failed to read response with error: {}", e)))?;

        serde_json::from_str::<Value>(&text).map_err(|e| {
            if status.is_success() {
                ApiError::DecodeError(format!("Failed to parse response with error: {}", e))
            } else {
                ApiError::Error(format!("Request failed with status: {}", status))
            }
        })
    }

    fn decode<T: DeserializeOwned>(response: Value) -> Result<ResponseEnvelope<T>, ApiError> {
        let envelope = serde_json::from_value::<ResponseEnvelope<T>>(response)
            .map_err(|e| ApiError::DecodeError(format!("Failed to deserialize response: {}", e)))?;

        envelope.check()?;
        Ok(envelope)
    }
}

#[async_trait]
impl SearchApi for MunchApiClient {
    async fn search(&self, request: &SearchRequest) -> Result<SearchPage, ApiError> {
        debug!(page = request.page, size = request.size, qid = ?request.qid, "Requesting search page");

        let response = self
            .request(Routes::Search, &request.body(), request.query_params())
            .await
            .inspect_err(|e| warn!(page = request.page, error = %e, "Search request failed"))?;

        let envelope = Self::decode::<Vec<SearchCard>>(response)?;

        Ok(SearchPage {
            cards: envelope.data.unwrap_or_default(),
            qid: envelope.qid,
        })
    }

    async fn filter_count(&self, query: &SearchQuery) -> Result<FilterCount, ApiError> {
        let response = self
            .request(Routes::FilterCount, query, HashMap::new())
            .await?;

        let envelope = Self::decode::<FilterCount>(response)?;
        Ok(envelope.data.unwrap_or_default())
    }

    async fn filter_price(&self, query: &SearchQuery) -> Result<FilterPriceRange, ApiError> {
        let response = self
            .request(Routes::FilterPrice, query, HashMap::new())
            .await?;

        let envelope = Self::decode::<FilterPriceRange>(response)?;
        Ok(envelope.data.unwrap_or_default())
    }
}
