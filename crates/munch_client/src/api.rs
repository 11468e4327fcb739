use async_trait::async_trait;
use munch_error::error::ApiError;
use munch_types::{FilterCount, FilterPriceRange, SearchPage, SearchQuery, SearchRequest};

/// Backend search service. Implemented over HTTP by `MunchApiClient`
/// and by fakes in tests.
#[async_trait]
pub trait SearchApi: Send + Sync {
    /// Fetch one page of cards
    async fn search(&self, request: &SearchRequest) -> Result<SearchPage, ApiError>;

    /// Aggregate result and per-tag counts for the query
    async fn filter_count(&self, query: &SearchQuery) -> Result<FilterCount, ApiError>;

    /// Price histogram and percentiles for the query
    async fn filter_price(&self, query: &SearchQuery) -> Result<FilterPriceRange, ApiError>;
}
