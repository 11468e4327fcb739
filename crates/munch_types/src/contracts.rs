use crate::card::SearchCard;
use crate::constants::{PRICE_CHEAP, PRICE_EXPENSIVE, PRICE_MODERATE, SUCCESS_CODE};
use crate::query::SearchQuery;
use munch_error::error::ApiError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetaError {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseMeta {
    pub code: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<MetaError>,
}

/// Envelope wrapping every backend response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseEnvelope<T> {
    pub meta: ResponseMeta,
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qid: Option<String>,
}

impl<T> ResponseEnvelope<T> {
    /// `meta.code == 200` is the only success discriminator
    pub fn check(&self) -> Result<(), ApiError> {
        if self.meta.code == SUCCESS_CODE {
            return Ok(());
        }

        let error = self.meta.error.clone().unwrap_or_default();
        Err(ApiError::ResponseError {
            code: self.meta.code,
            error_type: error
                .error_type
                .unwrap_or_else(|| "UnknownException".to_string()),
            message: error
                .message
                .unwrap_or_else(|| format!("Request failed with code {}", self.meta.code)),
        })
    }
}

/// One page request of a search session
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub query: SearchQuery,
    pub page: usize,
    pub size: usize,
    pub qid: Option<String>,
}

impl SearchRequest {
    pub fn new(query: SearchQuery, page: usize, size: usize, qid: Option<String>) -> Self {
        SearchRequest {
            query,
            page,
            size,
            qid,
        }
    }

    pub fn query_params(&self) -> HashMap<String, String> {
        let mut params = HashMap::new();
        params.insert("from".to_string(), self.page.to_string());
        params.insert("size".to_string(), self.size.to_string());
        if let Some(qid) = &self.qid {
            params.insert("qid".to_string(), qid.clone());
        }
        params
    }

    /// JSON body of the request. Paging travels in the query string only.
    pub fn body(&self) -> SearchQuery {
        SearchQuery {
            from: None,
            size: None,
            ..self.query.clone()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchPage {
    pub cards: Vec<SearchCard>,
    pub qid: Option<String>,
}

/// Result of `/search/filter/count`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCount {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub tags: BTreeMap<String, u64>,
}

impl FilterCount {
    pub fn tag_count(&self, tag: &str) -> u64 {
        self.tags
            .get(tag)
            .or_else(|| self.tags.get(&tag.to_lowercase()))
            .copied()
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePercentile {
    pub percent: f64,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceTier {
    pub name: String,
    pub min: f64,
    pub max: f64,
}

/// Result of `/search/filter/price`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterPriceRange {
    #[serde(default)]
    pub frequency: BTreeMap<String, u64>,
    #[serde(default)]
    pub percentiles: Vec<PricePercentile>,
}

impl FilterPriceRange {
    /// Price recorded at the percentile closest to `percent`
    pub fn price_at(&self, percent: f64) -> Option<f64> {
        self.percentiles
            .iter()
            .min_by(|a, b| {
                (a.percent - percent)
                    .abs()
                    .total_cmp(&(b.percent - percent).abs())
            })
            .map(|p| p.price)
    }

    /// `$`, `$$` and `$$$` brackets cut at the 30th and 70th percentiles
    pub fn tiers(&self) -> Vec<PriceTier> {
        let bounds = [
            (PRICE_CHEAP, 0.0, 30.0),
            (PRICE_MODERATE, 30.0, 70.0),
            (PRICE_EXPENSIVE, 70.0, 100.0),
        ];

        bounds
            .iter()
            .filter_map(|(name, low, high)| {
                let min = self.price_at(*low)?;
                let max = self.price_at(*high)?;
                Some(PriceTier {
                    name: name.to_string(),
                    min,
                    max,
                })
            })
            .collect()
    }
}
