use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Renderer selector of a card.
///
/// Server kinds come back from `/search`; injected kinds are synthesized by the
/// client for loading and error states. Ids this client does not know are kept
/// verbatim in `Unknown` so newer server cards survive a round trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CardKind {
    Place,
    SmallPlace,
    Area,
    Container,
    Header,
    SuggestionTag,

    Loading,
    NoResult,
    NoLocation,
    QueryError,
    Unsupported,

    Unknown(String),
}

impl CardKind {
    pub fn as_str(&self) -> &str {
        match self {
            CardKind::Place => "basic_Place",
            CardKind::SmallPlace => "basic_SmallPlace",
            CardKind::Area => "basic_Area",
            CardKind::Container => "basic_Container",
            CardKind::Header => "basic_Header",
            CardKind::SuggestionTag => "basic_SuggestionTag",
            CardKind::Loading => "injected_Loading",
            CardKind::NoResult => "injected_NoResult",
            CardKind::NoLocation => "injected_NoLocation",
            CardKind::QueryError => "injected_QueryError",
            CardKind::Unsupported => "injected_Unsupported",
            CardKind::Unknown(id) => id,
        }
    }

    pub fn is_injected(&self) -> bool {
        matches!(
            self,
            CardKind::Loading
                | CardKind::NoResult
                | CardKind::NoLocation
                | CardKind::QueryError
                | CardKind::Unsupported
        )
    }
}

impl From<String> for CardKind {
    fn from(id: String) -> Self {
        match id.as_str() {
            "basic_Place" => CardKind::Place,
            "basic_SmallPlace" => CardKind::SmallPlace,
            "basic_Area" => CardKind::Area,
            "basic_Container" => CardKind::Container,
            "basic_Header" => CardKind::Header,
            "basic_SuggestionTag" => CardKind::SuggestionTag,
            "injected_Loading" => CardKind::Loading,
            "injected_NoResult" => CardKind::NoResult,
            "injected_NoLocation" => CardKind::NoLocation,
            "injected_QueryError" => CardKind::QueryError,
            "injected_Unsupported" => CardKind::Unsupported,
            _ => CardKind::Unknown(id),
        }
    }
}

impl From<CardKind> for String {
    fn from(kind: CardKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for CardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single entry of the result list. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchCard {
    #[serde(rename = "_cardId")]
    pub kind: CardKind,
    #[serde(rename = "_uniqueId", default, skip_serializing_if = "Option::is_none")]
    pub unique_id: Option<String>,
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

// Identity is the unique id when both cards carry one, so overlapping pages dedupe.
impl PartialEq for SearchCard {
    fn eq(&self, other: &Self) -> bool {
        match (&self.unique_id, &other.unique_id) {
            (Some(a), Some(b)) => a == b,
            _ => {
                self.kind == other.kind
                    && self.unique_id == other.unique_id
                    && self.data == other.data
            }
        }
    }
}

impl SearchCard {
    pub fn new(kind: CardKind, unique_id: Option<String>, data: Map<String, Value>) -> Self {
        SearchCard {
            kind,
            unique_id,
            data,
        }
    }

    pub fn loading(index: usize) -> Self {
        SearchCard::new(CardKind::Loading, Some(format!("loading-{}", index)), Map::new())
    }

    pub fn no_result() -> Self {
        SearchCard::new(CardKind::NoResult, Some("no-result".to_string()), Map::new())
    }

    pub fn no_location() -> Self {
        SearchCard::new(CardKind::NoLocation, Some("no-location".to_string()), Map::new())
    }

    pub fn query_error(error_type: &str, message: &str) -> Self {
        let mut data = Map::new();
        data.insert("type".to_string(), Value::String(error_type.to_string()));
        data.insert("message".to_string(), Value::String(message.to_string()));
        SearchCard::new(CardKind::QueryError, Some("query-error".to_string()), data)
    }

    pub fn unsupported(message: &str) -> Self {
        let mut data = Map::new();
        data.insert("message".to_string(), Value::String(message.to_string()));
        SearchCard::new(CardKind::Unsupported, Some("unsupported".to_string()), data)
    }

    pub fn is_injected(&self) -> bool {
        self.kind.is_injected()
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }

    /// Best effort label for listing the card
    pub fn title(&self) -> Option<&str> {
        self.get_str("name")
            .or_else(|| self.get_str("title"))
            .or_else(|| self.get_str("message"))
    }
}
