use crate::constants::HOUR_NAMES;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Price bracket filter. All fields cleared means no price filter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl PriceFilter {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.min.is_none() && self.max.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagFilter {
    #[serde(default)]
    pub positives: BTreeSet<String>,
}

/// Opening hour window, `open` and `close` formatted as `HH:mm`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close: Option<String>,
}

impl HourFilter {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.day.is_none() && self.open.is_none() && self.close.is_none()
    }

    /// Resolve a user supplied hour name, ignoring case, to its canonical form
    pub fn canonical_name(name: &str) -> Option<&'static str> {
        let name = name.trim();
        HOUR_NAMES
            .iter()
            .find(|known| known.eq_ignore_ascii_case(name))
            .copied()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LocationFilter {
    Nearby,
    Anywhere,
    Where {
        name: String,
        #[serde(rename = "latLng")]
        lat_lng: String,
    },
}

/// A named container of places (neighbourhood, mall, district)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Area {
    #[serde(rename = "areaId")]
    pub area_id: String,
    pub name: String,
    #[serde(rename = "latLng", default, skip_serializing_if = "Option::is_none")]
    pub lat_lng: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    #[serde(default)]
    pub price: PriceFilter,
    #[serde(default)]
    pub tag: TagFilter,
    #[serde(default)]
    pub hour: HourFilter,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<Area>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub sort_type: Option<String>,
}

/// Current search intent.
///
/// `from`, `size` and `lat_lng` are per-request transient fields and are ignored by `==`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default)]
    pub filter: Filter,
    #[serde(default)]
    pub sort: Sort,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat_lng: Option<String>,
}

impl PartialEq for SearchQuery {
    fn eq(&self, other: &Self) -> bool {
        self.query == other.query && self.filter == other.filter && self.sort == other.sort
    }
}

impl SearchQuery {
    pub fn new() -> Self {
        SearchQuery::default()
    }

    pub fn with_text(text: &str) -> Self {
        let text = text.trim();
        SearchQuery {
            query: (!text.is_empty()).then(|| text.to_string()),
            ..Default::default()
        }
    }

    /// Nearby semantics (explicit or by default) need a device location
    pub fn requires_location(&self) -> bool {
        if self.filter.area.is_some() {
            return false;
        }

        matches!(self.filter.location, None | Some(LocationFilter::Nearby))
    }

    /// True when any refinement other than location is active
    pub fn is_filtered(&self) -> bool {
        !self.filter.tag.positives.is_empty()
            || !self.filter.price.is_empty()
            || !self.filter.hour.is_empty()
            || self.sort.sort_type.is_some()
    }

    /// Copy of the query carrying the transient fields of one page request
    pub fn for_request(&self, from: usize, size: usize, lat_lng: Option<String>) -> SearchQuery {
        SearchQuery {
            from: Some(from),
            size: Some(size),
            lat_lng,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        LatLng { lat, lng }
    }

    /// Parse the backend `"lat,lng"` representation
    pub fn parse(value: &str) -> Option<LatLng> {
        let (lat, lng) = value.split_once(',')?;
        let lat = lat.trim().parse::<f64>().ok()?;
        let lng = lng.trim().parse::<f64>().ok()?;

        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
            return None;
        }

        Some(LatLng { lat, lng })
    }
}

impl fmt::Display for LatLng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tagged(tags: &[&str]) -> SearchQuery {
        let mut query = SearchQuery::new();
        for tag in tags {
            query.filter.tag.positives.insert(tag.to_string());
        }
        query
    }

    #[test]
    fn test_equality_ignores_transient_fields() {
        let query = tagged(&["halal"]);
        let page_two = query.for_request(2, 15, Some("1.3,103.8".to_string()));

        assert_eq!(query, page_two);
        assert_ne!(query.from, page_two.from);
    }

    #[test]
    fn test_equality_detects_tag_membership() {
        assert_ne!(tagged(&["halal"]), tagged(&["halal", "cafe"]));
        assert_ne!(tagged(&["halal"]), tagged(&["Halal"]));
        assert_eq!(tagged(&["cafe", "halal"]), tagged(&["halal", "cafe"]));
    }

    #[test]
    fn test_wire_shape() {
        let mut query = SearchQuery::with_text("  chicken rice ");
        query.filter.price = PriceFilter {
            name: Some("$".to_string()),
            min: Some(5.0),
            max: Some(15.0),
        };
        query.filter.tag.positives.insert("Halal".to_string());
        query.filter.area = Some(Area {
            area_id: "a-1".to_string(),
            name: "Tiong Bahru".to_string(),
            lat_lng: None,
        });
        query.sort.sort_type = Some("munch:price_lowest".to_string());

        let value = serde_json::to_value(query.for_request(0, 15, None)).unwrap();
        assert_eq!(
            value,
            json!({
                "query": "chicken rice",
                "filter": {
                    "price": {"name": "$", "min": 5.0, "max": 15.0},
                    "tag": {"positives": ["Halal"]},
                    "hour": {},
                    "area": {"areaId": "a-1", "name": "Tiong Bahru"}
                },
                "sort": {"type": "munch:price_lowest"},
                "from": 0,
                "size": 15
            })
        );
    }

    #[test]
    fn test_location_filter_tagging() {
        let value = serde_json::to_value(LocationFilter::Where {
            name: "Home".to_string(),
            lat_lng: "1.3,103.8".to_string(),
        })
        .unwrap();
        assert_eq!(value, json!({"type": "where", "name": "Home", "latLng": "1.3,103.8"}));

        let nearby: LocationFilter = serde_json::from_value(json!({"type": "nearby"})).unwrap();
        assert_eq!(nearby, LocationFilter::Nearby);
    }

    #[test]
    fn test_requires_location() {
        let mut query = SearchQuery::new();
        assert!(query.requires_location());

        query.filter.location = Some(LocationFilter::Nearby);
        assert!(query.requires_location());

        query.filter.location = Some(LocationFilter::Anywhere);
        assert!(!query.requires_location());

        query.filter.location = None;
        query.filter.area = Some(Area {
            area_id: "a-1".to_string(),
            name: "Bugis".to_string(),
            lat_lng: None,
        });
        assert!(!query.requires_location());
    }

    #[test]
    fn test_is_filtered() {
        let mut query = SearchQuery::with_text("pasta");
        assert!(!query.is_filtered());

        query.filter.location = Some(LocationFilter::Anywhere);
        assert!(!query.is_filtered());

        query.filter.hour.name = Some("Open Now".to_string());
        assert!(query.is_filtered());
    }

    #[test]
    fn test_canonical_hour_name() {
        assert_eq!(HourFilter::canonical_name("supper"), Some("Supper"));
        assert_eq!(HourFilter::canonical_name(" open now "), Some("Open Now"));
        assert_eq!(HourFilter::canonical_name("LUNCH"), Some("Lunch"));
        assert_eq!(HourFilter::canonical_name("Brunch"), None);
    }

    #[test]
    fn test_lat_lng_parse() {
        let lat_lng = LatLng::parse("1.3521, 103.8198").unwrap();
        assert_eq!(lat_lng, LatLng::new(1.3521, 103.8198));
        assert_eq!(lat_lng.to_string(), "1.3521,103.8198");

        assert!(LatLng::parse("1.3").is_none());
        assert!(LatLng::parse("91,0").is_none());
        assert!(LatLng::parse("abc,1").is_none());
    }
}
