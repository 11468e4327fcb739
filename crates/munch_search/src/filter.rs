use crate::context::{Clock, RecentLocation, RecentStore, SearchContext};
use chrono::{NaiveDateTime, TimeDelta, Timelike};
use munch_types::{Area, HourFilter, LocationFilter, PriceFilter, SearchQuery, HOUR_OPEN_NOW};
use std::sync::Arc;
use tracing::debug;

/// Called with the new query after every mutation, in registration order.
/// Hooks run on the mutating thread and must not block.
pub type UpdateHook = Box<dyn Fn(&SearchQuery) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshKind {
    /// The query differs from what is displayed, show the filtering state
    FiltersChanged,
    /// Same query, only reload the list
    Unchanged,
}

/// Working copy of a search query with typed mutations.
pub struct FilterManager {
    query: SearchQuery,
    hooks: Vec<UpdateHook>,
    clock: Arc<dyn Clock>,
    recent: Arc<dyn RecentStore>,
}

impl FilterManager {
    pub fn new(query: SearchQuery, context: &SearchContext) -> Self {
        FilterManager {
            query,
            hooks: Vec::new(),
            clock: context.clock.clone(),
            recent: context.recent.clone(),
        }
    }

    pub fn query(&self) -> &SearchQuery {
        &self.query
    }

    pub fn into_query(self) -> SearchQuery {
        self.query
    }

    pub fn add_update_hook<F>(&mut self, hook: F)
    where
        F: Fn(&SearchQuery) + Send + Sync + 'static,
    {
        self.hooks.push(Box::new(hook));
    }

    fn notify(&self) {
        for hook in &self.hooks {
            hook(&self.query);
        }
    }

    pub fn is_tag_selected(&self, tag: &str) -> bool {
        self.query.filter.tag.positives.contains(tag)
    }

    fn set_tag(&mut self, tag: &str, selected: bool) {
        let positives = &mut self.query.filter.tag.positives;
        if selected {
            positives.insert(tag.to_string());
        } else {
            positives.remove(tag);
            // older queries stored tags lowercased
            positives.remove(&tag.to_lowercase());
        }
    }

    pub fn select_tag(&mut self, tag: &str, selected: bool) {
        self.set_tag(tag, selected);
        self.notify();
    }

    pub fn reset_tags(&mut self, tags: &[&str]) {
        for tag in tags {
            self.set_tag(tag, false);
        }
        self.notify();
    }

    pub fn is_hour_selected(&self, name: &str) -> bool {
        if name == HOUR_OPEN_NOW {
            return self.query.filter.hour.name.as_deref() == Some(name);
        }
        self.is_tag_selected(name)
    }

    /// "Open Now" sets a one hour window from the clock. Every other named
    /// hour (Breakfast, Lunch, Dinner, Supper) is a tag. Both toggle.
    pub fn select_hour(&mut self, name: &str) {
        if name == HOUR_OPEN_NOW {
            if self.query.filter.hour.name.as_deref() == Some(name) {
                self.query.filter.hour = HourFilter::default();
            } else {
                self.query.filter.hour = open_now_window(self.clock.now());
            }
        } else {
            let selected = self.is_tag_selected(name);
            self.set_tag(name, !selected);
        }
        self.notify();
    }

    pub fn select_price(&mut self, name: &str, min: f64, max: f64) {
        if self.query.filter.price.name.as_deref() == Some(name) {
            self.query.filter.price = PriceFilter::default();
        } else {
            self.query.filter.price = PriceFilter {
                name: Some(name.to_string()),
                min: Some(min),
                max: Some(max),
            };
        }
        self.notify();
    }

    pub fn reset_price(&mut self) {
        self.query.filter.price = PriceFilter::default();
        self.notify();
    }

    pub fn select_location(&mut self, location: LocationFilter, save: bool) {
        self.query.filter.area = None;
        self.query.filter.location = Some(location.clone());

        if save && matches!(location, LocationFilter::Where { .. }) {
            self.recent.push(RecentLocation::Location(location));
        }
        self.notify();
    }

    pub fn select_area(&mut self, area: Area, save: bool) {
        self.query.filter.location = None;
        self.query.filter.area = Some(area.clone());

        if save {
            self.recent.push(RecentLocation::Area(area));
        }
        self.notify();
    }

    pub fn select_sort(&mut self, sort_type: Option<&str>) {
        self.query.sort.sort_type = sort_type.map(|s| s.to_string());
        self.notify();
    }

    /// Clears every refinement. Location and area are kept.
    pub fn reset(&mut self) {
        let filter = &mut self.query.filter;
        filter.tag.positives.clear();
        filter.hour = HourFilter::default();
        filter.price = PriceFilter::default();
        self.query.sort.sort_type = None;

        debug!("Filters reset");
        self.notify();
    }

    pub fn recent_locations(&self) -> Vec<RecentLocation> {
        self.recent.list()
    }

    pub fn refresh_kind(&self, displayed: &SearchQuery) -> RefreshKind {
        if self.query == *displayed {
            RefreshKind::Unchanged
        } else {
            RefreshKind::FiltersChanged
        }
    }
}

fn open_now_window(now: NaiveDateTime) -> HourFilter {
    let day = now.format("%a").to_string().to_lowercase();

    // the window never crosses midnight
    let (open, close) = if now.hour() == 23 {
        ("23:00".to_string(), "23:59".to_string())
    } else {
        let close = now + TimeDelta::hours(1);
        (
            now.format("%H:%M").to_string(),
            close.format("%H:%M").to_string(),
        )
    };

    HourFilter {
        name: Some(HOUR_OPEN_NOW.to_string()),
        day: Some(day),
        open: Some(open),
        close: Some(close),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{FixedClock, FixedLocation, MemoryRecentStore};
    use chrono::NaiveDate;
    use munch_types::{HOUR_BREAKFAST, MAX_RECENT_LOCATIONS};
    use std::sync::Mutex;

    fn context_at(hour: u32, minute: u32) -> SearchContext {
        // 2024-03-15 is a Friday
        let now = NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap();
        SearchContext::new(
            Arc::new(FixedLocation::unavailable()),
            Arc::new(FixedClock(now)),
            Arc::new(MemoryRecentStore::default()),
        )
    }

    fn manager() -> FilterManager {
        FilterManager::new(SearchQuery::new(), &context_at(12, 30))
    }

    fn where_location(name: &str) -> LocationFilter {
        LocationFilter::Where {
            name: name.to_string(),
            lat_lng: "1.28,103.85".to_string(),
        }
    }

    fn area(id: &str) -> Area {
        Area {
            area_id: id.to_string(),
            name: format!("Area {}", id),
            lat_lng: None,
        }
    }

    #[test]
    fn test_select_tag() {
        let mut manager = manager();
        manager.select_tag("Halal", true);
        manager.select_tag("Cafe", true);
        manager.select_tag("Halal", true);
        assert_eq!(manager.query().filter.tag.positives.len(), 2);

        manager.select_tag("Halal", false);
        assert!(!manager.is_tag_selected("Halal"));
        assert!(manager.is_tag_selected("Cafe"));
    }

    #[test]
    fn test_reset_tags_strips_lowercase_duplicate() {
        let mut manager = manager();
        manager.select_tag("Halal", true);
        manager.select_tag("halal", true);
        manager.select_tag("Bar", true);

        manager.reset_tags(&["Halal"]);

        let positives = &manager.query().filter.tag.positives;
        assert!(!positives.contains("Halal"));
        assert!(!positives.contains("halal"));
        assert!(positives.contains("Bar"));
    }

    #[test]
    fn test_open_now_toggle() {
        let mut manager = manager();
        let original = manager.query().filter.hour.clone();

        manager.select_hour(HOUR_OPEN_NOW);
        let hour = &manager.query().filter.hour;
        assert_eq!(hour.name.as_deref(), Some(HOUR_OPEN_NOW));
        assert_eq!(hour.day.as_deref(), Some("fri"));
        assert_eq!(hour.open.as_deref(), Some("12:30"));
        assert_eq!(hour.close.as_deref(), Some("13:30"));
        assert!(manager.is_hour_selected(HOUR_OPEN_NOW));

        manager.select_hour(HOUR_OPEN_NOW);
        assert_eq!(manager.query().filter.hour, original);
        assert!(!manager.is_hour_selected(HOUR_OPEN_NOW));
    }

    #[test]
    fn test_open_now_late_night_does_not_wrap() {
        let mut manager = FilterManager::new(SearchQuery::new(), &context_at(23, 30));
        manager.select_hour(HOUR_OPEN_NOW);

        let hour = &manager.query().filter.hour;
        assert_eq!(hour.open.as_deref(), Some("23:00"));
        assert_eq!(hour.close.as_deref(), Some("23:59"));

        let mut manager = FilterManager::new(SearchQuery::new(), &context_at(22, 45));
        manager.select_hour(HOUR_OPEN_NOW);
        assert_eq!(manager.query().filter.hour.close.as_deref(), Some("23:45"));
    }

    #[test]
    fn test_named_hour_is_tag() {
        let mut manager = manager();
        manager.select_hour(HOUR_BREAKFAST);
        assert!(manager.is_tag_selected(HOUR_BREAKFAST));
        assert!(manager.is_hour_selected(HOUR_BREAKFAST));
        assert!(manager.query().filter.hour.is_empty());

        manager.select_hour(HOUR_BREAKFAST);
        assert!(!manager.is_tag_selected(HOUR_BREAKFAST));
    }

    #[test]
    fn test_price_toggle() {
        let mut manager = manager();
        manager.select_price("$", 5.0, 15.0);
        assert_eq!(manager.query().filter.price.name.as_deref(), Some("$"));
        assert_eq!(manager.query().filter.price.max, Some(15.0));

        manager.select_price("$$", 15.0, 40.0);
        assert_eq!(manager.query().filter.price.name.as_deref(), Some("$$"));

        manager.select_price("$$", 15.0, 40.0);
        assert!(manager.query().filter.price.name.is_none());
        assert!(manager.query().filter.price.is_empty());

        manager.select_price("$", 5.0, 15.0);
        manager.reset_price();
        assert!(manager.query().filter.price.is_empty());
    }

    #[test]
    fn test_location_and_area_are_exclusive() {
        let mut manager = manager();
        manager.select_area(area("1"), false);
        assert!(manager.query().filter.location.is_none());
        assert!(manager.query().filter.area.is_some());

        manager.select_location(LocationFilter::Anywhere, false);
        assert!(manager.query().filter.area.is_none());
        assert_eq!(
            manager.query().filter.location,
            Some(LocationFilter::Anywhere)
        );
    }

    #[test]
    fn test_location_recency() {
        let mut manager = manager();
        manager.select_location(LocationFilter::Nearby, true);
        manager.select_location(where_location("Office"), false);
        assert!(manager.recent_locations().is_empty());

        for i in 0..10 {
            manager.select_location(where_location(&format!("Place {}", i)), true);
        }
        manager.select_area(area("tb"), true);

        let recent = manager.recent_locations();
        assert_eq!(recent.len(), MAX_RECENT_LOCATIONS);
        assert_eq!(recent[0], RecentLocation::Area(area("tb")));
        assert_eq!(recent[1].name(), "Place 9");
    }

    #[test]
    fn test_reset_keeps_location() {
        let mut manager = manager();
        manager.select_area(area("1"), false);
        manager.select_tag("Halal", true);
        manager.select_hour(HOUR_OPEN_NOW);
        manager.select_price("$", 5.0, 15.0);
        manager.select_sort(Some("munch:rating"));
        assert!(manager.query().is_filtered());

        manager.reset();

        let query = manager.query();
        assert!(!query.is_filtered());
        assert!(query.filter.tag.positives.is_empty());
        assert!(query.filter.hour.is_empty());
        assert!(query.sort.sort_type.is_none());
        assert_eq!(query.filter.area, Some(area("1")));
    }

    #[test]
    fn test_hooks_run_in_order_with_snapshot() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut manager = manager();

        let first = seen.clone();
        manager.add_update_hook(move |query| {
            first
                .lock()
                .unwrap()
                .push(format!("first:{}", query.filter.tag.positives.len()));
        });
        let second = seen.clone();
        manager.add_update_hook(move |query| {
            second
                .lock()
                .unwrap()
                .push(format!("second:{}", query.filter.tag.positives.len()));
        });

        manager.select_tag("Halal", true);
        manager.reset();

        assert_eq!(
            *seen.lock().unwrap(),
            vec!["first:1", "second:1", "first:0", "second:0"]
        );
    }

    #[test]
    fn test_refresh_kind() {
        let mut manager = manager();
        let displayed = manager.query().clone();
        assert_eq!(manager.refresh_kind(&displayed), RefreshKind::Unchanged);

        manager.select_tag("Halal", true);
        assert_eq!(manager.refresh_kind(&displayed), RefreshKind::FiltersChanged);

        manager.select_tag("Halal", false);
        let paged = displayed.for_request(3, 15, Some("1.3,103.8".to_string()));
        assert_eq!(manager.refresh_kind(&paged), RefreshKind::Unchanged);
    }
}
