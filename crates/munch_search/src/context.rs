use chrono::{Local, NaiveDateTime};
use munch_types::{Area, LatLng, LocationFilter, MAX_RECENT_LOCATIONS};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

/// Last known device location
pub trait LocationProvider: Send + Sync {
    fn current_lat_lng(&self) -> Option<LatLng>;
}

#[derive(Debug, Clone, Default)]
pub struct FixedLocation {
    lat_lng: Option<LatLng>,
}

impl FixedLocation {
    pub fn new(lat_lng: Option<LatLng>) -> Self {
        FixedLocation { lat_lng }
    }

    pub fn unavailable() -> Self {
        FixedLocation { lat_lng: None }
    }
}

impl LocationProvider for FixedLocation {
    fn current_lat_lng(&self) -> Option<LatLng> {
        self.lat_lng
    }
}

/// Wall clock used for the "Open Now" window
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecentLocation {
    Location(LocationFilter),
    Area(Area),
}

impl RecentLocation {
    pub fn name(&self) -> &str {
        match self {
            RecentLocation::Location(LocationFilter::Where { name, .. }) => name.as_str(),
            RecentLocation::Location(LocationFilter::Nearby) => "Nearby",
            RecentLocation::Location(LocationFilter::Anywhere) => "Anywhere",
            RecentLocation::Area(area) => area.name.as_str(),
        }
    }
}

/// Recently selected locations, newest first.
///
/// `push` is called from filter mutations and must return without blocking.
pub trait RecentStore: Send + Sync {
    fn push(&self, entry: RecentLocation);
    fn list(&self) -> Vec<RecentLocation>;
}

#[derive(Debug)]
pub struct MemoryRecentStore {
    entries: Mutex<VecDeque<RecentLocation>>,
    capacity: usize,
}

impl Default for MemoryRecentStore {
    fn default() -> Self {
        MemoryRecentStore::with_capacity(MAX_RECENT_LOCATIONS)
    }
}

impl MemoryRecentStore {
    pub fn with_capacity(capacity: usize) -> Self {
        MemoryRecentStore {
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }
}

impl RecentStore for MemoryRecentStore {
    fn push(&self, entry: RecentLocation) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);

        entries.retain(|existing| existing != &entry);
        debug!(name = entry.name(), "Recording recent location");
        entries.push_front(entry);
        entries.truncate(self.capacity);
    }

    fn list(&self) -> Vec<RecentLocation> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.iter().cloned().collect()
    }
}

/// Services injected into the filter manager and paginator
#[derive(Clone)]
pub struct SearchContext {
    pub location: Arc<dyn LocationProvider>,
    pub clock: Arc<dyn Clock>,
    pub recent: Arc<dyn RecentStore>,
}

impl Default for SearchContext {
    fn default() -> Self {
        SearchContext::with_location(None)
    }
}

impl SearchContext {
    pub fn new(
        location: Arc<dyn LocationProvider>,
        clock: Arc<dyn Clock>,
        recent: Arc<dyn RecentStore>,
    ) -> Self {
        SearchContext {
            location,
            clock,
            recent,
        }
    }

    pub fn with_location(lat_lng: Option<LatLng>) -> Self {
        SearchContext {
            location: Arc::new(FixedLocation::new(lat_lng)),
            clock: Arc::new(SystemClock),
            recent: Arc::new(MemoryRecentStore::default()),
        }
    }

    pub fn lat_lng(&self) -> Option<LatLng> {
        self.location.current_lat_lng()
    }
}
