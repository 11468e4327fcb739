pub mod context;
pub mod filter;
pub mod paginator;
pub mod session;

pub use context::{
    Clock, FixedClock, FixedLocation, LocationProvider, MemoryRecentStore, RecentLocation,
    RecentStore, SearchContext, SystemClock,
};
pub use filter::{FilterManager, RefreshKind, UpdateHook};
pub use paginator::{CardFeed, CardPaginator, FeedStatus, FetchOutcome};
pub use session::SearchSession;
