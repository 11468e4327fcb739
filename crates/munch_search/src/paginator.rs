//! Paged retrieval of search cards for a single query.
//!
//! A `CardPaginator` owns one search session. It fetches page 0 on `start`,
//! further pages on `append`, merges them into an accumulated, de-duplicated
//! list and publishes every change on a `watch` channel. Failures never escape
//! as errors: they end the session with an inline card.

use crate::context::{LocationProvider, SearchContext};
use munch_client::SearchApi;
use munch_error::error::ApiError;
use munch_types::{SearchCard, SearchPage, SearchQuery, SearchRequest, LOADING_CARD_COUNT};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedStatus {
    /// Not started yet
    Idle,
    Loading,
    /// Last page merged, more may follow
    Ready,
    /// Backend returned an empty page
    Complete,
    /// Session ended with an error card
    Failed,
}

/// Snapshot published to subscribers after every change
#[derive(Debug, Clone, PartialEq)]
pub struct CardFeed {
    pub cards: Vec<SearchCard>,
    pub more: bool,
    pub loading: bool,
    pub status: FeedStatus,
}

impl CardFeed {
    fn idle() -> Self {
        CardFeed {
            cards: Vec::new(),
            more: false,
            loading: false,
            status: FeedStatus::Idle,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Page merged, holding the number of new cards
    Appended(usize),
    /// Empty page, no more results
    Exhausted,
    /// Request failed, an error card was appended
    Failed,
    /// Location required but unavailable, no request was issued
    LocationUnavailable,
    /// Not started, already loading or nothing more to load
    Skipped,
    Cancelled,
}

#[derive(Debug)]
struct PageState {
    cards: Vec<SearchCard>,
    seen: HashSet<String>,
    page: usize,
    loading: bool,
    more: bool,
    qid: Option<String>,
    started: bool,
    status: FeedStatus,
}

impl PageState {
    fn new() -> Self {
        PageState {
            cards: Vec::new(),
            seen: HashSet::new(),
            page: 0,
            loading: false,
            more: false,
            qid: None,
            started: false,
            status: FeedStatus::Idle,
        }
    }

    fn feed(&self) -> CardFeed {
        CardFeed {
            cards: self.cards.clone(),
            more: self.more,
            loading: self.loading,
            status: self.status,
        }
    }

    fn merge(&mut self, request_page: usize, page: SearchPage) -> FetchOutcome {
        if request_page == 0 {
            self.qid = page.qid;
        }

        if page.cards.is_empty() {
            self.more = false;
            self.status = FeedStatus::Complete;
            if request_page == 0 && self.cards.is_empty() {
                self.cards.push(SearchCard::no_result());
            }
            return FetchOutcome::Exhausted;
        }

        let mut appended = 0;
        for card in page.cards {
            // pages may overlap when the backend shifts under concurrent writes
            if self.is_duplicate(&card) {
                continue;
            }
            if let Some(id) = &card.unique_id {
                self.seen.insert(id.clone());
            }
            self.cards.push(card);
            appended += 1;
        }

        self.page = request_page + 1;
        self.more = true;
        self.status = FeedStatus::Ready;
        FetchOutcome::Appended(appended)
    }

    /// Identified cards are looked up by id, the rest by structural equality
    fn is_duplicate(&self, card: &SearchCard) -> bool {
        match &card.unique_id {
            Some(id) => self.seen.contains(id),
            None => self.cards.contains(card),
        }
    }

    fn fail(&mut self, error: &ApiError) -> FetchOutcome {
        let card = if error.is_unsupported() {
            SearchCard::unsupported(&error.message())
        } else {
            SearchCard::query_error(error.error_type(), &error.message())
        };

        self.cards.push(card);
        self.more = false;
        self.status = FeedStatus::Failed;
        FetchOutcome::Failed
    }
}

struct PaginatorInner {
    api: Arc<dyn SearchApi>,
    location: Arc<dyn LocationProvider>,
    query: SearchQuery,
    page_size: usize,
    state: Mutex<PageState>,
    feed: watch::Sender<CardFeed>,
    cancel: CancellationToken,
}

/// Handle to one pagination session. Clones share the same session.
#[derive(Clone)]
pub struct CardPaginator {
    inner: Arc<PaginatorInner>,
}

impl CardPaginator {
    pub fn new(
        api: Arc<dyn SearchApi>,
        context: &SearchContext,
        query: SearchQuery,
        page_size: usize,
    ) -> Self {
        let (feed, _) = watch::channel(CardFeed::idle());

        CardPaginator {
            inner: Arc::new(PaginatorInner {
                api,
                location: context.location.clone(),
                query,
                page_size: page_size.max(1),
                state: Mutex::new(PageState::new()),
                feed,
                cancel: CancellationToken::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, PageState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, feed: CardFeed) {
        if !self.inner.cancel.is_cancelled() {
            self.inner.feed.send_replace(feed);
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<CardFeed> {
        self.inner.feed.subscribe()
    }

    /// Latest published feed
    pub fn feed(&self) -> CardFeed {
        self.inner.feed.borrow().clone()
    }

    pub fn query(&self) -> &SearchQuery {
        &self.inner.query
    }

    pub fn cards(&self) -> Vec<SearchCard> {
        self.lock().cards.clone()
    }

    pub fn page(&self) -> usize {
        self.lock().page
    }

    pub fn more(&self) -> bool {
        self.lock().more
    }

    pub fn loading(&self) -> bool {
        self.lock().loading
    }

    pub fn qid(&self) -> Option<String> {
        self.lock().qid.clone()
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancel.is_cancelled()
    }

    /// True when both handles point at the same session
    pub fn same_session(&self, other: &CardPaginator) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Begin the session. Placeholder cards are published before any request
    /// is made; page 0 is fetched unless a required location is missing.
    pub async fn start(&self) -> FetchOutcome {
        {
            let mut state = self.lock();
            if self.is_cancelled() {
                return FetchOutcome::Cancelled;
            }
            if state.started {
                return FetchOutcome::Skipped;
            }
            state.started = true;

            self.publish(CardFeed {
                cards: (0..LOADING_CARD_COUNT).map(SearchCard::loading).collect(),
                more: true,
                loading: true,
                status: FeedStatus::Loading,
            });

            if self.inner.query.requires_location()
                && self.inner.location.current_lat_lng().is_none()
            {
                warn!("Search requires a location but none is available");
                state.cards.push(SearchCard::no_location());
                state.more = false;
                state.status = FeedStatus::Failed;
                self.publish(state.feed());
                return FetchOutcome::LocationUnavailable;
            }

            state.loading = true;
            state.more = true;
            state.status = FeedStatus::Loading;
        }

        info!(query = ?self.inner.query.query, "Search session started");
        self.fetch().await
    }

    /// Fetch the next page. A call while a fetch is in flight is a no-op.
    pub async fn append(&self) -> FetchOutcome {
        {
            let mut state = self.lock();
            if self.is_cancelled() {
                return FetchOutcome::Cancelled;
            }
            if !state.started || state.loading || !state.more {
                return FetchOutcome::Skipped;
            }

            state.loading = true;
            state.status = FeedStatus::Loading;
            self.publish(state.feed());
        }

        self.fetch().await
    }

    /// `append` on the runtime, for scroll triggered loads
    pub fn append_in_background(&self) -> JoinHandle<FetchOutcome> {
        let paginator = self.clone();
        tokio::spawn(async move { paginator.append().await })
    }

    /// Stop the session. In-flight results are dropped and nothing more is published.
    pub fn cancel(&self) {
        if !self.inner.cancel.is_cancelled() {
            debug!("Search session cancelled");
            self.inner.cancel.cancel();
        }
    }

    async fn fetch(&self) -> FetchOutcome {
        let request = {
            let state = self.lock();
            let lat_lng = self
                .inner
                .location
                .current_lat_lng()
                .map(|lat_lng| lat_lng.to_string());
            let query = self
                .inner
                .query
                .for_request(state.page, self.inner.page_size, lat_lng);

            SearchRequest::new(query, state.page, self.inner.page_size, state.qid.clone())
        };

        debug!(page = request.page, "Fetching search page");

        let result = tokio::select! {
            _ = self.inner.cancel.cancelled() => None,
            result = self.inner.api.search(&request) => Some(result),
        };

        let mut state = self.lock();
        state.loading = false;

        let result = match result {
            Some(result) if !self.is_cancelled() => result,
            _ => return FetchOutcome::Cancelled,
        };

        let outcome = match result {
            Ok(page) => {
                let outcome = state.merge(request.page, page);
                debug!(
                    page = request.page,
                    ?outcome,
                    total = state.cards.len(),
                    "Merged search page"
                );
                outcome
            }
            Err(error) => {
                warn!(page = request.page, error = %error, "Search page failed");
                state.fail(&error)
            }
        };

        self.publish(state.feed());
        outcome
    }
}
