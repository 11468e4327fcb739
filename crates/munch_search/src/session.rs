use crate::context::SearchContext;
use crate::paginator::CardPaginator;
use munch_client::SearchApi;
use munch_types::SearchQuery;
use std::sync::Arc;
use tracing::debug;

/// Owns the paginator of one screen. Replacing the query cancels the previous
/// session so late pages from it are never applied.
pub struct SearchSession {
    api: Arc<dyn SearchApi>,
    context: SearchContext,
    page_size: usize,
    current: Option<CardPaginator>,
}

impl SearchSession {
    pub fn new(api: Arc<dyn SearchApi>, context: SearchContext, page_size: usize) -> Self {
        SearchSession {
            api,
            context,
            page_size,
            current: None,
        }
    }

    pub fn current(&self) -> Option<&CardPaginator> {
        self.current.as_ref()
    }

    /// Install a fresh paginator for `query`, starting again from page 0
    pub fn replace(&mut self, query: SearchQuery) -> CardPaginator {
        if let Some(previous) = self.current.take() {
            previous.cancel();
        }

        debug!(page_size = self.page_size, "Replacing search session");
        let paginator = CardPaginator::new(self.api.clone(), &self.context, query, self.page_size);
        self.current = Some(paginator.clone());
        paginator
    }

    pub fn is_current(&self, paginator: &CardPaginator) -> bool {
        self.current
            .as_ref()
            .is_some_and(|current| current.same_session(paginator))
    }

    pub fn close(&mut self) {
        if let Some(previous) = self.current.take() {
            previous.cancel();
        }
    }
}

impl Drop for SearchSession {
    fn drop(&mut self) {
        self.close();
    }
}
