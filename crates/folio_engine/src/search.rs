//! Search IO: debounced input, one in-flight page fetch at a time, and
//! best-effort suggestions.
use std::sync::{Arc, Mutex, PoisonError};

use folio_core::{
    Event, Msg, PageRequest, RequestError, RequestToken, SearchResultPage, StatusChange,
};
use folio_logging::{folio_debug, folio_warn};
use tokio_util::sync::CancellationToken;

use crate::api::ManifestApi;
use crate::cancel::cancellable;
use crate::debounce::Debouncer;
use crate::runner::MsgSink;

pub struct SearchController {
    debouncer: Debouncer,
    in_flight: Mutex<Option<CancellationToken>>,
}

impl SearchController {
    pub fn new(debouncer: Debouncer) -> Self {
        Self {
            debouncer,
            in_flight: Mutex::new(None),
        }
    }

    /// Emits `SearchRequested` once input has been quiet for the debounce delay.
    pub fn input_changed(&self, sink: Arc<dyn MsgSink>, query: String, suggestions: bool) {
        folio_debug!("search input {:?}, waiting {:?}", query, self.debouncer.delay());
        self.debouncer.schedule(async move {
            sink.emit(Msg::SearchRequested { query, suggestions });
        });
    }

    /// Cancels the previous in-flight fetch and returns the token for the next one.
    pub fn begin_fetch(&self) -> CancellationToken {
        let cancel = CancellationToken::new();
        let previous = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(cancel.clone());
        if let Some(previous) = previous {
            previous.cancel();
        }
        cancel
    }

    /// Drops both the scheduled input and the in-flight fetch.
    pub fn cancel(&self) {
        self.debouncer.cancel();
        let previous = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(previous) = previous {
            previous.cancel();
        }
    }
}

/// Fetches one search page. Returns `None` when the fetch was cancelled.
pub async fn fetch_search_page(
    api: &dyn ManifestApi,
    query: String,
    token: RequestToken,
    page: PageRequest,
    cancel: &CancellationToken,
) -> Option<Event> {
    let result: Result<SearchResultPage, RequestError> =
        cancellable(cancel, api.search_page(&query, &page)).await;
    let change = match result {
        Err(RequestError::Cancelled) => {
            folio_debug!("search {:?} cancelled", query);
            return None;
        }
        other => StatusChange::from(other),
    };
    Some(Event::Search {
        query,
        token,
        page: page.kind(),
        change,
    })
}

/// Suggestions are decoration: failures are logged and produce no event.
pub async fn fetch_suggestions(api: &dyn ManifestApi, query: String) -> Option<Event> {
    match api.suggestions(&query).await {
        Ok(suggestions) => Some(Event::Suggestions { query, suggestions }),
        Err(err) => {
            folio_warn!("suggestions for {:?} failed: {}", query, err);
            None
        }
    }
}
