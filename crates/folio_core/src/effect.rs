use crate::cache::RequestToken;
use crate::search::PageRequest;
use crate::{HighlightKey, ManifestId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FetchManifest {
        id: ManifestId,
        token: RequestToken,
    },
    FetchRemoteManifest {
        id: ManifestId,
        remote_url: String,
        token: RequestToken,
    },
    FetchRecentManifests {
        token: RequestToken,
    },
    SubmitUpload {
        source_url: String,
        token: RequestToken,
    },
    CancelUpload {
        source_url: String,
    },
    /// Replace any scheduled search with this query after the debounce delay.
    ScheduleSearch {
        query: String,
        suggestions: bool,
    },
    /// Fetch a search page, cancelling whatever search is still in flight.
    FetchSearchPage {
        query: String,
        token: RequestToken,
        page: PageRequest,
    },
    CancelSearch,
    FetchSuggestions {
        query: String,
    },
    FetchHighlights {
        key: HighlightKey,
        token: RequestToken,
    },
    FetchStats {
        token: RequestToken,
    },
}
