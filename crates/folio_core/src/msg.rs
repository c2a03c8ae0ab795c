use crate::{Event, HighlightKey, ManifestId};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Show the manifest with this local id.
    ManifestRequested { id: ManifestId },
    /// Load the recently added manifests listing.
    RecentManifestsRequested,
    /// User submitted a remote manifest URL for import.
    UploadSubmitted { source_url: String },
    /// User abandoned an import that is still being polled.
    UploadCancelled { source_url: String },
    /// Search box edited (goes through the debouncer).
    SearchInputChanged { query: String, suggestions: bool },
    /// Settled search query, ready to be fetched.
    SearchRequested { query: String, suggestions: bool },
    /// "Load more" for the current query.
    NextSearchPageRequested { query: String },
    /// User cleared the search box.
    SearchCleared,
    /// OMR highlight lookup for a page of a manifest.
    HighlightsRequested { key: HighlightKey },
    /// Stats shown under the search bar.
    StatsRequested,
    /// A request made progress or finished.
    Event(Event),
    /// Render tick.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}

impl From<Event> for Msg {
    fn from(event: Event) -> Self {
        Msg::Event(event)
    }
}
