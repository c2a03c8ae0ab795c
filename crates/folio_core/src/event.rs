use serde_json::Value;

use crate::cache::RequestToken;
use crate::resource::StatusChange;
use crate::search::{SearchPage, SearchResultPage};
use crate::{HighlightKey, LocalManifest, ManifestChange, ManifestId, RequestError, UploadedManifest};

/// Status-change events folded into the read model by [`crate::reduce`].
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Manifest {
        id: ManifestId,
        token: RequestToken,
        change: ManifestChange,
    },
    RecentManifests {
        token: RequestToken,
        change: StatusChange<Vec<LocalManifest>, RequestError>,
    },
    Upload {
        source_url: String,
        token: RequestToken,
        change: StatusChange<UploadedManifest, RequestError>,
    },
    /// Client-side validation refused the source URL; nothing was sent.
    UploadValidationFailed { source_url: String, message: String },
    Search {
        query: String,
        token: RequestToken,
        page: SearchPage,
        change: StatusChange<SearchResultPage, RequestError>,
    },
    Suggestions {
        query: String,
        suggestions: Vec<String>,
    },
    SearchCleared,
    Highlights {
        key: HighlightKey,
        token: RequestToken,
        change: StatusChange<Value, RequestError>,
    },
    Stats {
        token: RequestToken,
        change: StatusChange<Value, RequestError>,
    },
}

impl Event {
    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Event::Manifest { .. } => "manifest",
            Event::RecentManifests { .. } => "recent_manifests",
            Event::Upload { .. } => "upload",
            Event::UploadValidationFailed { .. } => "upload_validation_failed",
            Event::Search { .. } => "search",
            Event::Suggestions { .. } => "suggestions",
            Event::SearchCleared => "search_cleared",
            Event::Highlights { .. } => "highlights",
            Event::Stats { .. } => "stats",
        }
    }
}
