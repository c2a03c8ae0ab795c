use serde::{Deserialize, Serialize};
use serde_json::Value;

pub type ManifestId = String;

/// The server's local record for a manifest, as returned by
/// `GET /manifests/{id}/` and the recent-manifests listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalManifest {
    pub id: ManifestId,
    pub remote_url: String,
}

/// Cached view of one manifest, filled in two phases: the local record
/// supplies `remote_url`, then the remote IIIF document fills `document`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManifestRecord {
    pub id: ManifestId,
    pub remote_url: Option<String>,
    pub document: Option<Value>,
    pub remote_loaded: bool,
}

impl ManifestRecord {
    pub fn new(id: impl Into<ManifestId>) -> Self {
        Self {
            id: id.into(),
            remote_url: None,
            document: None,
            remote_loaded: false,
        }
    }

    pub(crate) fn with_remote_url(mut self, remote_url: impl Into<String>) -> Self {
        self.remote_url = Some(remote_url.into());
        self
    }

    pub(crate) fn with_document(mut self, document: Value) -> Self {
        self.document = Some(document);
        self.remote_loaded = true;
        self
    }
}

/// Progress of a manifest request.
#[derive(Debug, Clone, PartialEq)]
pub enum ManifestChange {
    Pending,
    LocalLoaded(LocalManifest),
    RemoteLoaded(Value),
    Failed(crate::RequestError),
}

/// Key of an OMR highlight lookup. `page_index` is 0-based.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct HighlightKey {
    pub manifest_id: ManifestId,
    pub page_index: u32,
    pub pitch_query: String,
}
