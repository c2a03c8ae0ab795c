use serde_json::Value;

use folio_logging::folio_trace;

use crate::cache::{RequestToken, ResourceCache, Slot};
use crate::reduce::reduce;
use crate::search::SearchState;
use crate::view_model::AppViewModel;
use crate::{Event, HighlightKey, ManifestId, ManifestRecord, RequestError, UploadedManifest};

pub type ManifestCache = ResourceCache<ManifestId, ManifestRecord, RequestError>;
pub type UploadCache = ResourceCache<String, UploadedManifest, RequestError>;
pub type HighlightCache = ResourceCache<HighlightKey, Value, RequestError>;

/// The whole read model. Only [`crate::update`] changes it.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub(crate) manifests: ManifestCache,
    pub(crate) recent: Slot<Vec<ManifestId>, RequestError>,
    pub(crate) uploads: UploadCache,
    pub(crate) search: SearchState,
    pub(crate) highlights: HighlightCache,
    pub(crate) stats: Slot<Value, RequestError>,
    last_token: RequestToken,
    /// Events dispatched by the latest `update` only.
    dispatched: Vec<Event>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel::from_state(self, self.dirty)
    }

    pub fn manifests(&self) -> &ManifestCache {
        &self.manifests
    }

    pub fn manifest(&self, id: &str) -> Option<&ManifestRecord> {
        self.manifests.get(&id.to_string()).and_then(|res| res.value())
    }

    pub fn recent(&self) -> &Slot<Vec<ManifestId>, RequestError> {
        &self.recent
    }

    pub fn uploads(&self) -> &UploadCache {
        &self.uploads
    }

    pub fn search(&self) -> &SearchState {
        &self.search
    }

    pub fn highlights(&self) -> &HighlightCache {
        &self.highlights
    }

    pub fn stats(&self) -> &Slot<Value, RequestError> {
        &self.stats
    }

    /// Returns and clears the dirty flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Drains the events dispatched by the latest `update`, oldest first.
    pub fn take_dispatched(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.dispatched)
    }

    pub(crate) fn clear_dispatched(&mut self) {
        self.dispatched.clear();
    }

    pub(crate) fn issue_token(&mut self) -> RequestToken {
        self.last_token += 1;
        self.last_token
    }

    /// Folds `event` into the state through the reducers and records it.
    pub(crate) fn dispatch(&mut self, event: Event) {
        folio_trace!("dispatch {}", event.label());
        let state = std::mem::take(self);
        *self = reduce(state, &event);
        self.dispatched.push(event);
        self.dirty = true;
    }
}

// The dispatch journal is a per-update side channel, not part of the model.
impl PartialEq for AppState {
    fn eq(&self, other: &Self) -> bool {
        self.manifests == other.manifests
            && self.recent == other.recent
            && self.uploads == other.uploads
            && self.search == other.search
            && self.highlights == other.highlights
            && self.stats == other.stats
            && self.last_token == other.last_token
            && self.dirty == other.dirty
    }
}
