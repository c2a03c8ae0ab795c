//! Folio core: pure request/caching state machine and view-model helpers.
mod cache;
mod coordinator;
mod effect;
mod error;
mod event;
mod manifest;
mod msg;
mod reduce;
mod resource;
mod search;
mod state;
mod update;
mod upload;
mod view_model;

pub use cache::{RequestToken, ResourceCache, Slot};
pub use effect::Effect;
pub use error::RequestError;
pub use event::Event;
pub use manifest::{HighlightKey, LocalManifest, ManifestChange, ManifestId, ManifestRecord};
pub use msg::Msg;
pub use reduce::{accepts, reduce};
pub use resource::{Resource, ResourceStatus, StatusChange};
pub use search::{append_page, PageRequest, SearchPage, SearchResource, SearchResultPage, SearchState};
pub use state::{AppState, HighlightCache, ManifestCache, UploadCache};
pub use update::update;
pub use upload::{validate_source_url, UploadedManifest};
pub use view_model::{
    AppViewModel, HighlightRowView, ManifestRowView, RecentView, SearchView, UploadRowView,
};
