//! Request coordinators: decide from the current state whether a request is
//! needed, dispatch the `Pending` transition, and hand the IO to the engine
//! as effects.
use folio_logging::{folio_debug, folio_info};

use crate::resource::{ResourceStatus, StatusChange};
use crate::search::{PageRequest, SearchPage};
use crate::upload::validate_source_url;
use crate::{AppState, Effect, Event, HighlightKey, LocalManifest, ManifestChange, ManifestId, RequestError};

/// Starts loading a manifest unless it is in flight or already fully loaded.
/// A known `remote_url` skips the local lookup.
pub(crate) fn request_manifest(state: &mut AppState, id: ManifestId) -> Vec<Effect> {
    let known_remote_url = match state.manifests.get(&id) {
        Some(res) if res.is_pending() => {
            folio_debug!("manifest {} already in flight", id);
            return Vec::new();
        }
        Some(res) => match res.value() {
            Some(record) if record.remote_loaded => {
                folio_debug!("manifest {} already loaded", id);
                return Vec::new();
            }
            Some(record) => record.remote_url.clone(),
            None => None,
        },
        None => None,
    };

    let token = state.issue_token();
    state.dispatch(Event::Manifest {
        id: id.clone(),
        token,
        change: ManifestChange::Pending,
    });
    match known_remote_url {
        Some(remote_url) => vec![Effect::FetchRemoteManifest {
            id,
            remote_url,
            token,
        }],
        None => vec![Effect::FetchManifest { id, token }],
    }
}

pub(crate) fn request_recent(state: &mut AppState) -> Vec<Effect> {
    if state.recent.status() == ResourceStatus::Pending {
        return Vec::new();
    }
    let token = state.issue_token();
    state.dispatch(Event::RecentManifests {
        token,
        change: StatusChange::Pending,
    });
    vec![Effect::FetchRecentManifests { token }]
}

/// Validates the source URL locally, then starts the import job.
pub(crate) fn submit_upload(state: &mut AppState, source_url: String) -> Vec<Effect> {
    let source_url = source_url.trim().to_string();
    if let Err(message) = validate_source_url(&source_url) {
        folio_info!("upload of {:?} refused: {}", source_url, message);
        state.dispatch(Event::UploadValidationFailed {
            source_url,
            message,
        });
        return Vec::new();
    }
    if state.uploads.status(&source_url) == ResourceStatus::Pending {
        folio_debug!("upload of {} already in progress", source_url);
        return Vec::new();
    }

    let token = state.issue_token();
    state.dispatch(Event::Upload {
        source_url: source_url.clone(),
        token,
        change: StatusChange::Pending,
    });
    vec![Effect::SubmitUpload { source_url, token }]
}

pub(crate) fn cancel_upload(state: &mut AppState, source_url: String) -> Vec<Effect> {
    let source_url = source_url.trim().to_string();
    let Some(token) = state.uploads.slot(&source_url).and_then(|slot| slot.token()) else {
        return Vec::new();
    };
    state.dispatch(Event::Upload {
        source_url: source_url.clone(),
        token,
        change: StatusChange::Error(RequestError::Cancelled),
    });
    vec![Effect::CancelUpload { source_url }]
}

/// Runs a settled search query. Blank queries clear the search.
pub(crate) fn request_search(state: &mut AppState, query: String, suggestions: bool) -> Vec<Effect> {
    if query.trim().is_empty() {
        return clear_search(state);
    }
    if state.search.serves(&query) {
        folio_debug!("search {:?} already served", query);
        return Vec::new();
    }

    let token = state.issue_token();
    state.dispatch(Event::Search {
        query: query.clone(),
        token,
        page: SearchPage::First,
        change: StatusChange::Pending,
    });
    let mut effects = vec![Effect::FetchSearchPage {
        query: query.clone(),
        token,
        page: PageRequest::First,
    }];
    if suggestions {
        effects.push(Effect::FetchSuggestions { query });
    }
    effects
}

/// "Load more": only for the current query, after a successful page that
/// advertises a next page.
pub(crate) fn load_next_page(state: &mut AppState, query: String) -> Vec<Effect> {
    if state.search.current_query() != Some(query.as_str())
        || state.search.status() != ResourceStatus::Success
    {
        return Vec::new();
    }
    let Some(url) = state.search.next_page().map(ToOwned::to_owned) else {
        return Vec::new();
    };

    let token = state.issue_token();
    state.dispatch(Event::Search {
        query: query.clone(),
        token,
        page: SearchPage::Next,
        change: StatusChange::Pending,
    });
    vec![Effect::FetchSearchPage {
        query,
        token,
        page: PageRequest::Next { url },
    }]
}

pub(crate) fn clear_search(state: &mut AppState) -> Vec<Effect> {
    if !state.search.is_idle() {
        state.dispatch(Event::SearchCleared);
    }
    // A debounced query may still be scheduled even when nothing is in flight.
    vec![Effect::CancelSearch]
}

pub(crate) fn request_highlights(state: &mut AppState, key: HighlightKey) -> Vec<Effect> {
    if matches!(
        state.highlights.status(&key),
        ResourceStatus::Pending | ResourceStatus::Success
    ) {
        return Vec::new();
    }
    let token = state.issue_token();
    state.dispatch(Event::Highlights {
        key: key.clone(),
        token,
        change: StatusChange::Pending,
    });
    vec![Effect::FetchHighlights { key, token }]
}

pub(crate) fn request_stats(state: &mut AppState) -> Vec<Effect> {
    if matches!(
        state.stats.status(),
        ResourceStatus::Pending | ResourceStatus::Success
    ) {
        return Vec::new();
    }
    let token = state.issue_token();
    state.dispatch(Event::Stats {
        token,
        change: StatusChange::Pending,
    });
    vec![Effect::FetchStats { token }]
}

/// Effects that follow from an accepted completion event.
pub(crate) fn follow_up(state: &mut AppState, event: &Event) -> Vec<Effect> {
    match event {
        Event::Manifest {
            id,
            token,
            change: ManifestChange::LocalLoaded(local),
        } => vec![Effect::FetchRemoteManifest {
            id: id.clone(),
            remote_url: local.remote_url.clone(),
            token: *token,
        }],
        Event::RecentManifests {
            change: StatusChange::Success(listing),
            ..
        } => load_listed_manifests(state, listing),
        _ => Vec::new(),
    }
}

/// Seeds the manifest cache from the recent listing and loads the remote
/// documents that are not already loaded or in flight.
fn load_listed_manifests(state: &mut AppState, listing: &[LocalManifest]) -> Vec<Effect> {
    let mut effects = Vec::new();
    for local in listing {
        let skip = state.manifests.get(&local.id).is_some_and(|res| {
            res.is_pending() || res.value().is_some_and(|record| record.remote_loaded)
        });
        if skip {
            continue;
        }
        let token = state.issue_token();
        state.dispatch(Event::Manifest {
            id: local.id.clone(),
            token,
            change: ManifestChange::Pending,
        });
        state.dispatch(Event::Manifest {
            id: local.id.clone(),
            token,
            change: ManifestChange::LocalLoaded(local.clone()),
        });
        effects.push(Effect::FetchRemoteManifest {
            id: local.id.clone(),
            remote_url: local.remote_url.clone(),
            token,
        });
    }
    effects
}
