//! Pure reducers: `(state, event) -> state`.
//!
//! Completion events are applied only while their request token is still the
//! active one for the key, so responses for superseded or cancelled requests
//! never reach the read model.
use std::mem::take;

use crate::cache::{RequestToken, Slot};
use crate::resource::{ResourceStatus, StatusChange};
use crate::search::{append_page, SearchPage, SearchState};
use crate::state::{ManifestCache, UploadCache};
use crate::{
    AppState, Event, ManifestChange, ManifestRecord, RequestError, Resource, UploadedManifest,
};

/// Single dispatch table over every event kind.
pub fn reduce(mut state: AppState, event: &Event) -> AppState {
    match event {
        Event::Manifest { id, token, change } => {
            state.manifests = reduce_manifest(take(&mut state.manifests), id, *token, change);
        }
        Event::RecentManifests { token, change } => {
            let change = match change {
                StatusChange::Pending => StatusChange::Pending,
                StatusChange::Success(list) => {
                    StatusChange::Success(list.iter().map(|local| local.id.clone()).collect())
                }
                StatusChange::Error(err) => StatusChange::Error(err.clone()),
            };
            state.recent = reduce_slot(take(&mut state.recent), *token, change);
        }
        Event::Upload {
            source_url,
            token,
            change,
        } => {
            let applies = matches!(change, StatusChange::Pending)
                || state.uploads.is_current(source_url, *token);
            if let (true, StatusChange::Success(uploaded)) = (applies, change) {
                state.manifests = register_uploaded(take(&mut state.manifests), uploaded);
            }
            state.uploads =
                reduce_upload(take(&mut state.uploads), source_url, *token, change.clone());
        }
        Event::UploadValidationFailed {
            source_url,
            message,
        } => {
            let error = RequestError::ClientValidation {
                message: message.clone(),
            };
            state.uploads = take(&mut state.uploads)
                .update(source_url.clone(), |slot| slot.force(StatusChange::Error(error)));
        }
        Event::Search {
            query,
            token,
            page,
            change,
        } => {
            state.search =
                reduce_search(take(&mut state.search), query, *token, *page, change.clone());
        }
        Event::Suggestions { query, suggestions } => {
            if state.search.current_query.as_deref() == Some(query.as_str()) {
                state.search.suggestions = suggestions.clone();
            }
        }
        Event::SearchCleared => {
            state.search = SearchState::default();
        }
        Event::Highlights { key, token, change } => {
            state.highlights = match change {
                StatusChange::Pending => take(&mut state.highlights).begin(key.clone(), *token),
                other => take(&mut state.highlights).settle(key.clone(), *token, other.clone()),
            };
        }
        Event::Stats { token, change } => {
            state.stats = reduce_slot(take(&mut state.stats), *token, change.clone());
        }
    }
    state
}

/// Whether `event` would be applied to `state` (false for stale completions).
pub fn accepts(state: &AppState, event: &Event) -> bool {
    match event {
        Event::Manifest { id, token, change } => {
            matches!(change, ManifestChange::Pending) || state.manifests.is_current(id, *token)
        }
        Event::RecentManifests { token, change } => {
            !change.is_terminal() || state.recent.is_current(*token)
        }
        Event::Upload {
            source_url,
            token,
            change,
        } => !change.is_terminal() || state.uploads.is_current(source_url, *token),
        Event::Search {
            query,
            token,
            page,
            change,
        } => {
            let is_current_query = state.search.current_query.as_deref() == Some(query.as_str());
            match (page, change) {
                (SearchPage::First, StatusChange::Pending) => true,
                (SearchPage::Next, StatusChange::Pending) => is_current_query,
                _ => is_current_query && state.search.active_token() == Some(*token),
            }
        }
        Event::Suggestions { query, .. } => {
            state.search.current_query.as_deref() == Some(query.as_str())
        }
        Event::Highlights { key, token, change } => {
            !change.is_terminal() || state.highlights.is_current(key, *token)
        }
        Event::Stats { token, change } => !change.is_terminal() || state.stats.is_current(*token),
        Event::UploadValidationFailed { .. } | Event::SearchCleared => true,
    }
}

fn reduce_slot<V, E>(
    slot: Slot<V, E>,
    token: RequestToken,
    change: StatusChange<V, E>,
) -> Slot<V, E> {
    match change {
        StatusChange::Pending => slot.begin(token),
        other => slot.settle(token, other),
    }
}

fn reduce_manifest(
    cache: ManifestCache,
    id: &str,
    token: RequestToken,
    change: &ManifestChange,
) -> ManifestCache {
    let key = id.to_string();
    if !matches!(change, ManifestChange::Pending) && !cache.is_current(&key, token) {
        return cache;
    }
    match change {
        ManifestChange::Pending => cache.begin(key, token),
        // The local record only fills in `remote_url`; the entry stays
        // pending until the remote document arrives.
        ManifestChange::LocalLoaded(local) => cache.update(key, |slot| {
            slot.progress(token, |res| {
                res.map_value(|record| {
                    Some(
                        record
                            .unwrap_or_else(|| ManifestRecord::new(id))
                            .with_remote_url(local.remote_url.clone()),
                    )
                })
            })
        }),
        ManifestChange::RemoteLoaded(document) => cache.update(key, |slot| {
            let record = slot
                .resource()
                .value()
                .cloned()
                .unwrap_or_else(|| ManifestRecord::new(id))
                .with_document(document.clone());
            slot.settle(token, StatusChange::Success(record))
        }),
        ManifestChange::Failed(err) => cache.settle(key, token, StatusChange::Error(err.clone())),
    }
}

fn reduce_upload(
    cache: UploadCache,
    source_url: &str,
    token: RequestToken,
    change: StatusChange<UploadedManifest, RequestError>,
) -> UploadCache {
    match change {
        StatusChange::Pending => cache.begin(source_url.to_string(), token),
        other => cache.settle(source_url.to_string(), token, other),
    }
}

/// Adds an entry for a just-imported manifest unless it is already being
/// loaded or fully loaded.
fn register_uploaded(cache: ManifestCache, uploaded: &UploadedManifest) -> ManifestCache {
    let Some(local) = uploaded.local_manifest() else {
        return cache;
    };
    let busy = match cache.get(&local.id) {
        Some(res) => res.is_pending() || res.value().is_some_and(|record| record.remote_loaded),
        None => false,
    };
    if busy {
        return cache;
    }
    let record = ManifestRecord::new(local.id.clone()).with_remote_url(local.remote_url);
    cache.insert(local.id, Resource::Success(record))
}

fn reduce_search(
    mut search: SearchState,
    query: &str,
    token: RequestToken,
    page: SearchPage,
    change: StatusChange<crate::SearchResultPage, RequestError>,
) -> SearchState {
    let is_current_query = search.current_query.as_deref() == Some(query);
    match (page, change) {
        (SearchPage::First, StatusChange::Pending) => {
            if !is_current_query {
                if search.current.status() == ResourceStatus::Success {
                    search.stale = search.current.resource().clone();
                    search.stale_query = search.current_query.take();
                }
                if search.stale_query.as_deref() == Some(query) {
                    search.stale = Resource::NotRequested;
                    search.stale_query = None;
                }
                search.current = Slot::default();
                search.current_query = Some(query.to_string());
                search.suggestions.clear();
            }
            search.current = take(&mut search.current).begin(token);
        }
        (SearchPage::Next, StatusChange::Pending) => {
            if is_current_query {
                search.current = take(&mut search.current).begin(token);
            }
        }
        (page, change) => {
            if !is_current_query || !search.current.is_current(token) {
                return search;
            }
            let resolved = matches!(change, StatusChange::Success(_));
            let current = take(&mut search.current);
            search.current = match page {
                SearchPage::First => current.settle(token, change),
                SearchPage::Next => current.settle_with(token, change, append_page),
            };
            if resolved {
                search.stale = Resource::NotRequested;
                search.stale_query = None;
            }
        }
    }
    search
}
