use serde::Serialize;

use crate::resource::ResourceStatus;
use crate::{AppState, HighlightKey, ManifestId, Resource};

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AppViewModel {
    pub manifests: Vec<ManifestRowView>,
    pub recent: RecentView,
    pub uploads: Vec<UploadRowView>,
    pub search: SearchView,
    pub highlights: Vec<HighlightRowView>,
    pub stats_status: ResourceStatus,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManifestRowView {
    pub id: ManifestId,
    pub status: ResourceStatus,
    pub remote_url: Option<String>,
    pub remote_loaded: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RecentView {
    pub status: ResourceStatus,
    pub ids: Vec<ManifestId>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadRowView {
    pub source_url: String,
    pub status: ResourceStatus,
    pub location: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SearchView {
    pub query: Option<String>,
    pub status: ResourceStatus,
    pub num_found: u64,
    pub result_count: usize,
    pub has_next_page: bool,
    /// Set when the results shown belong to an earlier query.
    pub showing_stale_for: Option<String>,
    pub suggestions: Vec<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HighlightRowView {
    pub key: HighlightKey,
    pub status: ResourceStatus,
}

impl AppViewModel {
    pub(crate) fn from_state(state: &AppState, dirty: bool) -> Self {
        let manifests = state
            .manifests()
            .iter()
            .map(|(id, res)| {
                let record = res.value();
                ManifestRowView {
                    id: id.clone(),
                    status: res.status(),
                    remote_url: record.and_then(|r| r.remote_url.clone()),
                    remote_loaded: record.is_some_and(|r| r.remote_loaded),
                    error: error_text(res),
                }
            })
            .collect();

        let recent = state.recent().resource();
        let recent = RecentView {
            status: recent.status(),
            ids: recent.value().cloned().unwrap_or_default(),
            error: error_text(recent),
        };

        let uploads = state
            .uploads()
            .iter()
            .map(|(source_url, res)| UploadRowView {
                source_url: source_url.clone(),
                status: res.status(),
                location: res.value().map(|uploaded| uploaded.url.clone()),
                error: error_text(res),
            })
            .collect();

        let search = state.search();
        let shown = match search.current() {
            Resource::Pending(None) if search.stale().is_success() => search.stale().value(),
            current => current.value(),
        };
        let showing_stale_for = match search.current() {
            Resource::Pending(None) if search.stale().is_success() => {
                search.stale_query().map(ToOwned::to_owned)
            }
            _ => None,
        };
        let search = SearchView {
            query: search.current_query().map(ToOwned::to_owned),
            status: search.status(),
            num_found: shown.map_or(0, |page| page.num_found),
            result_count: shown.map_or(0, |page| page.results.len()),
            has_next_page: search.next_page().is_some(),
            showing_stale_for,
            suggestions: search.suggestions().to_vec(),
            error: error_text(search.current()),
        };

        let highlights = state
            .highlights()
            .iter()
            .map(|(key, res)| HighlightRowView {
                key: key.clone(),
                status: res.status(),
            })
            .collect();

        Self {
            manifests,
            recent,
            uploads,
            search,
            highlights,
            stats_status: state.stats().status(),
            dirty,
        }
    }
}

fn error_text<V>(res: &Resource<V, crate::RequestError>) -> Option<String> {
    res.error().map(ToString::to_string)
}
