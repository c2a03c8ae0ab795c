use folio_logging::folio_debug;

use crate::coordinator;
use crate::reduce::accepts;
use crate::{AppState, Effect, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    state.clear_dispatched();
    let effects = match msg {
        Msg::ManifestRequested { id } => coordinator::request_manifest(&mut state, id),
        Msg::RecentManifestsRequested => coordinator::request_recent(&mut state),
        Msg::UploadSubmitted { source_url } => coordinator::submit_upload(&mut state, source_url),
        Msg::UploadCancelled { source_url } => coordinator::cancel_upload(&mut state, source_url),
        Msg::SearchInputChanged { query, suggestions } => {
            vec![Effect::ScheduleSearch { query, suggestions }]
        }
        Msg::SearchRequested { query, suggestions } => {
            coordinator::request_search(&mut state, query, suggestions)
        }
        Msg::NextSearchPageRequested { query } => coordinator::load_next_page(&mut state, query),
        Msg::SearchCleared => coordinator::clear_search(&mut state),
        Msg::HighlightsRequested { key } => coordinator::request_highlights(&mut state, key),
        Msg::StatsRequested => coordinator::request_stats(&mut state),
        Msg::Event(event) => {
            if accepts(&state, &event) {
                state.dispatch(event.clone());
                coordinator::follow_up(&mut state, &event)
            } else {
                folio_debug!("dropping stale {} event", event.label());
                Vec::new()
            }
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}
