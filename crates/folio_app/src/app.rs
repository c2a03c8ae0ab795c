use std::time::{Duration, Instant};

use anyhow::{anyhow, bail, Context, Result};
use folio_core::{update, AppState, HighlightKey, Msg, Resource, ResourceStatus, SearchView};
use folio_engine::EngineHandle;
use folio_logging::{folio_debug, folio_info, folio_warn};
use serde::Serialize;

use crate::cli::Command;
use crate::config::FolioConfig;

/// Pairs the read model with the engine and pumps messages between them.
struct Session {
    state: AppState,
    engine: EngineHandle,
    deadline: Instant,
}

impl Session {
    fn send(&mut self, msg: Msg) {
        let (state, effects) = update(std::mem::take(&mut self.state), msg);
        self.state = state;
        for event in self.state.take_dispatched() {
            folio_debug!("applied {} event", event.label());
        }
        self.engine.run(effects);
    }

    /// Feeds engine replies into `update` until `done` holds for the state.
    fn wait_until(&mut self, done: impl Fn(&AppState) -> bool) -> Result<()> {
        while !done(&self.state) {
            let remaining = self.deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                bail!("gave up waiting for the server");
            }
            let wait = remaining.min(Duration::from_millis(250));
            if let Some(msg) = self.engine.recv_timeout(wait) {
                self.send(msg);
            }
        }
        Ok(())
    }
}

pub fn run(config: &FolioConfig, command: Command) -> Result<()> {
    let engine = EngineHandle::new(config.engine_settings()).context("starting the engine")?;
    let mut session = Session {
        state: AppState::new(),
        engine,
        deadline: Instant::now() + config.wait_timeout(),
    };
    folio_info!("running {:?} against {}", command, config.base_url);

    match command {
        Command::Manifest { id } => show_manifest(&mut session, id),
        Command::Recent => show_recent(&mut session),
        Command::Upload { source_url } => upload(&mut session, source_url),
        Command::Search {
            query,
            pages,
            suggest,
        } => search(&mut session, query, pages, suggest),
        Command::Highlights {
            manifest_id,
            page_index,
            pitch,
        } => show_highlights(
            &mut session,
            HighlightKey {
                manifest_id,
                page_index,
                pitch_query: pitch,
            },
        ),
        Command::Stats => show_stats(&mut session),
    }
}

fn settled(status: ResourceStatus) -> bool {
    matches!(status, ResourceStatus::Success | ResourceStatus::Error)
}

fn show_manifest(session: &mut Session, id: String) -> Result<()> {
    session.send(Msg::ManifestRequested { id: id.clone() });
    session.wait_until(|state| settled(state.manifests().status(&id)))?;

    match session.state.manifests().get(&id) {
        Some(Resource::Success(record)) => print_json(record),
        Some(Resource::Error(err, _)) => Err(anyhow!("manifest {id}: {err}")),
        other => Err(anyhow!("manifest {id} did not settle: {other:?}")),
    }
}

fn show_recent(session: &mut Session) -> Result<()> {
    session.send(Msg::RecentManifestsRequested);
    session.wait_until(|state| {
        settled(state.recent().status())
            && state
                .manifests()
                .iter()
                .all(|(_, res)| !res.is_pending())
    })?;

    let view = session.state.view();
    if let Some(err) = &view.recent.error {
        bail!("recent manifests: {err}");
    }
    for row in view.manifests.iter().filter(|row| row.error.is_some()) {
        folio_warn!("manifest {} could not be loaded", row.id);
    }
    print_json(&view.manifests)
}

fn upload(session: &mut Session, source_url: String) -> Result<()> {
    // Entries are keyed by the trimmed URL, invalid ones included.
    let key = source_url.trim().to_string();
    session.send(Msg::UploadSubmitted { source_url });
    session.wait_until(|state| settled(state.uploads().status(&key)))?;

    match session.state.uploads().get(&key) {
        Some(Resource::Success(uploaded)) => print_json(uploaded),
        Some(Resource::Error(err, _)) => Err(anyhow!("upload of {key}: {err}")),
        other => Err(anyhow!("upload of {key} did not settle: {other:?}")),
    }
}

/// A blank query clears the search instead of fetching, so nothing would settle.
fn checked_query(query: &str) -> Result<&str> {
    if query.trim().is_empty() {
        bail!("search query is empty");
    }
    Ok(query)
}

fn search(session: &mut Session, query: String, pages: u32, suggest: bool) -> Result<()> {
    checked_query(&query)?;
    session.send(Msg::SearchRequested {
        query: query.clone(),
        suggestions: suggest,
    });
    let mut loaded = 0;
    loop {
        session.wait_until(|state| settled(state.search().status()))?;
        loaded += 1;
        let search = session.state.search();
        if search.status() != ResourceStatus::Success
            || loaded >= pages
            || search.next_page().is_none()
        {
            break;
        }
        session.send(Msg::NextSearchPageRequested {
            query: query.clone(),
        });
    }
    if suggest {
        // Suggestions are optional; give them a short grace period.
        let grace = Instant::now() + Duration::from_secs(2);
        session.deadline = session.deadline.min(grace);
        let _ = session.wait_until(|state| !state.search().suggestions().is_empty());
    }

    let view = session.state.view();
    if let Some(err) = &view.search.error {
        bail!("search {query:?}: {err}");
    }
    print_json(&SearchOutput {
        summary: &view.search,
        results: session
            .state
            .search()
            .current()
            .value()
            .map(|page| page.results.as_slice())
            .unwrap_or_default(),
    })
}

#[derive(Serialize)]
struct SearchOutput<'a> {
    summary: &'a SearchView,
    results: &'a [serde_json::Value],
}

fn show_highlights(session: &mut Session, key: HighlightKey) -> Result<()> {
    session.send(Msg::HighlightsRequested { key: key.clone() });
    session.wait_until(|state| settled(state.highlights().status(&key)))?;

    match session.state.highlights().get(&key) {
        Some(Resource::Success(locations)) => print_json(locations),
        Some(Resource::Error(err, _)) => Err(anyhow!("highlights: {err}")),
        other => Err(anyhow!("highlights did not settle: {other:?}")),
    }
}

fn show_stats(session: &mut Session) -> Result<()> {
    session.send(Msg::StatsRequested);
    session.wait_until(|state| settled(state.stats().status()))?;

    match session.state.stats().resource() {
        Resource::Success(stats) => print_json(stats),
        Resource::Error(err, _) => Err(anyhow!("stats: {err}")),
        other => Err(anyhow!("stats did not settle: {other:?}")),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("serializing output")?;
    println!("{text}");
    Ok(())
}
