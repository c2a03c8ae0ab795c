#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use folio_core::{
    update, AppState, Event, HighlightKey, LocalManifest, Msg, PageRequest, RequestError,
    SearchResultPage,
};
use folio_engine::{EffectRunner, EngineSettings, ManifestApi, MsgSink, PollReply};
use serde_json::{json, Value};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

/// In-memory [`ManifestApi`] answering from scripted responses and
/// recording every call as `"<method> <argument>"`.
#[derive(Default)]
pub struct ScriptedApi {
    manifests: Mutex<HashMap<String, LocalManifest>>,
    recent: Mutex<Vec<LocalManifest>>,
    remotes: Mutex<HashMap<String, Value>>,
    status_url: Mutex<Option<String>>,
    polls: Mutex<VecDeque<PollReply>>,
    uploaded: Mutex<HashMap<String, Value>>,
    searches: Mutex<HashMap<String, (Duration, SearchResultPage)>>,
    suggestions: Mutex<HashMap<String, Vec<String>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_manifest(self, id: &str, remote_url: &str) -> Self {
        self.manifests.lock().unwrap().insert(
            id.to_string(),
            LocalManifest {
                id: id.to_string(),
                remote_url: remote_url.to_string(),
            },
        );
        self
    }

    pub fn with_recent(self, listing: &[(&str, &str)]) -> Self {
        *self.recent.lock().unwrap() = listing
            .iter()
            .map(|(id, remote_url)| LocalManifest {
                id: id.to_string(),
                remote_url: remote_url.to_string(),
            })
            .collect();
        self
    }

    pub fn with_remote(self, remote_url: &str, document: Value) -> Self {
        self.remotes
            .lock()
            .unwrap()
            .insert(remote_url.to_string(), document);
        self
    }

    pub fn with_status_url(self, status_url: &str) -> Self {
        *self.status_url.lock().unwrap() = Some(status_url.to_string());
        self
    }

    /// Queues one poll answer. Once the queue is empty every poll reports
    /// the job as still processing.
    pub fn with_poll(self, status: u16, body: Option<Value>) -> Self {
        self.polls.lock().unwrap().push_back(PollReply {
            status,
            status_text: String::new(),
            url: "http://folio.test/status/1/".to_string(),
            body,
        });
        self
    }

    pub fn with_uploaded(self, location: &str, resource: Value) -> Self {
        self.uploaded
            .lock()
            .unwrap()
            .insert(location.to_string(), resource);
        self
    }

    /// Answers a first-page search for `key` (the query) or a next-page
    /// fetch for `key` (the next URL) after `delay`.
    pub fn with_search(self, key: &str, delay: Duration, page: SearchResultPage) -> Self {
        self.searches
            .lock()
            .unwrap()
            .insert(key.to_string(), (delay, page));
        self
    }

    pub fn with_suggestions(self, query: &str, suggestions: &[&str]) -> Self {
        self.suggestions.lock().unwrap().insert(
            query.to_string(),
            suggestions.iter().map(|s| s.to_string()).collect(),
        );
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, method: &str) -> usize {
        let prefix = format!("{method} ");
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.starts_with(&prefix))
            .count()
    }

    fn record(&self, method: &str, argument: &str) {
        self.calls
            .lock()
            .unwrap()
            .push(format!("{method} {argument}"));
    }
}

fn not_found() -> RequestError {
    RequestError::transport(404, "Not Found")
}

#[async_trait::async_trait]
impl ManifestApi for ScriptedApi {
    async fn get_manifest(&self, id: &str) -> Result<LocalManifest, RequestError> {
        self.record("get_manifest", id);
        self.manifests
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(not_found)
    }

    async fn get_recent(&self) -> Result<Vec<LocalManifest>, RequestError> {
        self.record("get_recent", "");
        Ok(self.recent.lock().unwrap().clone())
    }

    async fn load_remote(&self, remote_url: &str) -> Result<Value, RequestError> {
        self.record("load_remote", remote_url);
        self.remotes
            .lock()
            .unwrap()
            .get(remote_url)
            .cloned()
            .ok_or_else(not_found)
    }

    async fn submit_upload(&self, remote_url: &str) -> Result<String, RequestError> {
        self.record("submit_upload", remote_url);
        self.status_url.lock().unwrap().clone().ok_or_else(not_found)
    }

    async fn poll_upload(&self, status_url: &str) -> Result<PollReply, RequestError> {
        self.record("poll_upload", status_url);
        let next = self.polls.lock().unwrap().pop_front();
        Ok(next.unwrap_or_else(|| PollReply {
            status: 200,
            status_text: "OK".to_string(),
            url: status_url.to_string(),
            body: Some(json!({"status": 1})),
        }))
    }

    async fn fetch_uploaded(&self, location: &str) -> Result<Value, RequestError> {
        self.record("fetch_uploaded", location);
        self.uploaded
            .lock()
            .unwrap()
            .get(location)
            .cloned()
            .ok_or_else(not_found)
    }

    async fn search_page(
        &self,
        query: &str,
        page: &PageRequest,
    ) -> Result<SearchResultPage, RequestError> {
        let key = match page {
            PageRequest::First => query.to_string(),
            PageRequest::Next { url } => url.clone(),
        };
        self.record("search_page", &key);
        let scripted = self.searches.lock().unwrap().get(&key).cloned();
        let (delay, page) = scripted.ok_or_else(not_found)?;
        tokio::time::sleep(delay).await;
        Ok(page)
    }

    async fn suggestions(&self, query: &str) -> Result<Vec<String>, RequestError> {
        self.record("suggestions", query);
        Ok(self
            .suggestions
            .lock()
            .unwrap()
            .get(query)
            .cloned()
            .unwrap_or_default())
    }

    async fn stats(&self) -> Result<Value, RequestError> {
        self.record("stats", "");
        Ok(json!({"manifests": 3, "pages": 120}))
    }

    async fn highlight_locations(&self, key: &HighlightKey) -> Result<Value, RequestError> {
        self.record("highlight_locations", &key.manifest_id);
        Ok(json!({"page": key.page_index, "boxes": []}))
    }
}

struct TestSink {
    tx: UnboundedSender<Msg>,
}

impl MsgSink for TestSink {
    fn emit(&self, msg: Msg) {
        let _ = self.tx.send(msg);
    }
}

/// Drives `folio_core::update` and an [`EffectRunner`] on the test runtime,
/// keeping every dispatched event for inspection.
pub struct Harness {
    pub state: AppState,
    pub events: Vec<Event>,
    runner: EffectRunner,
    rx: UnboundedReceiver<Msg>,
}

impl Harness {
    pub fn new(api: Arc<ScriptedApi>) -> Self {
        Self::with_settings(api, EngineSettings::default())
    }

    pub fn with_settings(api: Arc<ScriptedApi>, settings: EngineSettings) -> Self {
        folio_logging::initialize_for_tests();
        let (tx, rx) = unbounded_channel();
        let runner = EffectRunner::new(
            api,
            Arc::new(TestSink { tx }),
            tokio::runtime::Handle::current(),
            &settings,
        );
        Self {
            state: AppState::new(),
            events: Vec::new(),
            runner,
            rx,
        }
    }

    pub fn send(&mut self, msg: Msg) {
        let (mut state, effects) = update(std::mem::take(&mut self.state), msg);
        self.events.extend(state.take_dispatched());
        self.state = state;
        for effect in effects {
            self.runner.run(effect);
        }
    }

    /// Feeds engine messages back into `update` until nothing arrives for an hour
    /// of (paused) time.
    pub async fn settle(&mut self) {
        while let Ok(Some(msg)) =
            tokio::time::timeout(Duration::from_secs(3600), self.rx.recv()).await
        {
            self.send(msg);
        }
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}
