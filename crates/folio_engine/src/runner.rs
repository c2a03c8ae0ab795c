use std::collections::HashMap;
use std::future::Future;
use std::sync::{mpsc, Arc, Mutex, PoisonError};

use folio_core::{Effect, Event, Msg, RequestError, RequestToken, StatusChange};
use folio_logging::{folio_debug, folio_info};
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

use crate::api::ManifestApi;
use crate::debounce::Debouncer;
use crate::engine::EngineSettings;
use crate::search::{fetch_search_page, fetch_suggestions, SearchController};
use crate::upload::{run_upload, PollSettings};
use crate::{lookup, manifest};

/// Where the engine delivers messages for `folio_core::update`.
pub trait MsgSink: Send + Sync {
    fn emit(&self, msg: Msg);
}

pub struct ChannelMsgSink {
    tx: mpsc::Sender<Msg>,
}

impl ChannelMsgSink {
    pub fn new(tx: mpsc::Sender<Msg>) -> Self {
        Self { tx }
    }
}

impl MsgSink for ChannelMsgSink {
    fn emit(&self, msg: Msg) {
        let _ = self.tx.send(msg);
    }
}

type UploadJobs = Arc<Mutex<HashMap<String, (RequestToken, CancellationToken)>>>;

/// Executes effects on a tokio runtime and reports back through a [`MsgSink`].
pub struct EffectRunner {
    api: Arc<dyn ManifestApi>,
    sink: Arc<dyn MsgSink>,
    runtime: Handle,
    poll: PollSettings,
    uploads: UploadJobs,
    search: SearchController,
}

impl EffectRunner {
    pub fn new(
        api: Arc<dyn ManifestApi>,
        sink: Arc<dyn MsgSink>,
        runtime: Handle,
        settings: &EngineSettings,
    ) -> Self {
        let debouncer = Debouncer::new(settings.debounce, runtime.clone());
        Self {
            api,
            sink,
            runtime,
            poll: settings.poll.clone(),
            uploads: Arc::new(Mutex::new(HashMap::new())),
            search: SearchController::new(debouncer),
        }
    }

    pub fn run(&self, effect: Effect) {
        folio_debug!("running {:?}", effect);
        match effect {
            Effect::FetchManifest { id, token } => {
                self.spawn_event(|api| async move {
                    Some(manifest::fetch_local(api.as_ref(), id, token).await)
                });
            }
            Effect::FetchRemoteManifest {
                id,
                remote_url,
                token,
            } => {
                self.spawn_event(|api| async move {
                    Some(manifest::fetch_remote(api.as_ref(), id, remote_url, token).await)
                });
            }
            Effect::FetchRecentManifests { token } => {
                self.spawn_event(|api| async move {
                    Some(manifest::fetch_recent(api.as_ref(), token).await)
                });
            }
            Effect::SubmitUpload { source_url, token } => self.submit_upload(source_url, token),
            Effect::CancelUpload { source_url } => {
                let job = self
                    .uploads
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .remove(&source_url);
                if let Some((_, cancel)) = job {
                    folio_info!("cancelling upload of {}", source_url);
                    cancel.cancel();
                }
            }
            Effect::ScheduleSearch { query, suggestions } => {
                self.search.input_changed(self.sink.clone(), query, suggestions);
            }
            Effect::FetchSearchPage { query, token, page } => {
                let cancel = self.search.begin_fetch();
                self.spawn_event(|api| async move {
                    fetch_search_page(api.as_ref(), query, token, page, &cancel).await
                });
            }
            Effect::CancelSearch => self.search.cancel(),
            Effect::FetchSuggestions { query } => {
                self.spawn_event(|api| async move { fetch_suggestions(api.as_ref(), query).await });
            }
            Effect::FetchHighlights { key, token } => {
                self.spawn_event(|api| async move {
                    Some(lookup::fetch_highlights(api.as_ref(), key, token).await)
                });
            }
            Effect::FetchStats { token } => {
                self.spawn_event(|api| async move {
                    Some(lookup::fetch_stats(api.as_ref(), token).await)
                });
            }
        }
    }

    fn submit_upload(&self, source_url: String, token: RequestToken) {
        let cancel = CancellationToken::new();
        let previous = self
            .uploads
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(source_url.clone(), (token, cancel.clone()));
        if let Some((_, previous)) = previous {
            previous.cancel();
        }

        let poll = self.poll.clone();
        let uploads = Arc::clone(&self.uploads);
        self.spawn_event(|api| async move {
            let result = run_upload(api.as_ref(), &source_url, &poll, &cancel).await;
            {
                let mut jobs = uploads.lock().unwrap_or_else(PoisonError::into_inner);
                if jobs.get(&source_url).is_some_and(|(active, _)| *active == token) {
                    jobs.remove(&source_url);
                }
            }
            if matches!(result, Err(RequestError::Cancelled)) {
                folio_debug!("upload of {} stopped after cancellation", source_url);
                return None;
            }
            Some(Event::Upload {
                source_url,
                token,
                change: StatusChange::from(result),
            })
        });
    }

    fn spawn_event<F, Fut>(&self, task: F)
    where
        F: FnOnce(Arc<dyn ManifestApi>) -> Fut,
        Fut: Future<Output = Option<Event>> + Send + 'static,
    {
        let work = task(Arc::clone(&self.api));
        let sink = Arc::clone(&self.sink);
        self.runtime.spawn(async move {
            if let Some(event) = work.await {
                sink.emit(Msg::Event(event));
            }
        });
    }
}
