use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use folio_core::{Effect, Msg, RequestError};
use folio_logging::folio_debug;

use crate::api::ManifestApi;
use crate::http::{ClientSettings, HttpApi};
use crate::runner::{ChannelMsgSink, EffectRunner, MsgSink};
use crate::upload::PollSettings;

#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub client: ClientSettings,
    pub poll: PollSettings,
    /// Quiet period before search input turns into a request.
    pub debounce: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            client: ClientSettings::default(),
            poll: PollSettings::default(),
            debounce: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to start the async runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error("failed to set up the http client: {0}")]
    Client(#[from] RequestError),
}

enum EngineCommand {
    Run(Effect),
}

/// Runs effects on a background thread that owns the tokio runtime.
/// Dropping the handle stops the thread and every task still in flight.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    msg_rx: mpsc::Receiver<Msg>,
}

impl EngineHandle {
    pub fn new(settings: EngineSettings) -> Result<Self, EngineError> {
        let api = HttpApi::new(&settings.client)?;
        Self::with_api(settings, Arc::new(api))
    }

    pub fn with_api(
        settings: EngineSettings,
        api: Arc<dyn ManifestApi>,
    ) -> Result<Self, EngineError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (msg_tx, msg_rx) = mpsc::channel();
        let sink: Arc<dyn MsgSink> = Arc::new(ChannelMsgSink::new(msg_tx));
        let runner = EffectRunner::new(api, sink, runtime.handle().clone(), &settings);

        thread::spawn(move || {
            while let Ok(EngineCommand::Run(effect)) = cmd_rx.recv() {
                runner.run(effect);
            }
            folio_debug!("engine shutting down");
            drop(runner);
            drop(runtime);
        });

        Ok(Self { cmd_tx, msg_rx })
    }

    pub fn run(&self, effects: Vec<Effect>) {
        for effect in effects {
            let _ = self.cmd_tx.send(EngineCommand::Run(effect));
        }
    }

    pub fn try_recv(&self) -> Option<Msg> {
        self.msg_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<Msg> {
        self.msg_rx.recv_timeout(timeout).ok()
    }
}
