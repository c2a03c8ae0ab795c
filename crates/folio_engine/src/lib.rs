//! Folio engine: HTTP client, upload polling, search scheduling and effect execution.
mod api;
mod cancel;
mod debounce;
mod engine;
mod http;
mod lookup;
mod manifest;
mod runner;
mod search;
mod upload;

pub use api::{ManifestApi, PollReply};
pub use debounce::Debouncer;
pub use engine::{EngineError, EngineHandle, EngineSettings};
pub use http::{ClientSettings, HttpApi};
pub use runner::{ChannelMsgSink, EffectRunner, MsgSink};
pub use search::SearchController;
pub use upload::{interpret_poll, run_upload, PollSettings, PollStep};
