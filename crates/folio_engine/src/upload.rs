//! Create-then-poll import jobs.
use std::time::Duration;

use folio_core::{RequestError, UploadedManifest};
use folio_logging::{folio_debug, folio_info, folio_warn};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::api::{ManifestApi, PollReply};
use crate::cancel::cancellable;

const UPLOAD_ERROR: i64 = -1;
const UPLOAD_SUCCESS: i64 = 0;
const UPLOAD_PROCESSING: i64 = 1;

#[derive(Debug, Clone)]
pub struct PollSettings {
    pub interval: Duration,
    /// Upper bound on status polls, 5xx answers included.
    pub max_polls: u32,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(1000),
            max_polls: 300,
        }
    }
}

/// What to do after one status poll.
#[derive(Debug, Clone, PartialEq)]
pub enum PollStep {
    Continue,
    /// The job finished; the imported manifest lives at this location.
    FetchLocation(String),
    Finished(UploadedManifest),
    Failed(RequestError),
}

/// Interprets one status poll answer.
pub fn interpret_poll(reply: PollReply) -> PollStep {
    // The server is expected to recover from 5xx while the job runs.
    if reply.status >= 500 {
        return PollStep::Continue;
    }
    if reply.status != 200 {
        return PollStep::Failed(RequestError::transport(reply.status, reply.status_text));
    }
    let Some(body) = reply.body else {
        return PollStep::Failed(RequestError::decode("status poll returned no body"));
    };

    match body.get("status").and_then(Value::as_i64) {
        Some(UPLOAD_PROCESSING) => PollStep::Continue,
        Some(UPLOAD_ERROR) => {
            let message = body
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("the server rejected the manifest");
            PollStep::Failed(RequestError::rejection(message))
        }
        Some(UPLOAD_SUCCESS) => match body.get("location").and_then(Value::as_str) {
            Some(location) => PollStep::FetchLocation(location.to_string()),
            None => PollStep::Failed(RequestError::decode("finished job has no location")),
        },
        // Unknown status: a body that already looks like the imported
        // manifest ends the job, anything else keeps polling.
        _ if body
            .get("remote_url")
            .and_then(Value::as_str)
            .is_some_and(|url| !url.is_empty()) =>
        {
            PollStep::Finished(UploadedManifest {
                url: reply.url,
                resource: body,
            })
        }
        _ => PollStep::Continue,
    }
}

/// Submits `source_url` for import and polls the job until it finishes,
/// fails, is cancelled, or exceeds `settings.max_polls`.
pub async fn run_upload(
    api: &dyn ManifestApi,
    source_url: &str,
    settings: &PollSettings,
    cancel: &CancellationToken,
) -> Result<UploadedManifest, RequestError> {
    let status_url = cancellable(cancel, api.submit_upload(source_url)).await?;
    folio_info!("upload of {} accepted, polling {}", source_url, status_url);

    for attempt in 1..=settings.max_polls {
        let reply = cancellable(cancel, api.poll_upload(&status_url)).await?;
        if reply.status >= 500 {
            folio_warn!(
                "status poll {} for {} answered {}, retrying",
                attempt,
                source_url,
                reply.status
            );
        }
        match interpret_poll(reply) {
            PollStep::Continue => {
                folio_debug!("upload of {} still processing (poll {})", source_url, attempt);
                cancellable(cancel, async {
                    tokio::time::sleep(settings.interval).await;
                    Ok(())
                })
                .await?;
            }
            PollStep::FetchLocation(location) => {
                let resource = cancellable(cancel, api.fetch_uploaded(&location)).await?;
                return Ok(UploadedManifest {
                    url: location,
                    resource,
                });
            }
            PollStep::Finished(uploaded) => return Ok(uploaded),
            PollStep::Failed(err) => return Err(err),
        }
    }

    Err(RequestError::Timeout {
        message: format!(
            "import of {source_url} still processing after {} status polls",
            settings.max_polls
        ),
    })
}
