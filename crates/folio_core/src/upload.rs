use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::LocalManifest;

/// Result of a finished import job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadedManifest {
    /// Where the imported manifest was fetched from.
    pub url: String,
    pub resource: Value,
}

impl UploadedManifest {
    /// The local record inside the imported resource, if it has one.
    pub fn local_manifest(&self) -> Option<LocalManifest> {
        serde_json::from_value(self.resource.clone()).ok()
    }
}

/// Checks a source URL before anything is sent to the server.
pub fn validate_source_url(raw: &str) -> Result<(), String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("Please enter a manifest URL.".to_string());
    }
    let parsed = Url::parse(trimmed).map_err(|err| format!("Invalid URL: {err}"))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(format!("Unsupported URL scheme: {other}")),
    }
}
