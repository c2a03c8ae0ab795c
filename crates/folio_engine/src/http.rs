use std::time::Duration;

use folio_core::{HighlightKey, LocalManifest, PageRequest, RequestError, SearchResultPage};
use folio_logging::folio_debug;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{StatusCode, Url};
use serde_json::{json, Value};

use crate::api::{ManifestApi, PollReply};

const JSON: &str = "application/json";
const JSON_LD: &str = "application/ld+json, application/json";

#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// Root of the folio server; endpoint paths are resolved against it.
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// [`ManifestApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: reqwest::Client,
    base: Url,
}

impl HttpApi {
    pub fn new(settings: &ClientSettings) -> Result<Self, RequestError> {
        let mut base = Url::parse(&settings.base_url).map_err(|err| {
            RequestError::ClientValidation {
                message: format!("invalid base url {}: {err}", settings.base_url),
            }
        })?;
        // Relative joins must append to the base path, not replace its last segment.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(map_reqwest_error)?;

        Ok(Self { client, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url, RequestError> {
        self.base
            .join(path)
            .map_err(|err| RequestError::ClientValidation {
                message: format!("cannot resolve {path}: {err}"),
            })
    }

    /// `manifests/{id}/` with `id` percent-encoded as a single segment,
    /// followed by `extra` segments.
    fn manifest_url(&self, id: &str, extra: &[&str]) -> Result<Url, RequestError> {
        let mut url = self.endpoint("manifests/")?;
        url.path_segments_mut()
            .map_err(|_| RequestError::ClientValidation {
                message: format!("base url {} cannot carry a path", self.base),
            })?
            .pop_if_empty()
            .push(id)
            .extend(extra)
            .push("");
        Ok(url)
    }

    async fn get_json(&self, url: Url, accept: &str) -> Result<Value, RequestError> {
        folio_debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .header(ACCEPT, accept)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        read_json(expect_status(response, StatusCode::OK)?).await
    }
}

#[async_trait::async_trait]
impl ManifestApi for HttpApi {
    async fn get_manifest(&self, id: &str) -> Result<LocalManifest, RequestError> {
        let url = self.manifest_url(id, &[])?;
        decode(self.get_json(url, JSON).await?)
    }

    async fn get_recent(&self) -> Result<Vec<LocalManifest>, RequestError> {
        let url = self.endpoint("manifests/recent/")?;
        decode(self.get_json(url, JSON).await?)
    }

    async fn load_remote(&self, remote_url: &str) -> Result<Value, RequestError> {
        let url = Url::parse(remote_url).map_err(|err| RequestError::ClientValidation {
            message: format!("invalid remote url {remote_url}: {err}"),
        })?;
        self.get_json(url, JSON_LD).await
    }

    async fn submit_upload(&self, remote_url: &str) -> Result<String, RequestError> {
        let url = self.endpoint("manifests/")?;
        let body = serde_json::to_vec(&json!({ "remote_url": remote_url }))
            .map_err(|err| RequestError::decode(err.to_string()))?;
        folio_debug!("POST {} remote_url={}", url, remote_url);
        let response = self
            .client
            .post(url)
            .header(ACCEPT, JSON)
            .header(CONTENT_TYPE, JSON)
            .body(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let body = read_json(expect_status(response, StatusCode::ACCEPTED)?).await?;
        match body.get("status").and_then(Value::as_str) {
            Some(status_url) => Ok(status_url.to_string()),
            None => Err(RequestError::decode("upload response has no status url")),
        }
    }

    async fn poll_upload(&self, status_url: &str) -> Result<PollReply, RequestError> {
        let url = self.endpoint(status_url)?;
        let response = self
            .client
            .get(url)
            .header(ACCEPT, JSON)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let status = response.status();
        let final_url = response.url().to_string();
        let body = if status == StatusCode::OK {
            Some(read_json(response).await?)
        } else {
            None
        };
        Ok(PollReply {
            status: status.as_u16(),
            status_text: status_text(status),
            url: final_url,
            body,
        })
    }

    async fn fetch_uploaded(&self, location: &str) -> Result<Value, RequestError> {
        let url = self.endpoint(location)?;
        self.get_json(url, JSON).await
    }

    async fn search_page(
        &self,
        query: &str,
        page: &PageRequest,
    ) -> Result<SearchResultPage, RequestError> {
        let url = match page {
            PageRequest::First => {
                let mut url = self.endpoint("search")?;
                url.query_pairs_mut().append_pair("q", query);
                url
            }
            PageRequest::Next { url } => self.endpoint(url)?,
        };
        SearchResultPage::from_body(self.get_json(url, JSON).await?)
    }

    async fn suggestions(&self, query: &str) -> Result<Vec<String>, RequestError> {
        let mut url = self.endpoint("suggest/")?;
        url.query_pairs_mut().append_pair("q", query);
        let body = self.get_json(url, JSON).await?;
        match body.get("suggestions") {
            Some(list) => decode(list.clone()),
            None => Ok(Vec::new()),
        }
    }

    async fn stats(&self) -> Result<Value, RequestError> {
        let url = self.endpoint("stats/")?;
        self.get_json(url, JSON).await
    }

    async fn highlight_locations(&self, key: &HighlightKey) -> Result<Value, RequestError> {
        let mut url = self.manifest_url(&key.manifest_id, &["search"])?;
        // Pages are 1-based on the wire.
        url.query_pairs_mut()
            .append_pair("m", &key.pitch_query)
            .append_pair("p", &(u64::from(key.page_index) + 1).to_string());
        self.get_json(url, JSON).await
    }
}

fn expect_status(
    response: reqwest::Response,
    expected: StatusCode,
) -> Result<reqwest::Response, RequestError> {
    let status = response.status();
    if status == expected {
        Ok(response)
    } else {
        Err(RequestError::transport(status.as_u16(), status_text(status)))
    }
}

async fn read_json(response: reqwest::Response) -> Result<Value, RequestError> {
    let bytes = response.bytes().await.map_err(map_reqwest_error)?;
    serde_json::from_slice(&bytes).map_err(|err| RequestError::decode(err.to_string()))
}

fn decode<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, RequestError> {
    serde_json::from_value(value).map_err(|err| RequestError::decode(err.to_string()))
}

fn status_text(status: StatusCode) -> String {
    status.canonical_reason().unwrap_or_default().to_string()
}

fn map_reqwest_error(err: reqwest::Error) -> RequestError {
    if err.is_timeout() {
        return RequestError::Timeout {
            message: err.to_string(),
        };
    }
    RequestError::Network {
        message: err.to_string(),
    }
}
