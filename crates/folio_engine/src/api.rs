use folio_core::{HighlightKey, LocalManifest, PageRequest, RequestError, SearchResultPage};
use serde_json::Value;

/// Raw answer of an upload status poll. The body is only read for 200s.
#[derive(Debug, Clone, PartialEq)]
pub struct PollReply {
    pub status: u16,
    pub status_text: String,
    /// Final URL of the poll response.
    pub url: String,
    pub body: Option<Value>,
}

/// The HTTP collaborator the coordinators talk to.
#[async_trait::async_trait]
pub trait ManifestApi: Send + Sync {
    /// `GET /manifests/{id}/`
    async fn get_manifest(&self, id: &str) -> Result<LocalManifest, RequestError>;

    /// `GET /manifests/recent/`
    async fn get_recent(&self) -> Result<Vec<LocalManifest>, RequestError>;

    /// `GET <remote_url>` for the IIIF document itself.
    async fn load_remote(&self, remote_url: &str) -> Result<Value, RequestError>;

    /// `POST /manifests/`; resolves to the status URL to poll.
    async fn submit_upload(&self, remote_url: &str) -> Result<String, RequestError>;

    /// `GET <status_url>`; any HTTP status is returned for the poller to interpret.
    async fn poll_upload(&self, status_url: &str) -> Result<PollReply, RequestError>;

    /// `GET <location>` of a finished import.
    async fn fetch_uploaded(&self, location: &str) -> Result<Value, RequestError>;

    /// `GET /search?q=<query>` or the next-page URL.
    async fn search_page(
        &self,
        query: &str,
        page: &PageRequest,
    ) -> Result<SearchResultPage, RequestError>;

    /// `GET /suggest/?q=<query>`
    async fn suggestions(&self, query: &str) -> Result<Vec<String>, RequestError>;

    /// `GET /stats/`
    async fn stats(&self) -> Result<Value, RequestError>;

    /// `GET /manifests/{id}/search/?m=<pitch>&p=<page+1>`
    async fn highlight_locations(&self, key: &HighlightKey) -> Result<Value, RequestError>;
}
