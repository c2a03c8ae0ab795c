use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cache::{RequestToken, Slot};
use crate::resource::{Resource, ResourceStatus};
use crate::RequestError;

/// One page of search results as returned by `GET /search?q=...`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SearchResultPage {
    #[serde(default)]
    pub num_found: u64,
    /// Token (a URL) for the following page.
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub results: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spellcheck: Option<Value>,
}

impl SearchResultPage {
    /// Reads a page from a response body, accepting an enclosing
    /// `{"search": {...}}` envelope.
    pub fn from_body(body: Value) -> Result<Self, RequestError> {
        let inner = match body {
            Value::Object(mut map) if map.get("search").is_some_and(Value::is_object) => {
                map.remove("search").unwrap_or_default()
            }
            other => other,
        };
        serde_json::from_value(inner).map_err(|err| RequestError::decode(err.to_string()))
    }
}

/// Appends `page` to previously loaded results; totals and the next-page
/// token come from the newest page.
pub fn append_page(existing: Option<SearchResultPage>, page: SearchResultPage) -> SearchResultPage {
    let mut results = existing.map(|prev| prev.results).unwrap_or_default();
    results.extend(page.results);
    SearchResultPage {
        num_found: page.num_found,
        next: page.next,
        results,
        spellcheck: page.spellcheck,
    }
}

/// Which page an outbound search asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRequest {
    First,
    Next { url: String },
}

impl PageRequest {
    pub fn kind(&self) -> SearchPage {
        match self {
            PageRequest::First => SearchPage::First,
            PageRequest::Next { .. } => SearchPage::Next,
        }
    }
}

/// Whether a search event concerns the first page (replace) or a later one (append).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPage {
    First,
    Next,
}

pub type SearchResource = Resource<SearchResultPage, RequestError>;

/// Search read model: the active query, its results, and the last good
/// results of a previous query kept on screen while the new one loads.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchState {
    pub(crate) current_query: Option<String>,
    pub(crate) current: Slot<SearchResultPage, RequestError>,
    pub(crate) stale_query: Option<String>,
    pub(crate) stale: SearchResource,
    pub(crate) suggestions: Vec<String>,
}

impl SearchState {
    pub fn current_query(&self) -> Option<&str> {
        self.current_query.as_deref()
    }

    pub fn current(&self) -> &SearchResource {
        self.current.resource()
    }

    pub fn status(&self) -> ResourceStatus {
        self.current.status()
    }

    pub fn stale_query(&self) -> Option<&str> {
        self.stale_query.as_deref()
    }

    pub fn stale(&self) -> &SearchResource {
        &self.stale
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    pub fn next_page(&self) -> Option<&str> {
        match self.current.resource() {
            Resource::Success(page) => page.next.as_deref(),
            _ => None,
        }
    }

    pub(crate) fn active_token(&self) -> Option<RequestToken> {
        self.current.token()
    }

    /// True when `query` is already being served (in flight or loaded).
    pub(crate) fn serves(&self, query: &str) -> bool {
        self.current_query.as_deref() == Some(query)
            && matches!(
                self.current.status(),
                ResourceStatus::Pending | ResourceStatus::Success
            )
    }

    pub(crate) fn is_idle(&self) -> bool {
        *self == SearchState::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn page_body_with_and_without_envelope() {
        let bare = json!({"num_found": 3, "next": "/search?q=a&page=2", "results": [1, 2]});
        let wrapped = json!({"search": bare.clone()});

        let a = SearchResultPage::from_body(bare).unwrap();
        let b = SearchResultPage::from_body(wrapped).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.num_found, 3);
        assert_eq!(a.next.as_deref(), Some("/search?q=a&page=2"));
    }

    #[test]
    fn malformed_body_is_a_decode_error() {
        let err = SearchResultPage::from_body(json!({"results": "nope"})).unwrap_err();
        assert!(matches!(err, RequestError::Decode { .. }));
    }

    #[test]
    fn append_concatenates_in_order_and_takes_newest_cursor() {
        let first = SearchResultPage {
            num_found: 4,
            next: Some("p2".into()),
            results: vec![json!("a"), json!("b")],
            spellcheck: None,
        };
        let second = SearchResultPage {
            num_found: 4,
            next: None,
            results: vec![json!("c"), json!("d")],
            spellcheck: None,
        };
        let merged = append_page(Some(first), second);
        assert_eq!(merged.results, vec![json!("a"), json!("b"), json!("c"), json!("d")]);
        assert_eq!(merged.next, None);
    }
}
