//! One-shot lookups shown next to the manifest views.
use folio_core::{Event, HighlightKey, RequestToken, StatusChange};

use crate::api::ManifestApi;

pub async fn fetch_highlights(
    api: &dyn ManifestApi,
    key: HighlightKey,
    token: RequestToken,
) -> Event {
    let result = api.highlight_locations(&key).await;
    Event::Highlights {
        key,
        token,
        change: StatusChange::from(result),
    }
}

pub async fn fetch_stats(api: &dyn ManifestApi, token: RequestToken) -> Event {
    Event::Stats {
        token,
        change: StatusChange::from(api.stats().await),
    }
}
