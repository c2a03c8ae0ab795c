use folio_core::{Event, LocalManifest, ManifestChange, ManifestId, RequestToken, StatusChange};
use folio_logging::{folio_debug, folio_warn};

use crate::api::ManifestApi;

/// `GET /manifests/{id}/`; success yields the local record, whose remote
/// document is requested as a follow-up.
pub async fn fetch_local(api: &dyn ManifestApi, id: ManifestId, token: RequestToken) -> Event {
    let change = match api.get_manifest(&id).await {
        Ok(local) => {
            folio_debug!("manifest {} points at {}", id, local.remote_url);
            ManifestChange::LocalLoaded(local)
        }
        Err(err) => {
            folio_warn!("manifest {} lookup failed: {}", id, err);
            ManifestChange::Failed(err)
        }
    };
    Event::Manifest { id, token, change }
}

pub async fn fetch_remote(
    api: &dyn ManifestApi,
    id: ManifestId,
    remote_url: String,
    token: RequestToken,
) -> Event {
    let change = match api.load_remote(&remote_url).await {
        Ok(document) => ManifestChange::RemoteLoaded(document),
        Err(err) => {
            folio_warn!("remote manifest {} for {} failed: {}", remote_url, id, err);
            ManifestChange::Failed(err)
        }
    };
    Event::Manifest { id, token, change }
}

pub async fn fetch_recent(api: &dyn ManifestApi, token: RequestToken) -> Event {
    let result: Result<Vec<LocalManifest>, _> = api.get_recent().await;
    Event::RecentManifests {
        token,
        change: StatusChange::from(result),
    }
}
