use std::future::Future;
use std::pin::pin;

use folio_core::RequestError;
use futures_util::future::{self, Either};
use tokio_util::sync::CancellationToken;

/// Runs `fut` unless `cancel` fires first, in which case the future is
/// dropped and `RequestError::Cancelled` is returned.
pub(crate) async fn cancellable<T, F>(
    cancel: &CancellationToken,
    fut: F,
) -> Result<T, RequestError>
where
    F: Future<Output = Result<T, RequestError>>,
{
    let cancelled = pin!(cancel.cancelled());
    let fut = pin!(fut);
    match future::select(cancelled, fut).await {
        Either::Left(_) => Err(RequestError::Cancelled),
        Either::Right((result, _)) => result,
    }
}
