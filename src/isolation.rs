// Timeout/isolation wrapper: the only mechanism by which a slow or broken
// upstream is kept from blocking or failing the whole request.

use std::future::Future;
use std::time::Duration;

use tokio::time::timeout;
use tracing::warn;

use crate::error::ProviderError;

/// Bound `fut` by `deadline` and convert every outcome into a soft result:
/// success -> `(Some(value), None)`, failure -> `(None, Some(message))`,
/// timeout -> `(None, Some(message))`. Never returns an error.
///
/// On timeout the wrapped future is dropped, which cancels the underlying
/// call at its next await point.
pub async fn guard<T, F>(label: &str, deadline: Duration, fut: F) -> (Option<T>, Option<String>)
where
    F: Future<Output = Result<T, ProviderError>>,
{
    match timeout(deadline, fut).await {
        Ok(Ok(value)) => (Some(value), None),
        Ok(Err(err)) => {
            let message = format!("{label} failed: {err}");
            warn!(provider = label, error = %err, "provider call failed");
            (None, Some(message))
        }
        Err(_) => {
            let message = format!("{label} timed out after {}s", deadline.as_secs());
            warn!(provider = label, timeout_secs = deadline.as_secs(), "provider call timed out");
            (None, Some(message))
        }
    }
}
