//! Timeout enforcement.
//!
//! # Responsibilities
//! - Bound the backend call, including reading its body
//! - Map an elapsed deadline to `ForwardError::Timeout` (504)
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities; the inner future is dropped on expiry,
//!   which aborts the outbound request
//! - `None` means no deadline

use std::future::Future;
use std::time::Duration;

use crate::http::response::ForwardError;

/// Convert a configured number of seconds into an optional deadline (0 disables).
pub fn deadline_from_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

/// Run `fut` under `deadline`.
pub async fn with_deadline<F, T>(deadline: Option<Duration>, fut: F) -> Result<T, ForwardError>
where
    F: Future<Output = Result<T, ForwardError>>,
{
    match deadline {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| ForwardError::Timeout(limit))?,
        None => fut.await,
    }
}
