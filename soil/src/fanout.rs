//! Concurrent dispatch of blocking raster reads.

use std::time::Instant;

use futures::future::try_join_all;

use crate::error::{Result, SoilError};

/// Run a blocking closure on the tokio blocking pool if a runtime is
/// available, inline otherwise.
///
/// # Errors
///
/// Returns the closure's own error, or [`SoilError::Task`] if it panicked.
pub async fn run_blocking<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    match tokio::runtime::Handle::try_current() {
        Ok(runtime) => runtime
            .spawn_blocking(f)
            .await
            .map_err(|e| SoilError::Task(e.to_string()))?,
        Err(_) => f(),
    }
}

/// Dispatch every operation at once and wait for all of them.
///
/// Results are returned in the order of `ops`, regardless of completion
/// order. The first failure fails the whole batch; operations already
/// running are left to finish in the background.
///
/// # Example
///
/// ```ignore
/// let values = run_concurrent(vec![|| Ok(1), || Ok(2)]).await?;
/// assert_eq!(values, vec![1, 2]);
/// ```
pub async fn run_concurrent<F, T>(ops: Vec<F>) -> Result<Vec<T>>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    let width = ops.len();
    let started = Instant::now();

    let results = try_join_all(ops.into_iter().map(run_blocking)).await;

    tracing::debug!(
        width,
        elapsed_ms = started.elapsed().as_millis() as u64,
        ok = results.is_ok(),
        "Fan-out finished"
    );
    results
}
