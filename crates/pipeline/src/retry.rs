//! Retry policy for transient provider errors (§4.3, §7): exponential
//! backoff, maximum 3 attempts over at most 1 second total.

use std::future::Future;
use std::time::Duration;

use interlingo_core::{CoreError, Result as CoreResult};

const MAX_ATTEMPTS: u32 = 3;
const BUDGET: Duration = Duration::from_millis(1_000);

pub async fn with_retry<F, Fut, T>(mut attempt: F) -> CoreResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = CoreResult<T>>,
{
    let started = tokio::time::Instant::now();
    let mut last_err = None;

    for n in 0..MAX_ATTEMPTS {
        if started.elapsed() >= BUDGET {
            break;
        }
        match attempt().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() => {
                tracing::warn!(attempt = n + 1, error = %err, "retrying after transient provider error");
                last_err = Some(err);
                let backoff = Duration::from_millis(50 * 2u64.pow(n));
                let remaining = BUDGET.saturating_sub(started.elapsed());
                tokio::time::sleep(backoff.min(remaining)).await;
            }
            Err(err) => return Err(err),
        }
    }

    Err(last_err.unwrap_or_else(|| CoreError::transient("retry budget exhausted")))
}
