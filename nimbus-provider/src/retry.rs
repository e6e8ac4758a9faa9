//! Retry helper for return-code-classified transient API errors.

use std::time::Duration;

use tokio::time::{Instant, sleep};
use tracing::warn;

use crate::error::{ProviderError, Result};

/// Re-run `op` while it fails with one of the listed return codes, sleeping
/// `delay` between attempts, up to `timeout`. Any other error - including a
/// malformed error body, which carries no code - propagates immediately.
pub async fn retry_on_codes<T, F>(
    codes: &[&str],
    timeout: Duration,
    delay: Duration,
    mut op: F,
) -> Result<T>
where
    F: AsyncFnMut() -> Result<T>,
{
    let deadline = Instant::now() + timeout;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.code_in(codes) && Instant::now() + delay < deadline => {
                warn!(code = err.return_code().unwrap_or("-"), "transient API error, retrying");
                sleep(delay).await;
            }
            Err(err) => return Err(err),
        }
    }
}
