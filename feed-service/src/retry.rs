/// Bounded retry with exponential backoff for the write path
///
/// Retries only transient infrastructure errors; validation and
/// serialization failures return immediately. Exhausting the budget
/// surfaces `WriteFailure` — no rollback is attempted, partial durable or
/// cache state is repaired by the read path's database fallback.
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

use crate::config::RetryConfig;
use crate::error::{AppError, Result};

/// Run `f` up to `config.max_attempts` times.
///
/// Attempt n (1-based) sleeps `base_backoff * 2^n` before the next try,
/// so the defaults give 2s, 4s delays between three attempts.
pub async fn with_retry<F, Fut, T>(config: &RetryConfig, operation: &str, mut f: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt: u32 = 0;

    loop {
        match f().await {
            Ok(value) => return Ok(value),
            Err(e) if !e.is_transient() => return Err(e),
            Err(e) => {
                attempt += 1;
                if attempt >= config.max_attempts {
                    warn!(operation, attempts = attempt, "retry budget exhausted: {}", e);
                    return Err(AppError::WriteFailure {
                        attempts: attempt,
                        last_error: e.to_string(),
                    });
                }

                let delay = backoff_delay(config, attempt);
                warn!(
                    operation,
                    attempt,
                    max_attempts = config.max_attempts,
                    "transient failure, retrying in {:?}: {}",
                    delay,
                    e
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

fn backoff_delay(config: &RetryConfig, attempt: u32) -> Duration {
    let base = config.base_backoff.as_millis() as f64 * 2f64.powi(attempt as i32);
    let millis = if config.jitter {
        let factor = 1.0 + rand::thread_rng().gen_range(-0.3..0.3);
        base * factor
    } else {
        base
    };
    Duration::from_millis(millis as u64)
}
