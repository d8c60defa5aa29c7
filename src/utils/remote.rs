use std::{future::Future, time::Duration};

use tokio::time;

use crate::error::{ConsoleError, ConsoleResult};

/// Bound a single store call. The outer result carries the timeout, the inner
/// one whatever the store reported.
pub async fn bounded<T, F>(
    op: impl Into<String>,
    limit: Duration,
    call: F,
) -> ConsoleResult<anyhow::Result<T>>
where
    F: Future<Output = anyhow::Result<T>>,
{
    match time::timeout(limit, call).await {
        Ok(result) => Ok(result),
        Err(_) => Err(ConsoleError::Timeout {
            op: op.into(),
            after_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn slow_call_times_out() {
        let result = bounded("get users/1", Duration::from_millis(10), async {
            time::sleep(Duration::from_millis(200)).await;
            Ok::<_, anyhow::Error>(())
        })
        .await;

        match result {
            Err(ConsoleError::Timeout { op, after_ms }) => {
                assert_eq!(op, "get users/1");
                assert_eq!(after_ms, 10);
            }
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn inner_error_passes_through() {
        let result = bounded("delete users/1", Duration::from_secs(1), async {
            Err::<(), _>(anyhow::anyhow!("permission denied"))
        })
        .await;

        let inner = result.expect("no timeout");
        assert!(inner.unwrap_err().to_string().contains("permission denied"));
    }
}
