//! Bounded collaborator calls.
//!
//! Every external collaborator call is a suspension point and must complete
//! within its budget; an elapsed budget is a collaborator failure, never an
//! infinite wait. How a `CallError` maps into the taxonomy is decided per
//! pipeline stage.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CallError {
    #[error("{0} call timed out")]
    TimedOut(&'static str),

    #[error("{label} call failed: {source}")]
    Failed {
        label: &'static str,
        source: anyhow::Error,
    },
}

/// Per-collaborator call budgets.
#[derive(Debug, Clone, Copy)]
pub struct CallTimeouts {
    pub oracle: Duration,
    pub slippage: Duration,
    pub mev: Duration,
    pub ledger: Duration,
}

impl Default for CallTimeouts {
    fn default() -> Self {
        Self {
            oracle: Duration::from_millis(2_000),
            slippage: Duration::from_millis(2_000),
            mev: Duration::from_millis(1_000),
            ledger: Duration::from_millis(2_000),
        }
    }
}

/// Await `fut` for at most `limit`, normalizing both outcomes of failure.
pub async fn bounded<T, F>(label: &'static str, limit: Duration, fut: F) -> Result<T, CallError>
where
    F: Future<Output = anyhow::Result<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Err(_) => Err(CallError::TimedOut(label)),
        Ok(Err(source)) => Err(CallError::Failed { label, source }),
        Ok(Ok(v)) => Ok(v),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn passes_through_success() {
        let out = bounded("x", Duration::from_millis(50), async { Ok(7u32) }).await;
        assert!(matches!(out, Ok(7)));
    }

    #[tokio::test]
    async fn classifies_timeout() {
        let out = bounded("slow", Duration::from_millis(5), async {
            tokio::time::sleep(Duration::from_secs(1)).await;
            Ok(())
        })
        .await;

        assert!(matches!(out, Err(CallError::TimedOut("slow"))));
    }

    #[tokio::test]
    async fn classifies_collaborator_error() {
        let out: Result<(), _> = bounded("broken", Duration::from_millis(50), async {
            Err(anyhow::anyhow!("boom"))
        })
        .await;

        assert!(matches!(out, Err(CallError::Failed { label: "broken", .. })));
    }
}
