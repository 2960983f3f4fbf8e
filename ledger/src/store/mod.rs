pub mod sqlite_store;

use crate::model::LedgerEntry;

/// Durable, append-only store for accepted swap executions.
///
/// The pipelines call `record` at most once per accepted execution, and only
/// after every safety gate has passed.
#[async_trait::async_trait]
pub trait SwapLedger: Send + Sync {
    async fn record(&self, entry: &LedgerEntry) -> anyhow::Result<()>;

    /// Full audit readback, oldest first.
    async fn load_all(&self) -> anyhow::Result<Vec<LedgerEntry>>;

    async fn count(&self) -> anyhow::Result<u64>;
}
