use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One accepted swap execution, as durably recorded.
///
/// Entries are append-only: an accepted execution produces exactly one entry
/// and nothing ever mutates it afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub token_in: String,
    pub token_out: String,
    pub amount_in: Decimal,
    pub amount_out: Decimal,
    pub timestamp_ms: u64,
    /// Execution hash this entry belongs to.
    pub tx_hash: String,
    /// Submitting address.
    pub from: String,
}
