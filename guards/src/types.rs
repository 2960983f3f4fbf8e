use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Risk band attached to a slippage recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// Attack pattern reported by the MEV screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttackType {
    Sandwich,
    FrontRun,
    BackRun,
}

/// Transaction context handed to the MEV screen before execution.
///
/// This is everything the screen may inspect; it never sees the ledger or
/// the oracle verdicts.
#[derive(Debug, Clone, Serialize)]
pub struct TxContext {
    pub token_in: String,
    pub token_out: String,
    pub amount_in: Decimal,
    /// Tolerance the caller is willing to accept, in percent.
    pub slippage_tolerance_pct: Decimal,
    /// Submitting address.
    pub from: String,
    pub timestamp_ms: u64,
    /// Type tag; currently always "swap".
    pub kind: &'static str,
}

impl TxContext {
    pub fn pair_id(&self) -> String {
        format!("{}/{}", self.token_in, self.token_out)
    }
}
