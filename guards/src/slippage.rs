use std::collections::BTreeMap;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::RiskLevel;

/// Recommendation produced by the adaptive slippage model at quote time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlippageAssessment {
    /// Recommended tolerance in percent.
    pub recommended_pct: Decimal,
    /// Per-factor contribution to the recommendation, in percent.
    pub breakdown: BTreeMap<String, Decimal>,
    /// Model confidence, 0..=100.
    pub confidence: Decimal,
    pub risk_level: RiskLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Expected-vs-guaranteed output pair checked at execution time.
#[derive(Debug, Clone)]
pub struct SlippageCheck {
    pub expected_amount_out: Decimal,
    /// Floor the caller is guaranteed (their min out, or the tolerance-implied floor).
    pub actual_amount_out: Decimal,
    /// Maximum tolerated deviation in percent.
    pub max_slippage_pct: Decimal,
    pub correlation_id: String,
}

/// Verdict on a specific expected-vs-actual output pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlippageValidation {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Abstraction over the external slippage-computation layer.
#[async_trait]
pub trait SlippageGuard: Send + Sync {
    /// Derive the optimal tolerance for a prospective swap.
    async fn calculate_optimal(
        &self,
        token_in: &str,
        token_out: &str,
        amount_in: Decimal,
        user_slippage_pct: Option<Decimal>,
    ) -> anyhow::Result<SlippageAssessment>;

    /// Validate an execution-time output floor against the tolerance.
    async fn validate(&self, check: SlippageCheck) -> anyhow::Result<SlippageValidation>;

    /// Point-in-time counters for the security stats surface.
    fn stats(&self) -> serde_json::Value;
}
