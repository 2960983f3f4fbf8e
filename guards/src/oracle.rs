use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Verdict of one price-consensus round for a pair.
///
/// `valid == false` means consensus could not be reached; `reason` says why.
/// A quote is produced fresh per call and never cached by the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceQuote {
    pub price: Decimal,
    pub valid: bool,
    /// Agreement score across feeds, 0..=100.
    pub confidence: Decimal,
    /// Relative spread between the participating feeds, in percent.
    pub deviation: Decimal,
    /// Feeds that contributed to this round, in consultation order.
    pub sources: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl PriceQuote {
    /// Consensus failure carrying the reason instead of a price.
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self {
            price: Decimal::ZERO,
            valid: false,
            confidence: Decimal::ZERO,
            deviation: Decimal::ZERO,
            sources: vec![],
            reason: Some(reason.into()),
        }
    }
}

/// Abstraction over the external price-consensus layer.
///
/// Implementations must report `valid:false` with a reason rather than
/// failing silently when consensus cannot be reached, and must never block
/// indefinitely; the pipelines additionally bound every call with a timeout.
#[async_trait]
pub trait PriceOracle: Send + Sync {
    async fn get_price(&self, token_in: &str, token_out: &str) -> anyhow::Result<PriceQuote>;

    /// Point-in-time counters for the security stats surface.
    fn stats(&self) -> serde_json::Value;
}
