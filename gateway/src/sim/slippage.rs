//! Adaptive slippage model over static per-pair market profiles.
//!
//! The recommendation is a sum of three factors: pair volatility, book
//! thinness, and order size relative to depth. Validation at execution time
//! is a pure tolerance check on an expected-vs-floor pair.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;

use guards::{RiskLevel, SlippageAssessment, SlippageCheck, SlippageGuard, SlippageValidation};

#[derive(Debug, Clone, Copy)]
pub struct PairProfile {
    /// Base volatility contribution, in percent.
    pub volatility_pct: Decimal,
    /// Notional depth of the book, in input-token units.
    pub depth: Decimal,
}

pub struct SimSlippageGuard {
    profiles: HashMap<String, PairProfile>,
    default_profile: PairProfile,
    /// Recommendations are capped here regardless of the factor sum.
    max_recommended_pct: Decimal,
    calculations: AtomicU64,
    validations: AtomicU64,
    rejections: AtomicU64,
}

impl SimSlippageGuard {
    pub fn new(profiles: HashMap<String, PairProfile>, default_profile: PairProfile) -> Self {
        Self {
            profiles,
            default_profile,
            max_recommended_pct: dec!(5.0),
            calculations: AtomicU64::new(0),
            validations: AtomicU64::new(0),
            rejections: AtomicU64::new(0),
        }
    }

    pub fn with_default_profiles() -> Self {
        let mut profiles = HashMap::new();
        profiles.insert(
            "ETH/USDC".to_string(),
            PairProfile {
                volatility_pct: dec!(0.30),
                depth: dec!(50000),
            },
        );
        profiles.insert(
            "BTC/USDC".to_string(),
            PairProfile {
                volatility_pct: dec!(0.25),
                depth: dec!(8000),
            },
        );
        profiles.insert(
            "SOL/USDC".to_string(),
            PairProfile {
                volatility_pct: dec!(0.45),
                depth: dec!(200000),
            },
        );
        profiles.insert(
            "USDC/DAI".to_string(),
            PairProfile {
                volatility_pct: dec!(0.05),
                depth: dec!(2000000),
            },
        );

        // Uncovered pairs are assumed thin and volatile.
        let default_profile = PairProfile {
            volatility_pct: dec!(1.20),
            depth: dec!(5000),
        };

        Self::new(profiles, default_profile)
    }

    fn risk_level(recommended_pct: Decimal) -> RiskLevel {
        if recommended_pct < dec!(0.5) {
            RiskLevel::Low
        } else if recommended_pct < dec!(1.5) {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }
}

#[async_trait]
impl SlippageGuard for SimSlippageGuard {
    async fn calculate_optimal(
        &self,
        token_in: &str,
        token_out: &str,
        amount_in: Decimal,
        user_slippage_pct: Option<Decimal>,
    ) -> anyhow::Result<SlippageAssessment> {
        self.calculations.fetch_add(1, Ordering::Relaxed);

        let pair = format!("{token_in}/{token_out}");
        let known = self.profiles.contains_key(&pair);
        let profile = self
            .profiles
            .get(&pair)
            .copied()
            .unwrap_or(self.default_profile);

        let volatility = profile.volatility_pct;
        let liquidity = (dec!(100) / profile.depth).round_dp(4);
        let size = (amount_in / profile.depth * dec!(50)).round_dp(4);

        let recommended_pct = (volatility + liquidity + size)
            .min(self.max_recommended_pct)
            .round_dp(2);
        let risk_level = Self::risk_level(recommended_pct);

        let warning = if risk_level == RiskLevel::High {
            Some(format!("high slippage environment for {pair}"))
        } else {
            match user_slippage_pct {
                Some(user) if user < recommended_pct => Some(format!(
                    "requested tolerance {user}% is below the recommended {recommended_pct}%"
                )),
                _ => None,
            }
        };

        let breakdown: BTreeMap<String, Decimal> = [
            ("volatility".to_string(), volatility),
            ("liquidity".to_string(), liquidity),
            ("size".to_string(), size),
        ]
        .into_iter()
        .collect();

        Ok(SlippageAssessment {
            recommended_pct,
            breakdown,
            confidence: if known { dec!(90) } else { dec!(60) },
            risk_level,
            warning,
        })
    }

    async fn validate(&self, check: SlippageCheck) -> anyhow::Result<SlippageValidation> {
        self.validations.fetch_add(1, Ordering::Relaxed);

        if check.expected_amount_out <= Decimal::ZERO {
            self.rejections.fetch_add(1, Ordering::Relaxed);
            return Ok(SlippageValidation {
                valid: false,
                message: Some("non-positive expected amount".to_string()),
            });
        }

        let implied_pct = ((check.expected_amount_out - check.actual_amount_out)
            / check.expected_amount_out
            * dec!(100))
        .round_dp(2);

        if implied_pct > check.max_slippage_pct {
            self.rejections.fetch_add(1, Ordering::Relaxed);
            return Ok(SlippageValidation {
                valid: false,
                message: Some(format!(
                    "slippage {implied_pct}% exceeds maximum {}%",
                    check.max_slippage_pct
                )),
            });
        }

        Ok(SlippageValidation {
            valid: true,
            message: None,
        })
    }

    fn stats(&self) -> serde_json::Value {
        json!({
            "calculations": self.calculations.load(Ordering::Relaxed),
            "validations": self.validations.load(Ordering::Relaxed),
            "rejections": self.rejections.load(Ordering::Relaxed),
        })
    }
}
