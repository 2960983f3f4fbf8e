//! Static multi-feed price consensus.
//!
//! Each covered pair has a fixed set of named feeds. One consensus round
//! takes the median feed price, measures the worst relative deviation from
//! it, and refuses the round when the feeds disagree by more than the
//! configured bound.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;

use guards::{PriceOracle, PriceQuote};

#[derive(Debug, Clone)]
pub struct Feed {
    pub source: &'static str,
    pub price: Decimal,
}

pub struct SimPriceOracle {
    feeds: HashMap<String, Vec<Feed>>,
    /// Worst tolerated feed deviation from the median, in percent.
    max_deviation_pct: Decimal,
    requests: AtomicU64,
    consensus_failures: AtomicU64,
}

fn feed(source: &'static str, price: Decimal) -> Feed {
    Feed { source, price }
}

impl SimPriceOracle {
    pub fn new(feeds: HashMap<String, Vec<Feed>>, max_deviation_pct: Decimal) -> Self {
        Self {
            feeds,
            max_deviation_pct,
            requests: AtomicU64::new(0),
            consensus_failures: AtomicU64::new(0),
        }
    }

    /// Fixed coverage used by the reference wiring. VOLA/USDC deliberately
    /// carries disagreeing feeds so the consensus-failure path is reachable.
    pub fn with_default_feeds() -> Self {
        let mut feeds = HashMap::new();
        feeds.insert(
            "ETH/USDC".to_string(),
            vec![
                feed("chainlink", dec!(3000.00)),
                feed("uniswap", dec!(2999.25)),
                feed("band", dec!(3001.50)),
            ],
        );
        feeds.insert(
            "BTC/USDC".to_string(),
            vec![
                feed("chainlink", dec!(64120.00)),
                feed("uniswap", dec!(64098.50)),
                feed("band", dec!(64160.00)),
            ],
        );
        feeds.insert(
            "SOL/USDC".to_string(),
            vec![
                feed("chainlink", dec!(148.20)),
                feed("uniswap", dec!(147.95)),
                feed("band", dec!(148.40)),
            ],
        );
        feeds.insert(
            "USDC/DAI".to_string(),
            vec![
                feed("chainlink", dec!(1.0002)),
                feed("uniswap", dec!(0.9999)),
                feed("band", dec!(1.0001)),
            ],
        );
        feeds.insert(
            "VOLA/USDC".to_string(),
            vec![
                feed("chainlink", dec!(10.00)),
                feed("uniswap", dec!(12.50)),
                feed("band", dec!(9.40)),
            ],
        );

        Self::new(feeds, dec!(2.0))
    }

    fn consensus(&self, feeds: &[Feed]) -> PriceQuote {
        let mut prices: Vec<Decimal> = feeds.iter().map(|f| f.price).collect();
        prices.sort();

        let n = prices.len();
        let median = if n % 2 == 1 {
            prices[n / 2]
        } else {
            (prices[n / 2 - 1] + prices[n / 2]) / dec!(2)
        };

        let deviation = prices
            .iter()
            .map(|p| ((*p - median).abs() / median * dec!(100)).round_dp(4))
            .max()
            .unwrap_or(Decimal::ZERO);

        let sources: Vec<String> = feeds.iter().map(|f| f.source.to_string()).collect();

        if deviation > self.max_deviation_pct {
            self.consensus_failures.fetch_add(1, Ordering::Relaxed);
            return PriceQuote::invalid(format!(
                "feeds disagree: {deviation}% deviation exceeds {}%",
                self.max_deviation_pct
            ));
        }

        let confidence = (dec!(100) - deviation * dec!(15)).clamp(Decimal::ZERO, dec!(100));

        PriceQuote {
            price: median,
            valid: true,
            confidence: confidence.round_dp(2),
            deviation,
            sources,
            reason: None,
        }
    }
}

#[async_trait]
impl PriceOracle for SimPriceOracle {
    async fn get_price(&self, token_in: &str, token_out: &str) -> anyhow::Result<PriceQuote> {
        self.requests.fetch_add(1, Ordering::Relaxed);

        let pair = format!("{token_in}/{token_out}");
        match self.feeds.get(&pair) {
            Some(feeds) => Ok(self.consensus(feeds)),
            None => {
                self.consensus_failures.fetch_add(1, Ordering::Relaxed);
                Ok(PriceQuote::invalid(format!("no feed coverage for {pair}")))
            }
        }
    }

    fn stats(&self) -> serde_json::Value {
        json!({
            "requests": self.requests.load(Ordering::Relaxed),
            "consensusFailures": self.consensus_failures.load(Ordering::Relaxed),
            "pairsCovered": self.feeds.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn covered_pair_reaches_consensus_on_the_median() {
        let oracle = SimPriceOracle::with_default_feeds();
        let quote = oracle.get_price("ETH", "USDC").await.unwrap();

        assert!(quote.valid);
        assert_eq!(quote.price, dec!(3000.00));
        assert_eq!(quote.sources.len(), 3);
        assert!(quote.confidence > dec!(90));
        assert!(quote.deviation < dec!(0.1));
    }

    #[tokio::test]
    async fn disagreeing_feeds_fail_consensus_with_reason() {
        let oracle = SimPriceOracle::with_default_feeds();
        let quote = oracle.get_price("VOLA", "USDC").await.unwrap();

        assert!(!quote.valid);
        assert!(quote.reason.unwrap().contains("feeds disagree"));
    }

    #[tokio::test]
    async fn uncovered_pair_is_a_soft_failure() {
        let oracle = SimPriceOracle::with_default_feeds();
        let quote = oracle.get_price("ETH", "XYZ").await.unwrap();

        assert!(!quote.valid);
        assert_eq!(quote.reason.unwrap(), "no feed coverage for ETH/XYZ");
    }

    #[tokio::test]
    async fn stats_count_requests_and_failures() {
        let oracle = SimPriceOracle::with_default_feeds();
        let _ = oracle.get_price("ETH", "USDC").await.unwrap();
        let _ = oracle.get_price("ETH", "XYZ").await.unwrap();

        let stats = oracle.stats();
        assert_eq!(stats["requests"], 2);
        assert_eq!(stats["consensusFailures"], 1);
    }
}
