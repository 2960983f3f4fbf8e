//! Heuristic MEV screen.
//!
//! Two checks, both cheap and local:
//! - per-address submission rate over a sliding window; bursts are refused
//!   as probable front-running probes
//! - large trades submitted with a loose tolerance are refused as sandwich
//!   bait; large trades with a tight tolerance pass with a warning

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::json;

use guards::{AttackType, MevAssessment, MevGuard, TxContext};

pub struct SimMevGuard {
    rate_window: Duration,
    max_submissions_per_window: usize,
    large_trade_amount: Decimal,
    loose_tolerance_pct: Decimal,
    /// Submission timestamps per address, pruned to the window on each call.
    submissions: tokio::sync::Mutex<HashMap<String, VecDeque<u64>>>,
    screened: AtomicU64,
    blocked_front_run: AtomicU64,
    blocked_sandwich: AtomicU64,
}

impl SimMevGuard {
    pub fn new(
        rate_window: Duration,
        max_submissions_per_window: usize,
        large_trade_amount: Decimal,
        loose_tolerance_pct: Decimal,
    ) -> Self {
        Self {
            rate_window,
            max_submissions_per_window,
            large_trade_amount,
            loose_tolerance_pct,
            submissions: tokio::sync::Mutex::new(HashMap::new()),
            screened: AtomicU64::new(0),
            blocked_front_run: AtomicU64::new(0),
            blocked_sandwich: AtomicU64::new(0),
        }
    }

    async fn submission_count(&self, from: &str, now_ms: u64) -> usize {
        let window_ms = self.rate_window.as_millis() as u64;
        let mut submissions = self.submissions.lock().await;
        let times = submissions.entry(from.to_string()).or_default();

        while times
            .front()
            .is_some_and(|t| t.saturating_add(window_ms) <= now_ms)
        {
            times.pop_front();
        }
        times.push_back(now_ms);

        times.len()
    }
}

#[async_trait]
impl MevGuard for SimMevGuard {
    async fn protect(&self, ctx: &TxContext) -> anyhow::Result<MevAssessment> {
        self.screened.fetch_add(1, Ordering::Relaxed);

        let recent = self.submission_count(&ctx.from, ctx.timestamp_ms).await;
        if recent > self.max_submissions_per_window {
            self.blocked_front_run.fetch_add(1, Ordering::Relaxed);
            return Ok(MevAssessment::blocked(
                format!(
                    "{recent} submissions in {}ms exceeds the allowed {}",
                    self.rate_window.as_millis(),
                    self.max_submissions_per_window
                ),
                Some(AttackType::FrontRun),
            ));
        }

        let large = ctx.amount_in >= self.large_trade_amount;
        if large && ctx.slippage_tolerance_pct >= self.loose_tolerance_pct {
            self.blocked_sandwich.fetch_add(1, Ordering::Relaxed);
            return Ok(MevAssessment::blocked(
                format!(
                    "sandwich pattern detected: {} {} at {}% tolerance",
                    ctx.amount_in, ctx.token_in, ctx.slippage_tolerance_pct
                ),
                Some(AttackType::Sandwich),
            ));
        }

        let mut assessment = MevAssessment::clear();
        if large {
            assessment.warning =
                Some("large trade is attractive to searchers; consider splitting".to_string());
        }
        Ok(assessment)
    }

    fn stats(&self) -> serde_json::Value {
        json!({
            "screened": self.screened.load(Ordering::Relaxed),
            "blocked": {
                "frontRun": self.blocked_front_run.load(Ordering::Relaxed),
                "sandwich": self.blocked_sandwich.load(Ordering::Relaxed),
            },
        })
    }
}
