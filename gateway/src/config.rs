use std::time::Duration;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use pipeline::CallTimeouts;

#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Database connection string for the swap ledger.
    pub database_url: String,

    // =========================
    // Collaborator timeouts
    // =========================
    /// Upper bound (in milliseconds) on one price-consensus round.
    ///
    /// A round that exceeds this is treated as a collaborator failure,
    /// never as an indefinite wait.
    pub oracle_timeout_ms: u64,

    /// Upper bound (in milliseconds) on one slippage-model call
    /// (recommendation or validation).
    pub slippage_timeout_ms: u64,

    /// Upper bound (in milliseconds) on one MEV screening call.
    ///
    /// The screen is a hard gate: on timeout the execution is refused,
    /// it never degrades open.
    pub mev_timeout_ms: u64,

    /// Upper bound (in milliseconds) on one ledger append.
    pub ledger_timeout_ms: u64,

    // =========================
    // MEV screen heuristics
    // =========================
    /// Sliding window (in milliseconds) over which per-address submission
    /// rates are measured.
    pub mev_rate_window_ms: u64,

    /// Maximum submissions one address may make inside the rate window
    /// before further submissions are blocked as probable front-running.
    pub mev_max_submissions_per_window: usize,

    /// Input amount at or above which a trade counts as "large" for the
    /// sandwich-exposure heuristic.
    pub mev_large_trade_amount: Decimal,

    /// Tolerance (percent) at or above which a large trade is refused as
    /// sandwich bait rather than merely warned about.
    pub mev_loose_tolerance_pct: Decimal,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://gateway_dev.db".to_string());

        Self {
            database_url,

            // Timeout defaults: generous for the simulated collaborators,
            // tight enough that a wedged layer cannot stall a request.
            oracle_timeout_ms: env_u64("ORACLE_TIMEOUT_MS", 2_000),
            slippage_timeout_ms: env_u64("SLIPPAGE_TIMEOUT_MS", 2_000),
            mev_timeout_ms: env_u64("MEV_TIMEOUT_MS", 1_000),
            ledger_timeout_ms: env_u64("LEDGER_TIMEOUT_MS", 2_000),

            // Screen defaults: 3 submissions per address per 10s, trades of
            // 10k+ units with a 3%+ tolerance are refused.
            mev_rate_window_ms: env_u64("MEV_RATE_WINDOW_MS", 10_000),
            mev_max_submissions_per_window: env_u64("MEV_MAX_SUBMISSIONS", 3) as usize,
            mev_large_trade_amount: dec!(10_000),
            mev_loose_tolerance_pct: dec!(3.0),
        }
    }

    pub fn call_timeouts(&self) -> CallTimeouts {
        CallTimeouts {
            oracle: Duration::from_millis(self.oracle_timeout_ms),
            slippage: Duration::from_millis(self.slippage_timeout_ms),
            mev: Duration::from_millis(self.mev_timeout_ms),
            ledger: Duration::from_millis(self.ledger_timeout_ms),
        }
    }
}

fn env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
