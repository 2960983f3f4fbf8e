//! Execute pipeline.
//!
//! Stages: Validating → MEVScreening → PriceVerifying → SlippageValidating →
//! Committing → Done | Blocked | Failed.
//!
//! Ordering is deliberate:
//! - MEV screening runs first so a blocked transaction never spends oracle
//!   or slippage budget. It is a hard gate: on `blocked` nothing further
//!   runs and nothing is recorded.
//! - The price is re-fetched rather than trusted from any earlier quote,
//!   closing the time-of-check/time-of-use gap.
//! - Slippage validation needs the fresh expected amount, so it runs after
//!   price verification.
//! - The ledger append is the single mutation point, reached only after
//!   every gate has passed, and attempted at most once per run.

use std::sync::Arc;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use tracing::{Instrument, error, info, warn};
use uuid::Uuid;

use common::ids::CorrelationId;
use common::logger::pipeline_span;
use common::time::now_ms;
use guards::{MevGuard, PriceOracle, SlippageCheck, SlippageGuard, TxContext};
use ledger::{LedgerEntry, SwapLedger};

use crate::amounts::{floor_for_tolerance, implied_slippage_pct, round_amount};
use crate::call::{CallError, CallTimeouts, bounded};
use crate::error::GatewayError;
use crate::request::{RawSwapRequest, SwapRequest};
use crate::validate::{ValidationMode, validate};

/// Tolerance assumed when the caller supplies neither a floor nor a maximum.
pub const DEFAULT_EXECUTE_TOLERANCE_PCT: Decimal = dec!(5.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SwapStatus {
    Pending,
    Confirmed,
    Failed,
}

/// Result of a swap attempt that has passed all safety gates, pending
/// settlement.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRecord {
    pub hash: String,
    pub status: SwapStatus,
    pub token_in: String,
    pub token_out: String,
    pub amount_in: Decimal,
    pub expected_amount_out: Decimal,
    pub min_amount_out: Decimal,
    /// Tolerance applied at execution, in percent.
    pub slippage: Decimal,
    pub price: Decimal,
    pub from: String,
    #[serde(rename = "timestamp")]
    pub timestamp_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority_fee: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mev_warning: Option<String>,
    pub price_confidence: Decimal,
    pub slippage_valid: bool,
    pub protection_applied: bool,
}

#[derive(Debug, Clone)]
pub struct ExecuteSuccess {
    pub record: ExecutionRecord,
    pub metadata: ExecuteMetadata,
}

/// Source of execution identifiers.
///
/// Injectable so tests are reproducible. The uuid-backed implementation is
/// a simulation placeholder; with real settlement the hash would come from
/// chain submission.
pub trait TxIdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

pub struct UuidTxIds;

impl TxIdGenerator for UuidTxIds {
    fn next_id(&self) -> String {
        format!(
            "0x{}{}",
            Uuid::new_v4().simple(),
            Uuid::new_v4().simple()
        )
    }
}

/// Composes validator, MEV screen, oracle, slippage guard, and ledger into
/// a protected execution.
pub struct ExecutePipeline<M, P, S, L, G> {
    mev: Arc<M>,
    oracle: Arc<P>,
    slippage: Arc<S>,
    ledger: Arc<L>,
    tx_ids: Arc<G>,
    timeouts: CallTimeouts,
}

impl<M, P, S, L, G> ExecutePipeline<M, P, S, L, G>
where
    M: MevGuard,
    P: PriceOracle,
    S: SlippageGuard,
    L: SwapLedger,
    G: TxIdGenerator,
{
    pub fn new(
        mev: Arc<M>,
        oracle: Arc<P>,
        slippage: Arc<S>,
        ledger: Arc<L>,
        tx_ids: Arc<G>,
        timeouts: CallTimeouts,
    ) -> Self {
        Self {
            mev,
            oracle,
            slippage,
            ledger,
            tx_ids,
            timeouts,
        }
    }

    pub async fn run(&self, raw: &RawSwapRequest) -> Result<ExecuteSuccess, GatewayError> {
        let req = validate(raw, ValidationMode::Execute).map_err(GatewayError::Validation)?;

        let correlation_id = CorrelationId::new();
        let span = pipeline_span("execute_swap", &correlation_id);
        self.run_validated(req, correlation_id).instrument(span).await
    }

    async fn run_validated(
        &self,
        req: SwapRequest,
        correlation_id: CorrelationId,
    ) -> Result<ExecuteSuccess, GatewayError> {
        let from = req
            .from
            .clone()
            .ok_or_else(|| GatewayError::Internal("validated request lost sender".into()))?;

        let tolerance_pct = req
            .max_slippage_pct
            .unwrap_or(DEFAULT_EXECUTE_TOLERANCE_PCT);

        let ctx = TxContext {
            token_in: req.token_in.clone(),
            token_out: req.token_out.clone(),
            amount_in: req.amount_in,
            slippage_tolerance_pct: tolerance_pct,
            from: from.clone(),
            timestamp_ms: now_ms(),
            kind: "swap",
        };

        // ---- MEV hard gate ----
        let mev = match bounded("mev_guard", self.timeouts.mev, self.mev.protect(&ctx)).await {
            Ok(v) => v,
            Err(CallError::TimedOut(_)) => {
                // The gate never degrades open.
                warn!(pair = %ctx.pair_id(), from = %from, "mev screen timed out; failing closed");
                return Err(GatewayError::MevBlocked {
                    reason: "mev screening unavailable".into(),
                    attack_type: None,
                });
            }
            Err(err @ CallError::Failed { .. }) => {
                error!(pair = %ctx.pair_id(), from = %from, error = %err, "mev screen failed");
                return Err(GatewayError::Internal("mev screening failed".into()));
            }
        };

        if mev.blocked {
            let reason = mev
                .reason
                .unwrap_or_else(|| "attack pattern detected".to_string());
            warn!(
                pair = %ctx.pair_id(),
                from = %from,
                amount_in = %req.amount_in,
                attack_type = ?mev.attack_type,
                %reason,
                "execution blocked by mev screen"
            );
            return Err(GatewayError::MevBlocked {
                reason,
                attack_type: mev.attack_type,
            });
        }

        // ---- Fresh price verification ----
        let price = match bounded(
            "price_oracle",
            self.timeouts.oracle,
            self.oracle.get_price(&req.token_in, &req.token_out),
        )
        .await
        {
            Ok(p) => p,
            Err(CallError::TimedOut(_)) => {
                warn!(pair = %ctx.pair_id(), "price oracle timed out at execution");
                return Err(GatewayError::PriceUnavailable {
                    reason: "price oracle timed out".into(),
                });
            }
            Err(err @ CallError::Failed { .. }) => {
                error!(pair = %ctx.pair_id(), error = %err, "price verification failed");
                return Err(GatewayError::Internal("price verification failed".into()));
            }
        };

        if !price.valid {
            return Err(GatewayError::PriceUnavailable {
                reason: price
                    .reason
                    .unwrap_or_else(|| "consensus not reached".to_string()),
            });
        }
        if price.price <= Decimal::ZERO {
            return Err(GatewayError::PriceUnavailable {
                reason: "non-positive consensus price".into(),
            });
        }

        let expected_amount_out = round_amount(req.amount_in * price.price);
        if expected_amount_out <= Decimal::ZERO {
            // Dust only surfaces once the fresh price is known, so this is a
            // tolerance failure, not an input problem: no floor can hold when
            // the output rounds to nothing.
            return Err(GatewayError::SlippageExceeded(
                "expected output rounds to zero at 8 decimal places".into(),
            ));
        }

        // ---- Slippage validation ----
        let (floor, slippage_pct) = match req.min_amount_out {
            Some(min_out) => (min_out, implied_slippage_pct(expected_amount_out, min_out)),
            None => (
                floor_for_tolerance(expected_amount_out, tolerance_pct),
                tolerance_pct,
            ),
        };

        let check = SlippageCheck {
            expected_amount_out,
            actual_amount_out: floor,
            max_slippage_pct: tolerance_pct,
            correlation_id: correlation_id.to_string(),
        };

        let verdict = match bounded(
            "slippage_guard",
            self.timeouts.slippage,
            self.slippage.validate(check),
        )
        .await
        {
            Ok(v) => v,
            Err(err) => {
                error!(pair = %ctx.pair_id(), error = %err, "slippage validation failed");
                return Err(GatewayError::Internal("slippage validation failed".into()));
            }
        };

        if !verdict.valid {
            let message = verdict
                .message
                .unwrap_or_else(|| "slippage tolerance exceeded".to_string());
            warn!(
                pair = %ctx.pair_id(),
                expected = %expected_amount_out,
                floor = %floor,
                tolerance_pct = %tolerance_pct,
                %message,
                "execution refused: slippage"
            );
            return Err(GatewayError::SlippageExceeded(message));
        }

        // ---- Commit (single mutation point) ----
        let hash = self.tx_ids.next_id();
        let timestamp_ms = now_ms();

        let entry = LedgerEntry {
            token_in: req.token_in.clone(),
            token_out: req.token_out.clone(),
            amount_in: req.amount_in,
            amount_out: expected_amount_out,
            timestamp_ms,
            tx_hash: hash.clone(),
            from: from.clone(),
        };

        bounded("swap_ledger", self.timeouts.ledger, self.ledger.record(&entry))
            .await
            .map_err(|err| {
                error!(pair = %ctx.pair_id(), %hash, error = %err, "ledger append failed");
                GatewayError::Internal("ledger append failed".into())
            })?;

        info!(
            pair = %ctx.pair_id(),
            %hash,
            amount_in = %req.amount_in,
            expected = %expected_amount_out,
            floor = %floor,
            from = %from,
            "swap accepted and recorded"
        );

        Ok(ExecuteSuccess {
            record: ExecutionRecord {
                hash,
                status: SwapStatus::Pending,
                token_in: req.token_in,
                token_out: req.token_out,
                amount_in: req.amount_in,
                expected_amount_out,
                min_amount_out: floor,
                slippage: slippage_pct,
                price: price.price,
                from,
                timestamp_ms,
                gas_price: req.gas_price,
                priority_fee: req.priority_fee,
            },
            metadata: ExecuteMetadata {
                mev_warning: mev.warning,
                price_confidence: price.confidence,
                slippage_valid: true,
                protection_applied: true,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuid_tx_ids_look_like_hashes() {
        let ids = UuidTxIds;
        let id = ids.next_id();
        assert!(id.starts_with("0x"));
        assert_eq!(id.len(), 2 + 64);
        assert!(id[2..].bytes().all(|b| b.is_ascii_hexdigit()));
        assert_ne!(ids.next_id(), id);
    }
}
