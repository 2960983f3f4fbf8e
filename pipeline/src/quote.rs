//! Quote pipeline.
//!
//! Stages: Validating → ComputingSlippage + FetchingPrice (concurrent) →
//! Deciding → Done | Failed. A quote is non-binding: it reserves no
//! liquidity and locks no price, and the execute pipeline re-derives both.

use std::collections::BTreeMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use tracing::{Instrument, error, info, warn};

use common::ids::CorrelationId;
use common::logger::pipeline_span;
use common::time::now_ms;
use guards::{PriceOracle, RiskLevel, SlippageAssessment, SlippageGuard};

use crate::amounts::{floor_for_tolerance, round_amount};
use crate::call::{CallError, CallTimeouts, bounded};
use crate::error::GatewayError;
use crate::request::{RawSwapRequest, SwapRequest};
use crate::validate::{ValidationMode, validate};

/// Tolerance applied when the guard produces no usable recommendation.
pub const DEFAULT_QUOTE_SLIPPAGE_PCT: Decimal = dec!(0.5);

/// Quotes priced below this confidence carry an advisory warning.
pub const LOW_CONFIDENCE_WARNING_BELOW: Decimal = dec!(70);

/// Verified price quote. Immutable once returned.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub token_in: String,
    pub token_out: String,
    pub amount_in: Decimal,
    pub expected_amount_out: Decimal,
    pub min_amount_out: Decimal,
    pub price: Decimal,
    /// Effective tolerance in percent.
    pub slippage: Decimal,
    pub route: Vec<String>,
    pub execution_time: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlippageMeta {
    pub breakdown: BTreeMap<String, Decimal>,
    pub confidence: Decimal,
    pub risk_level: RiskLevel,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceMeta {
    pub confidence: Decimal,
    pub deviation: Decimal,
    pub sources: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteMetadata {
    pub slippage: SlippageMeta,
    pub price: PriceMeta,
    /// Advisory only; warnings never change the verdict.
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct QuoteSuccess {
    pub quote: Quote,
    pub metadata: QuoteMetadata,
}

/// Tolerance precedence: the guard's recommendation when positive, else the
/// named default. User preference already participated upstream as an input
/// to `calculate_optimal`.
pub fn effective_slippage(assessment: &SlippageAssessment) -> Decimal {
    if assessment.recommended_pct > Decimal::ZERO {
        assessment.recommended_pct
    } else {
        DEFAULT_QUOTE_SLIPPAGE_PCT
    }
}

/// Composes the validator, the slippage guard, and the price oracle into a
/// verified quote.
pub struct QuotePipeline<P, S> {
    oracle: Arc<P>,
    slippage: Arc<S>,
    timeouts: CallTimeouts,
}

impl<P: PriceOracle, S: SlippageGuard> QuotePipeline<P, S> {
    pub fn new(oracle: Arc<P>, slippage: Arc<S>, timeouts: CallTimeouts) -> Self {
        Self {
            oracle,
            slippage,
            timeouts,
        }
    }

    pub async fn run(&self, raw: &RawSwapRequest) -> Result<QuoteSuccess, GatewayError> {
        let req = validate(raw, ValidationMode::Quote).map_err(GatewayError::Validation)?;

        let correlation_id = CorrelationId::new();
        let span = pipeline_span("quote", &correlation_id);
        self.run_validated(req).instrument(span).await
    }

    async fn run_validated(&self, req: SwapRequest) -> Result<QuoteSuccess, GatewayError> {
        // The two calls are independent; issue them concurrently and await
        // both before deciding.
        let slippage_fut = bounded(
            "slippage_guard",
            self.timeouts.slippage,
            self.slippage.calculate_optimal(
                &req.token_in,
                &req.token_out,
                req.amount_in,
                req.user_slippage_pct,
            ),
        );
        let price_fut = bounded(
            "price_oracle",
            self.timeouts.oracle,
            self.oracle.get_price(&req.token_in, &req.token_out),
        );

        let (assessment, price) = tokio::join!(slippage_fut, price_fut);

        let assessment = assessment.map_err(|e| internal(&req, "slippage computation", e))?;
        let price = price.map_err(|e| internal(&req, "price consensus", e))?;

        if !price.valid {
            let reason = price
                .reason
                .unwrap_or_else(|| "consensus not reached".to_string());
            warn!(
                token_in = %req.token_in,
                token_out = %req.token_out,
                %reason,
                "quote refused: price unavailable"
            );
            return Err(GatewayError::PriceUnavailable { reason });
        }
        if price.price <= Decimal::ZERO {
            // Same guard as at execution: a consensus round that nominally
            // succeeded with a non-positive price cannot back a quote.
            return Err(GatewayError::PriceUnavailable {
                reason: "non-positive consensus price".into(),
            });
        }

        let expected_amount_out = round_amount(req.amount_in * price.price);
        let slippage_pct = effective_slippage(&assessment);
        let min_amount_out = floor_for_tolerance(expected_amount_out, slippage_pct);

        let mut warnings = Vec::new();
        if let Some(w) = &assessment.warning {
            warnings.push(w.clone());
        }
        if price.confidence < LOW_CONFIDENCE_WARNING_BELOW {
            warnings.push(format!(
                "price confidence {} is below {}",
                price.confidence, LOW_CONFIDENCE_WARNING_BELOW
            ));
        }

        info!(
            token_in = %req.token_in,
            token_out = %req.token_out,
            amount_in = %req.amount_in,
            price = %price.price,
            slippage_pct = %slippage_pct,
            confidence = %price.confidence,
            "quote assembled"
        );

        Ok(QuoteSuccess {
            quote: Quote {
                route: vec![req.token_in.clone(), req.token_out.clone()],
                token_in: req.token_in,
                token_out: req.token_out,
                amount_in: req.amount_in,
                expected_amount_out,
                min_amount_out,
                price: price.price,
                slippage: slippage_pct,
                execution_time: now_ms(),
            },
            metadata: QuoteMetadata {
                slippage: SlippageMeta {
                    breakdown: assessment.breakdown,
                    confidence: assessment.confidence,
                    risk_level: assessment.risk_level,
                },
                price: PriceMeta {
                    confidence: price.confidence,
                    deviation: price.deviation,
                    sources: price.sources,
                },
                warnings,
            },
        })
    }
}

/// Both timeout and hard collaborator failure terminate a quote as
/// `Internal`; the distinction only matters in the logs.
fn internal(req: &SwapRequest, stage: &'static str, err: CallError) -> GatewayError {
    error!(
        token_in = %req.token_in,
        token_out = %req.token_out,
        amount_in = %req.amount_in,
        error = %err,
        "quote stage failed"
    );
    GatewayError::Internal(format!("{stage} unavailable"))
}
