//! Endpoint handlers.
//!
//! Transport-agnostic: each handler takes a JSON body and returns an
//! `HttpReply` any server (or the CLI) can mount verbatim.

use std::sync::Arc;

use serde_json::{Value, json};

use guards::{MevGuard, PriceOracle, SlippageGuard};
use ledger::SqliteSwapLedger;
use pipeline::response::{self, HttpReply};
use pipeline::validate::FieldError;
use pipeline::{ExecutePipeline, GatewayError, PipelineKind, QuotePipeline, RawSwapRequest, UuidTxIds};

use crate::config::AppConfig;
use crate::sim::{SimMevGuard, SimPriceOracle, SimSlippageGuard};

pub struct Gateway {
    oracle: Arc<SimPriceOracle>,
    slippage: Arc<SimSlippageGuard>,
    mev: Arc<SimMevGuard>,
    quote: QuotePipeline<SimPriceOracle, SimSlippageGuard>,
    execute: ExecutePipeline<SimMevGuard, SimPriceOracle, SimSlippageGuard, SqliteSwapLedger, UuidTxIds>,
}

impl Gateway {
    /// Open the ledger at the configured url and wire both pipelines with
    /// the reference collaborators.
    pub async fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let ledger = Arc::new(SqliteSwapLedger::new(&config.database_url).await?);
        Ok(Self::with_ledger(config, ledger))
    }

    pub fn with_ledger(config: &AppConfig, ledger: Arc<SqliteSwapLedger>) -> Self {
        let oracle = Arc::new(SimPriceOracle::with_default_feeds());
        let slippage = Arc::new(SimSlippageGuard::with_default_profiles());
        let mev = Arc::new(SimMevGuard::new(
            std::time::Duration::from_millis(config.mev_rate_window_ms),
            config.mev_max_submissions_per_window,
            config.mev_large_trade_amount,
            config.mev_loose_tolerance_pct,
        ));
        let timeouts = config.call_timeouts();

        Self {
            quote: QuotePipeline::new(oracle.clone(), slippage.clone(), timeouts),
            execute: ExecutePipeline::new(
                mev.clone(),
                oracle.clone(),
                slippage.clone(),
                ledger,
                Arc::new(UuidTxIds),
                timeouts,
            ),
            oracle,
            slippage,
            mev,
        }
    }

    pub async fn handle_quote(&self, body: Value) -> HttpReply {
        let raw = match parse_body(body) {
            Ok(raw) => raw,
            Err(err) => return response::failure(PipelineKind::Quote, &err),
        };

        match self.quote.run(&raw).await {
            Ok(out) => response::success(&out.quote, &out.metadata),
            Err(err) => response::failure(PipelineKind::Quote, &err),
        }
    }

    pub async fn handle_execute(&self, body: Value) -> HttpReply {
        let raw = match parse_body(body) {
            Ok(raw) => raw,
            Err(err) => return response::failure(PipelineKind::Execute, &err),
        };

        match self.execute.run(&raw).await {
            Ok(out) => response::success(&out.record, &out.metadata),
            Err(err) => response::failure(PipelineKind::Execute, &err),
        }
    }

    pub fn handle_security_stats(&self) -> HttpReply {
        HttpReply {
            status: 200,
            body: json!({
                "success": true,
                "data": {
                    "mev": self.mev.stats(),
                    "slippage": self.slippage.stats(),
                    "oracle": self.oracle.stats(),
                    "timestamp": chrono::Utc::now().to_rfc3339(),
                },
            }),
        }
    }
}

/// Field-level errors come from the validator; this only rejects bodies that
/// are not a JSON object at all.
fn parse_body(body: Value) -> Result<RawSwapRequest, GatewayError> {
    serde_json::from_value(body).map_err(|e| {
        GatewayError::Validation(vec![FieldError::invalid(
            "body",
            format!("request body is not a swap request: {e}"),
        )])
    })
}
