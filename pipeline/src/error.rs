//! Terminal outcomes of a pipeline run.
//!
//! Every failure a caller can observe is one of these kinds; collaborator
//! soft verdicts (`valid:false`, `blocked:true`) are translated into the
//! matching kind, and unexpected collaborator failures are logged at the
//! boundary and surfaced as `Internal` with a caller-safe message only.

use thiserror::Error;

use guards::AttackType;

use crate::validate::{FieldError, FieldErrorKind};

#[derive(Debug, Error)]
pub enum GatewayError {
    /// Malformed or missing input. Detected before any collaborator call.
    #[error("request validation failed")]
    Validation(Vec<FieldError>),

    /// Oracle consensus could not be reached; retry later.
    #[error("price consensus unavailable: {reason}")]
    PriceUnavailable { reason: String },

    /// The MEV hard gate triggered. Nothing was recorded.
    #[error("blocked by mev screening: {reason}")]
    MevBlocked {
        reason: String,
        attack_type: Option<AttackType>,
    },

    /// Execution-time tolerance violated.
    #[error("slippage tolerance violated: {0}")]
    SlippageExceeded(String),

    /// Unexpected collaborator or internal failure. The message is
    /// caller-safe; diagnostics stay in the logs.
    #[error("{0}")]
    Internal(String),
}

/// Which pipeline produced the outcome. The external code vocabulary
/// differs between the two endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineKind {
    Quote,
    Execute,
}

impl GatewayError {
    pub fn http_status(&self) -> u16 {
        match self {
            GatewayError::Validation(_) => 400,
            GatewayError::PriceUnavailable { .. } => 503,
            GatewayError::MevBlocked { .. } => 403,
            GatewayError::SlippageExceeded(_) => 400,
            GatewayError::Internal(_) => 500,
        }
    }

    /// Stable external error code for this outcome.
    pub fn code(&self, kind: PipelineKind) -> &'static str {
        match (self, kind) {
            (GatewayError::Validation(_), PipelineKind::Quote) => "VALIDATION_ERROR",
            (GatewayError::Validation(errors), PipelineKind::Execute) => {
                if errors.iter().any(|e| e.kind == FieldErrorKind::Missing) {
                    "MISSING_PARAMS"
                } else {
                    "INVALID_AMOUNT"
                }
            }
            (GatewayError::PriceUnavailable { .. }, _) => "PRICE_UNAVAILABLE",
            (GatewayError::MevBlocked { .. }, _) => "MEV_PROTECTION_BLOCK",
            (GatewayError::SlippageExceeded(_), _) => "SLIPPAGE_EXCEEDED",
            (GatewayError::Internal(_), PipelineKind::Quote) => "QUOTE_ERROR",
            (GatewayError::Internal(_), PipelineKind::Execute) => "SWAP_EXECUTE_ERROR",
        }
    }
}
