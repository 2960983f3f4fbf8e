//! Collaborator seam for the swap safety gateway.
//!
//! This crate defines the verdict types and the async traits the pipelines
//! depend on:
//!   • `PriceOracle`: multi-feed price consensus
//!   • `SlippageGuard`: adaptive slippage recommendation and validation
//!   • `MevGuard`: front-running / sandwich screening
//!
//! The traits deliberately hide how each layer reaches its verdict. Soft
//! failures (consensus not reached, trade blocked) are values, not errors;
//! an `Err` from any trait method means the collaborator itself broke.

pub mod mev;
pub mod oracle;
pub mod slippage;
pub mod types;

pub use mev::{MevAssessment, MevGuard};
pub use oracle::{PriceOracle, PriceQuote};
pub use slippage::{SlippageAssessment, SlippageCheck, SlippageGuard, SlippageValidation};
pub use types::{AttackType, RiskLevel, TxContext};
