//! Orchestration core of the swap execution safety gateway.
//!
//! A raw swap intent enters through the validator and traverses one of two
//! ordered pipelines:
//!
//!   • `QuotePipeline`: validate → slippage + price (concurrent) → quote
//!   • `ExecutePipeline`: validate → MEV gate → fresh price → slippage
//!                        validation → single ledger commit
//!
//! Every stage may short-circuit to exactly one terminal error from the
//! taxonomy in `error`; the formatter in `response` maps each terminal
//! outcome to the uniform external shape. No stage retries, and no state is
//! mutated before the final commit point.

pub mod amounts;
pub mod call;
pub mod error;
pub mod execute;
pub mod quote;
pub mod request;
pub mod response;
pub mod validate;

pub use call::CallTimeouts;
pub use error::{GatewayError, PipelineKind};
pub use execute::{ExecutePipeline, ExecutionRecord, TxIdGenerator, UuidTxIds};
pub use quote::{Quote, QuotePipeline};
pub use request::{RawSwapRequest, SwapRequest};
