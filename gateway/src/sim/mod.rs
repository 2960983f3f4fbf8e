//! Reference collaborator implementations.
//!
//! These stand in for the real consensus/detection subsystems so the gateway
//! is runnable end to end: a static multi-feed price table, an adaptive
//! slippage model over per-pair market profiles, and a heuristic MEV screen.
//! They honor the collaborator contracts (soft failures are values, every
//! implementation keeps the counters surfaced by the stats endpoint) but make
//! no claim to real consensus or detection quality.

pub mod mev;
pub mod oracle;
pub mod slippage;

pub use mev::SimMevGuard;
pub use oracle::SimPriceOracle;
pub use slippage::SimSlippageGuard;
