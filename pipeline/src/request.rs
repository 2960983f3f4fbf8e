use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

/// Inbound swap intent exactly as the caller sent it.
///
/// Amount-like fields stay as raw JSON values here so the validator can
/// accept both string and number encodings and report a field-level error
/// instead of a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawSwapRequest {
    pub token_in: Option<String>,
    pub token_out: Option<String>,
    pub amount_in: Option<Value>,
    pub user_slippage: Option<Value>,
    pub from: Option<String>,
    pub min_amount_out: Option<Value>,
    pub max_slippage: Option<Value>,
    pub gas_price: Option<Value>,
    pub priority_fee: Option<Value>,
}

/// Normalized swap intent produced by the validator.
///
/// Invariants: `token_in != token_out`, `amount_in > 0`, every optional
/// decimal parsed and range-checked. For execution requests `from` is
/// guaranteed present.
#[derive(Debug, Clone, PartialEq)]
pub struct SwapRequest {
    pub token_in: String,
    pub token_out: String,
    pub amount_in: Decimal,
    pub user_slippage_pct: Option<Decimal>,
    pub from: Option<String>,
    pub min_amount_out: Option<Decimal>,
    pub max_slippage_pct: Option<Decimal>,
    pub gas_price: Option<Decimal>,
    pub priority_fee: Option<Decimal>,
}
