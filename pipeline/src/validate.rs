//! Request validation.
//!
//! Deliberately pure: no async, no IO, no collaborator calls. Problems are
//! collected as a list of field-level errors so a caller can fix everything
//! in one round trip.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

use crate::request::{RawSwapRequest, SwapRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldErrorKind {
    Missing,
    Invalid,
}

/// One field-level validation problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
    #[serde(skip)]
    pub kind: FieldErrorKind,
}

impl FieldError {
    pub fn missing(field: &'static str) -> Self {
        Self {
            field,
            message: format!("{field} is required"),
            kind: FieldErrorKind::Missing,
        }
    }

    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
            kind: FieldErrorKind::Invalid,
        }
    }
}

/// Which pipeline the request is destined for. Execution additionally
/// requires a sender address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    Quote,
    Execute,
}

/// Token symbols: 2..=10 ASCII uppercase alphanumerics, starting with a letter.
pub fn is_valid_symbol(s: &str) -> bool {
    let bytes = s.as_bytes();
    if !(2..=10).contains(&bytes.len()) {
        return false;
    }
    if !bytes[0].is_ascii_uppercase() {
        return false;
    }
    bytes
        .iter()
        .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}

/// Addresses: `0x` followed by exactly 40 hex digits, any case.
pub fn is_valid_address(s: &str) -> bool {
    let Some(hex) = s.strip_prefix("0x") else {
        return false;
    };
    hex.len() == 40 && hex.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Parse a JSON value (string or number) as a decimal.
fn parse_decimal(v: &Value) -> Option<Decimal> {
    let text = match v {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };

    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

fn require_symbol(
    field: &'static str,
    value: &Option<String>,
    errors: &mut Vec<FieldError>,
) -> Option<String> {
    match value.as_deref() {
        None | Some("") => {
            errors.push(FieldError::missing(field));
            None
        }
        Some(s) if !is_valid_symbol(s) => {
            errors.push(FieldError::invalid(
                field,
                format!("'{s}' is not a valid token symbol"),
            ));
            None
        }
        Some(s) => Some(s.to_string()),
    }
}

fn optional_decimal(
    field: &'static str,
    value: &Option<Value>,
    min_exclusive: Option<Decimal>,
    min_inclusive: Option<Decimal>,
    errors: &mut Vec<FieldError>,
) -> Option<Decimal> {
    let raw = value.as_ref()?;

    let Some(parsed) = parse_decimal(raw) else {
        errors.push(FieldError::invalid(field, format!("{field} must be a number")));
        return None;
    };

    if let Some(min) = min_exclusive {
        if parsed <= min {
            errors.push(FieldError::invalid(
                field,
                format!("{field} must be greater than {min}"),
            ));
            return None;
        }
    }
    if let Some(min) = min_inclusive {
        if parsed < min {
            errors.push(FieldError::invalid(
                field,
                format!("{field} must be at least {min}"),
            ));
            return None;
        }
    }

    Some(parsed)
}

/// Validate a raw request into a normalized `SwapRequest`, or report every
/// field-level problem found.
pub fn validate(raw: &RawSwapRequest, mode: ValidationMode) -> Result<SwapRequest, Vec<FieldError>> {
    let mut errors = Vec::new();

    let token_in = require_symbol("tokenIn", &raw.token_in, &mut errors);
    let token_out = require_symbol("tokenOut", &raw.token_out, &mut errors);

    // A self-swap is degenerate and only wastes collaborator budget.
    if let (Some(a), Some(b)) = (&token_in, &token_out) {
        if a == b {
            errors.push(FieldError::invalid(
                "tokenOut",
                "tokenOut must differ from tokenIn",
            ));
        }
    }

    let amount_in = match &raw.amount_in {
        None => {
            errors.push(FieldError::missing("amountIn"));
            None
        }
        Some(v) => match parse_decimal(v) {
            Some(a) if a > Decimal::ZERO => Some(a),
            _ => {
                errors.push(FieldError::invalid(
                    "amountIn",
                    "amountIn must be a positive number",
                ));
                None
            }
        },
    };

    let user_slippage_pct = optional_decimal(
        "userSlippage",
        &raw.user_slippage,
        None,
        Some(Decimal::ZERO),
        &mut errors,
    );
    let min_amount_out = optional_decimal(
        "minAmountOut",
        &raw.min_amount_out,
        Some(Decimal::ZERO),
        None,
        &mut errors,
    );
    let max_slippage_pct = optional_decimal(
        "maxSlippage",
        &raw.max_slippage,
        None,
        Some(Decimal::ZERO),
        &mut errors,
    );
    let gas_price = optional_decimal(
        "gasPrice",
        &raw.gas_price,
        None,
        Some(Decimal::ZERO),
        &mut errors,
    );
    let priority_fee = optional_decimal(
        "priorityFee",
        &raw.priority_fee,
        None,
        Some(Decimal::ZERO),
        &mut errors,
    );

    let from = match (mode, raw.from.as_deref()) {
        (ValidationMode::Execute, None) | (ValidationMode::Execute, Some("")) => {
            errors.push(FieldError::missing("from"));
            None
        }
        (_, Some(addr)) if !is_valid_address(addr) => {
            errors.push(FieldError::invalid(
                "from",
                format!("'{addr}' is not a valid address"),
            ));
            None
        }
        (_, addr) => addr.map(str::to_string),
    };

    if !errors.is_empty() {
        return Err(errors);
    }

    // All required fields verified present above.
    match (token_in, token_out, amount_in) {
        (Some(token_in), Some(token_out), Some(amount_in)) => Ok(SwapRequest {
            token_in,
            token_out,
            amount_in,
            user_slippage_pct,
            from,
            min_amount_out,
            max_slippage_pct,
            gas_price,
            priority_fee,
        }),
        _ => Err(vec![FieldError::invalid("request", "incomplete request")]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw_quote() -> RawSwapRequest {
        RawSwapRequest {
            token_in: Some("ETH".into()),
            token_out: Some("USDC".into()),
            amount_in: Some(json!(2)),
            ..Default::default()
        }
    }

    #[test]
    fn accepts_minimal_quote_request() {
        let req = validate(&raw_quote(), ValidationMode::Quote).unwrap();
        assert_eq!(req.token_in, "ETH");
        assert_eq!(req.token_out, "USDC");
        assert_eq!(req.amount_in.to_string(), "2");
    }

    #[test]
    fn accepts_string_amounts() {
        let mut raw = raw_quote();
        raw.amount_in = Some(json!("0.5"));
        let req = validate(&raw, ValidationMode::Quote).unwrap();
        assert_eq!(req.amount_in.to_string(), "0.5");
    }

    #[test]
    fn reports_all_missing_fields_at_once() {
        let errs = validate(&RawSwapRequest::default(), ValidationMode::Quote).unwrap_err();
        let fields: Vec<_> = errs.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["tokenIn", "tokenOut", "amountIn"]);
        assert!(errs.iter().all(|e| e.kind == FieldErrorKind::Missing));
    }

    #[test]
    fn rejects_self_swap() {
        let mut raw = raw_quote();
        raw.token_out = Some("ETH".into());
        let errs = validate(&raw, ValidationMode::Quote).unwrap_err();
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].field, "tokenOut");
        assert_eq!(errs[0].kind, FieldErrorKind::Invalid);
    }

    #[test]
    fn rejects_nonpositive_amount() {
        for bad in [json!(0), json!(-3), json!("nope")] {
            let mut raw = raw_quote();
            raw.amount_in = Some(bad);
            let errs = validate(&raw, ValidationMode::Quote).unwrap_err();
            assert_eq!(errs[0].field, "amountIn");
        }
    }

    #[test]
    fn execute_requires_sender_address() {
        let errs = validate(&raw_quote(), ValidationMode::Execute).unwrap_err();
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].field, "from");
        assert_eq!(errs[0].kind, FieldErrorKind::Missing);
    }

    #[test]
    fn execute_rejects_malformed_address() {
        let mut raw = raw_quote();
        raw.from = Some("0x1234".into());
        let errs = validate(&raw, ValidationMode::Execute).unwrap_err();
        assert_eq!(errs[0].field, "from");
        assert_eq!(errs[0].kind, FieldErrorKind::Invalid);
    }

    #[test]
    fn execute_accepts_full_request() {
        let mut raw = raw_quote();
        raw.from = Some("0xAbCdef0123456789abcdef0123456789ABCDEF01".into());
        raw.min_amount_out = Some(json!(5900));
        raw.max_slippage = Some(json!(1.5));
        let req = validate(&raw, ValidationMode::Execute).unwrap();
        assert!(req.from.is_some());
        assert_eq!(req.min_amount_out.unwrap().to_string(), "5900");
        assert_eq!(req.max_slippage_pct.unwrap().to_string(), "1.5");
    }

    #[test]
    fn symbol_grammar() {
        assert!(is_valid_symbol("ETH"));
        assert!(is_valid_symbol("USDC"));
        assert!(is_valid_symbol("C98"));
        assert!(!is_valid_symbol("E"));
        assert!(!is_valid_symbol("eth"));
        assert!(!is_valid_symbol("1INCH")); // must start with a letter
        assert!(!is_valid_symbol("WAYTOOLONGSYM"));
    }

    #[test]
    fn address_grammar() {
        assert!(is_valid_address(
            "0x00112233445566778899aabbccddeeff00112233"
        ));
        assert!(!is_valid_address("00112233445566778899aabbccddeeff00112233"));
        assert!(!is_valid_address("0xzz112233445566778899aabbccddeeff00112233"));
        assert!(!is_valid_address("0x0011"));
    }
}
