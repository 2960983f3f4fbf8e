//! Uniform external response shape.
//!
//! Every success is `{success:true, data, metadata}` and every failure is
//! `{success:false, error, code, ...details}`, so callers branch on one
//! `success` flag and a stable `code` enum regardless of pipeline.

use serde::Serialize;
use serde_json::{Value, json};

use crate::error::{GatewayError, PipelineKind};

/// Transport-agnostic reply: an HTTP status plus a JSON body. Whatever
/// server fronts the gateway mounts these verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpReply {
    pub status: u16,
    pub body: Value,
}

fn to_json<T: Serialize>(v: &T) -> Value {
    serde_json::to_value(v).unwrap_or(Value::Null)
}

pub fn success<D: Serialize, M: Serialize>(data: &D, metadata: &M) -> HttpReply {
    HttpReply {
        status: 200,
        body: json!({
            "success": true,
            "data": to_json(data),
            "metadata": to_json(metadata),
        }),
    }
}

pub fn failure(kind: PipelineKind, err: &GatewayError) -> HttpReply {
    let mut body = json!({
        "success": false,
        "error": err.to_string(),
        "code": err.code(kind),
    });

    match err {
        GatewayError::Validation(errors) => {
            body["details"] = to_json(errors);
        }
        GatewayError::MevBlocked {
            reason,
            attack_type,
        } => {
            body["reason"] = json!(reason);
            if let Some(attack) = attack_type {
                body["attackType"] = to_json(attack);
            }
        }
        GatewayError::PriceUnavailable { reason } => {
            body["reason"] = json!(reason);
        }
        GatewayError::SlippageExceeded(_) | GatewayError::Internal(_) => {}
    }

    HttpReply {
        status: err.http_status(),
        body,
    }
}
