use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::{AttackType, TxContext};

/// Verdict of the MEV screen for one transaction context.
///
/// `blocked == true` is a hard verdict: the execute pipeline terminates
/// immediately and records nothing. `warning` is advisory and travels with a
/// successful execution's metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MevAssessment {
    pub blocked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attack_type: Option<AttackType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl MevAssessment {
    pub fn clear() -> Self {
        Self {
            blocked: false,
            reason: None,
            attack_type: None,
            warning: None,
        }
    }

    pub fn blocked(reason: impl Into<String>, attack_type: Option<AttackType>) -> Self {
        Self {
            blocked: true,
            reason: Some(reason.into()),
            attack_type,
            warning: None,
        }
    }
}

/// Abstraction over the external MEV-screening layer.
#[async_trait]
pub trait MevGuard: Send + Sync {
    async fn protect(&self, ctx: &TxContext) -> anyhow::Result<MevAssessment>;

    /// Point-in-time counters for the security stats surface.
    fn stats(&self) -> serde_json::Value;
}
