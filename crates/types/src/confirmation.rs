//! Per-node commit confirmation events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::NodeAddress;

/// Failure reason recorded when a node's timer fires first.
pub const TIMEOUT_REASON: &str = "timeout";

/// Terminal outcome of one node's commit subscription.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConfirmationEvent {
    pub source_node: NodeAddress,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    /// How the subscription resolved, fixed at construction.
    pub outcome: ConfirmationOutcome,
    pub resolved_at: DateTime<Utc>,
}

impl ConfirmationEvent {
    /// The node saw the transaction committed as valid.
    pub fn committed(source_node: NodeAddress, block_number: u64) -> Self {
        Self {
            source_node,
            valid: true,
            block_number: Some(block_number),
            failure_reason: None,
            outcome: ConfirmationOutcome::Committed,
            resolved_at: Utc::now(),
        }
    }

    /// The node reported an invalid commit or a notification error.
    pub fn invalid(source_node: NodeAddress, reason: impl Into<String>) -> Self {
        Self::unconfirmed(source_node, reason.into(), ConfirmationOutcome::Invalid)
    }

    /// The node's timer fired before any notification arrived.
    pub fn timed_out(source_node: NodeAddress) -> Self {
        Self::unconfirmed(source_node, TIMEOUT_REASON.to_string(), ConfirmationOutcome::TimedOut)
    }

    fn unconfirmed(source_node: NodeAddress, reason: String, outcome: ConfirmationOutcome) -> Self {
        Self {
            source_node,
            valid: false,
            block_number: None,
            failure_reason: Some(reason),
            outcome,
            resolved_at: Utc::now(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.outcome == ConfirmationOutcome::TimedOut
    }

    pub fn outcome(&self) -> ConfirmationOutcome {
        self.outcome
    }
}

/// Terminal state of a single node's subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationOutcome {
    Committed,
    Invalid,
    TimedOut,
}

impl ConfirmationOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfirmationOutcome::Committed => "committed",
            ConfirmationOutcome::Invalid => "invalid",
            ConfirmationOutcome::TimedOut => "timed_out",
        }
    }
}
