//! Externally observable pipeline outcome.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{ConfirmationEvent, TransactionId};

/// Stage at which a pipeline run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// Identity resolution, before a transaction id exists
    Enrolling,
    Proposing,
    Evaluating,
    Committing,
    Confirming,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineStage::Enrolling => write!(f, "enrolling"),
            PipelineStage::Proposing => write!(f, "proposing"),
            PipelineStage::Evaluating => write!(f, "evaluating"),
            PipelineStage::Committing => write!(f, "committing"),
            PipelineStage::Confirming => write!(f, "confirming"),
        }
    }
}

/// Payload of a successful run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransactionReceipt {
    pub tx_id: TransactionId,
    /// Orderer status string
    pub commit_status: String,
    /// Chaincode response payload from the endorsement
    pub payload: Vec<u8>,
    /// One event per notification source, in configured order
    pub events: Vec<ConfirmationEvent>,
    pub completed_at: DateTime<Utc>,
}

impl TransactionReceipt {
    pub fn valid_confirmations(&self) -> usize {
        self.events.iter().filter(|e| e.valid).count()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PipelineFailure {
    pub stage: PipelineStage,
    pub reason: String,
    /// Absent when the run failed before an id was minted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_id: Option<TransactionId>,
    /// Confirmation events gathered before the run was declared failed.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<ConfirmationEvent>,
}

impl fmt::Display for PipelineFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: {}", self.stage, self.reason)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PipelineResult {
    Success(TransactionReceipt),
    Failure(PipelineFailure),
}

impl PipelineResult {
    pub fn failure(stage: PipelineStage, reason: impl Into<String>, tx_id: Option<TransactionId>) -> Self {
        PipelineResult::Failure(PipelineFailure {
            stage,
            reason: reason.into(),
            tx_id,
            events: Vec::new(),
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, PipelineResult::Success(_))
    }

    pub fn tx_id(&self) -> Option<&TransactionId> {
        match self {
            PipelineResult::Success(receipt) => Some(&receipt.tx_id),
            PipelineResult::Failure(failure) => failure.tx_id.as_ref(),
        }
    }

    /// Stage that stopped the run, `None` on success.
    pub fn failed_stage(&self) -> Option<PipelineStage> {
        match self {
            PipelineResult::Success(_) => None,
            PipelineResult::Failure(failure) => Some(failure.stage),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NodeAddress;

    #[test]
    fn test_stage_display() {
        assert_eq!(PipelineStage::Evaluating.to_string(), "evaluating");
        assert_eq!(PipelineStage::Confirming.to_string(), "confirming");
    }

    #[test]
    fn test_failure_serializes_with_status_tag() {
        let result = PipelineResult::failure(
            PipelineStage::Evaluating,
            "endorsement rejected",
            Some(TransactionId::from("abc")),
        );
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "failure");
        assert_eq!(json["stage"], "evaluating");
        assert_eq!(json["tx_id"], "abc");
        assert!(json.get("events").is_none());
    }

    #[test]
    fn test_receipt_counts_valid_confirmations() {
        let receipt = TransactionReceipt {
            tx_id: TransactionId::from("abc"),
            commit_status: "SUCCESS".to_string(),
            payload: vec![],
            events: vec![
                ConfirmationEvent::committed(NodeAddress::from("p0"), 4),
                ConfirmationEvent::timed_out(NodeAddress::from("p1")),
            ],
            completed_at: Utc::now(),
        };
        assert_eq!(receipt.valid_confirmations(), 1);

        let result = PipelineResult::Success(receipt);
        assert!(result.is_success());
        assert_eq!(result.failed_stage(), None);
        assert_eq!(result.tx_id(), Some(&TransactionId::from("abc")));
    }
}
