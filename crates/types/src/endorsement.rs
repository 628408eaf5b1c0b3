//! Endorsement and ordering payloads.

use serde::{Deserialize, Serialize};

use crate::{NodeAddress, TransactionId};

/// Status code an endorser returns for a successful simulation.
pub const ENDORSEMENT_OK: i32 = 200;

/// Status the ordering service returns when it accepts an envelope.
pub const ORDERER_SUCCESS: &str = "SUCCESS";

/// Identity a proposal was prepared for.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProposalCreator {
    pub identity: String,
    pub msp_id: String,
}

/// Signed proposal as prepared by the gateway. Opaque to the core.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProposalContext {
    pub tx_id: TransactionId,
    pub channel: String,
    pub creator: ProposalCreator,
    /// Encoded proposal; only the gateway interprets it.
    pub bytes: Vec<u8>,
}

/// One endorser's answer to a proposal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EndorsementResponse {
    pub source_node: NodeAddress,
    pub status_code: i32,
    /// Chaincode response payload.
    pub payload: Vec<u8>,
    /// Endorser signature over the proposal response, needed for commit.
    pub endorsement: Vec<u8>,
    /// Set for entries that stand in for a failed or malformed reply.
    pub message: Option<String>,
}

impl EndorsementResponse {
    pub fn new(source_node: NodeAddress, status_code: i32, payload: Vec<u8>, endorsement: Vec<u8>) -> Self {
        Self {
            source_node,
            status_code,
            payload,
            endorsement,
            message: None,
        }
    }

    /// Placeholder for a node that threw, timed out or answered garbage.
    pub fn bad(source_node: NodeAddress, message: impl Into<String>) -> Self {
        Self {
            source_node,
            status_code: 0,
            payload: Vec::new(),
            endorsement: Vec::new(),
            message: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status_code == ENDORSEMENT_OK
    }
}

/// Quorum verdict over a full set of endorsement responses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EndorsementOutcome {
    pub approved: bool,
    pub responses: Vec<EndorsementResponse>,
    pub proposal: ProposalContext,
}

impl EndorsementOutcome {
    /// Responses that did not return [`ENDORSEMENT_OK`].
    pub fn rejections(&self) -> impl Iterator<Item = &EndorsementResponse> {
        self.responses.iter().filter(|r| !r.is_success())
    }

    /// Payload of the first successful endorsement, if any.
    pub fn payload(&self) -> Option<&[u8]> {
        self.responses
            .iter()
            .find(|r| r.is_success())
            .map(|r| r.payload.as_slice())
    }
}

/// Ordering service answer. Acceptance does not mean the transaction was committed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommitResult {
    pub accepted: bool,
    pub status_code: String,
}

impl CommitResult {
    pub fn from_status(status: impl Into<String>) -> Self {
        let status_code = status.into();
        Self {
            accepted: status_code == ORDERER_SUCCESS,
            status_code,
        }
    }
}
