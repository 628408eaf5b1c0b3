//! Shared data model for the ledger gateway.
//!
//! Every stage of the transaction pipeline exchanges the types defined here:
//!
//! - [`TransactionId`]: correlation key minted once per logical operation
//! - [`ProposedOperation`]: what is sent to the endorsing peers
//! - [`EndorsementResponse`] / [`EndorsementOutcome`]: what comes back and the quorum verdict
//! - [`CommitResult`]: the ordering service's answer
//! - [`ConfirmationEvent`]: one per notification source
//! - [`PipelineResult`]: the tagged outcome handed to the caller

use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

pub mod confirmation;
pub mod endorsement;
pub mod ledger;
pub mod pipeline;

pub use confirmation::{ConfirmationEvent, ConfirmationOutcome, TIMEOUT_REASON};
pub use endorsement::{
    CommitResult, EndorsementOutcome, EndorsementResponse, ProposalContext, ProposalCreator,
    ENDORSEMENT_OK, ORDERER_SUCCESS,
};
pub use ledger::{Block, BlockTransaction, ChainInfo};
pub use pipeline::{PipelineFailure, PipelineResult, PipelineStage, TransactionReceipt};

/// Length of the random nonce mixed into every transaction id.
pub const NONCE_LEN: usize = 24;

/// Transaction identifier, immutable once minted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct TransactionId(pub String);

impl TransactionId {
    /// Mint a fresh identifier for `creator`.
    ///
    /// The id is `hex(sha256(nonce || creator))` with a random 24-byte nonce,
    /// which is how Fabric peers derive transaction ids.
    pub fn mint(creator: &[u8]) -> Self {
        let mut nonce = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce);
        Self::from_parts(&nonce, creator)
    }

    /// Deterministic derivation used by [`TransactionId::mint`].
    pub fn from_parts(nonce: &[u8], creator: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(nonce);
        hasher.update(creator);
        TransactionId(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TransactionId {
    fn from(s: String) -> Self {
        TransactionId(s)
    }
}

impl From<&str> for TransactionId {
    fn from(s: &str) -> Self {
        TransactionId(s.to_string())
    }
}

/// Address of a peer or orderer (base URL of its gateway endpoint).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeAddress(pub String);

impl NodeAddress {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for NodeAddress {
    fn from(s: String) -> Self {
        NodeAddress(s)
    }
}

impl From<&str> for NodeAddress {
    fn from(s: &str) -> Self {
        NodeAddress(s.to_string())
    }
}

/// A chaincode invocation addressed to a set of endorsing peers.
///
/// Built by the coordinator at pipeline start and read-only afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProposedOperation {
    pub tx_id: TransactionId,
    pub channel: String,
    pub chaincode: String,
    pub function: String,
    pub args: Vec<String>,
    /// Endorsing peers, in the order responses are reported.
    pub targets: Vec<NodeAddress>,
}
