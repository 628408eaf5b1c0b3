//! Stage errors of the transaction pipeline and the read path.

use ledger_network::{IdentityError, NetworkError};
use ledger_types::TransactionId;
use thiserror::Error;

/// Proposal could not be put in front of any endorser.
#[derive(Debug, Error)]
pub enum BroadcastError {
    #[error("no endorsing peers configured for channel {0}")]
    NoTargets(String),

    #[error("failed to prepare proposal: {0}")]
    Prepare(#[source] NetworkError),

    #[error("none of the {attempted} endorsing peers could be reached: {last_error}")]
    AllUnreachable { attempted: usize, last_error: String },
}

/// Ordering service rejected the call or could not be reached.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// Submitting an unapproved outcome is a caller bug.
    #[error("transaction {0} was not endorsed, refusing to order it")]
    NotEndorsed(TransactionId),

    #[error("ordering service transport failure: {0}")]
    Transport(#[from] NetworkError),

    #[error("malformed ordering service response: {0}")]
    MalformedResponse(String),
}

/// Read path failure.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("channel {0} is not defined in the network profile")]
    ChannelNotFound(String),

    #[error("channel {0} has no peer to query")]
    NoPeers(String),

    #[error("invalid block hash: {0}")]
    InvalidHash(String),

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error("query rejected by {node}: status {status}")]
    Rejected { node: String, status: i32 },
}

pub type QueryResult<T> = std::result::Result<T, QueryError>;
