//! Error types for the gateway and identity collaborators.

use ledger_types::NodeAddress;
use thiserror::Error;

/// Errors raised while talking to peers and orderers.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// Node could not be reached.
    #[error("failed to connect to {node}: {reason}")]
    ConnectionFailed { node: NodeAddress, reason: String },

    /// Node did not answer in time.
    #[error("request to {node} timed out")]
    Timeout { node: NodeAddress },

    /// Node answered with a non-success HTTP status.
    #[error("{node} rejected request with status {status}: {body}")]
    RequestRejected {
        node: NodeAddress,
        status: u16,
        body: String,
    },

    /// Node answered something that could not be decoded.
    #[error("malformed response from {node}: {reason}")]
    MalformedResponse { node: NodeAddress, reason: String },

    /// The request could not be built.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Channel is not part of the client's network profile.
    #[error("channel {0} is not defined in the network profile")]
    ChannelNotFound(String),

    /// HTTP client construction failed.
    #[error("HTTP client error: {0}")]
    Client(String),
}

impl NetworkError {
    /// Map a reqwest failure for `node` onto the gateway taxonomy.
    pub fn from_reqwest(node: &NodeAddress, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            NetworkError::Timeout { node: node.clone() }
        } else if err.is_decode() {
            NetworkError::MalformedResponse {
                node: node.clone(),
                reason: err.to_string(),
            }
        } else {
            NetworkError::ConnectionFailed {
                node: node.clone(),
                reason: err.to_string(),
            }
        }
    }

    /// True when the node was never reached at all.
    pub fn is_unreachable(&self) -> bool {
        matches!(
            self,
            NetworkError::ConnectionFailed { .. } | NetworkError::Timeout { .. }
        )
    }
}

/// Result type for gateway operations.
pub type NetworkResult<T> = Result<T, NetworkError>;

/// Errors raised while resolving a caller identity.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("identity {0} is not registered")]
    UnknownIdentity(String),

    #[error("invalid secret for identity {0}")]
    InvalidSecret(String),
}
