//! Transaction lifecycle orchestration.
//!
//! [`TransactionCoordinator`] owns the pipeline and wires the stages together:
//!
//! - [`ProposalBroadcaster`]: concurrent proposal fan-out
//! - [`EndorsementEvaluator`](ledger_consensus::EndorsementEvaluator): quorum
//! - [`CommitSubmitter`]: ordering
//! - [`ConfirmationAggregator`]: per-node commit confirmation with timeouts
//!
//! It also exposes the read path (chaincode queries, chain info, blocks).

pub mod broadcaster;
pub mod confirmation;
pub mod coordinator;
pub mod error;
pub mod metrics;
pub mod query;
pub mod submitter;

#[cfg(test)]
mod mocks;

pub use broadcaster::{BroadcastResult, ProposalBroadcaster};
pub use confirmation::ConfirmationAggregator;
pub use coordinator::{CoordinatorSettings, TransactionCoordinator};
pub use error::{BroadcastError, QueryError, QueryResult, SubmitError};
pub use submitter::CommitSubmitter;
