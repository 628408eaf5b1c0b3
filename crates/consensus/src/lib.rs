//! Decision logic of the transaction pipeline.
//!
//! Nothing in this crate performs I/O. It provides:
//!
//! - **Endorsement quorum**: [`EndorsementEvaluator`] approves a proposal only
//!   when every endorser answered with status 200. An empty response set is
//!   rejected.
//! - **Confirmation verdict**: [`ConfirmationVerdict`] turns the per-node
//!   confirmation events into an overall answer. At least one valid commit
//!   means the transaction is on the ledger.
//! - **Pipeline state machine**: [`PipelineFsm`] tracks a run through
//!   Proposing -> Evaluating -> Committing -> Confirming -> Done, with an
//!   absorbing Aborted(stage) state.

pub mod endorsement;
pub mod fsm;
pub mod verdict;

pub use endorsement::EndorsementEvaluator;
pub use fsm::{FsmError, PipelineFsm, PipelineState};
pub use verdict::ConfirmationVerdict;
