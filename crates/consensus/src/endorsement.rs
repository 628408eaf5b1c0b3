//! Strict-AND endorsement quorum.

use ledger_types::{EndorsementOutcome, EndorsementResponse, ProposalContext};
use tracing::{info, warn};

/// Decides whether a set of endorsement responses allows a commit.
///
/// A single endorser answering anything but 200 vetoes the transaction.
#[derive(Debug, Default, Clone, Copy)]
pub struct EndorsementEvaluator;

impl EndorsementEvaluator {
    pub fn new() -> Self {
        Self
    }

    /// True iff `responses` is non-empty and every entry succeeded.
    pub fn approves(responses: &[EndorsementResponse]) -> bool {
        !responses.is_empty() && responses.iter().all(EndorsementResponse::is_success)
    }

    /// Apply the quorum policy and keep the proposal for the commit stage.
    pub fn evaluate(&self, responses: Vec<EndorsementResponse>, proposal: ProposalContext) -> EndorsementOutcome {
        for response in &responses {
            if response.is_success() {
                info!(
                    "Transaction proposal for tx {} was good on {}",
                    proposal.tx_id, response.source_node
                );
            } else {
                warn!(
                    "Transaction proposal for tx {} was bad on {}: status {} ({})",
                    proposal.tx_id,
                    response.source_node,
                    response.status_code,
                    response.message.as_deref().unwrap_or("no message")
                );
            }
        }

        if responses.is_empty() {
            warn!("No endorsement responses for tx {}", proposal.tx_id);
        }

        EndorsementOutcome {
            approved: Self::approves(&responses),
            responses,
            proposal,
        }
    }
}
