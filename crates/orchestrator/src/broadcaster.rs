//! Proposal fan-out to the endorsing peers.

use futures::future::join_all;
use ledger_network::{ClientHandle, NodeGateway};
use ledger_types::{EndorsementResponse, NodeAddress, ProposalContext, ProposedOperation};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::BroadcastError;
use crate::metrics;

/// Raw endorsement responses together with the proposal they answer.
#[derive(Debug, Clone)]
pub struct BroadcastResult {
    /// One entry per target, in target order.
    pub responses: Vec<EndorsementResponse>,
    pub proposal: ProposalContext,
}

/// Sends a proposal to every target concurrently.
pub struct ProposalBroadcaster {
    gateway: Arc<dyn NodeGateway>,
    endorse_timeout: Duration,
}

impl ProposalBroadcaster {
    pub fn new(gateway: Arc<dyn NodeGateway>, endorse_timeout: Duration) -> Self {
        Self {
            gateway,
            endorse_timeout,
        }
    }

    /// Broadcast `operation` to its targets.
    ///
    /// Per-node failures become bad entries. The call only fails when the
    /// proposal cannot be built or no target answered at all.
    pub async fn broadcast(
        &self,
        client: &ClientHandle,
        operation: &ProposedOperation,
    ) -> Result<BroadcastResult, BroadcastError> {
        if operation.targets.is_empty() {
            return Err(BroadcastError::NoTargets(operation.channel.clone()));
        }

        let proposal = self
            .gateway
            .prepare_proposal(client, operation)
            .map_err(BroadcastError::Prepare)?;

        debug!(
            "Sending proposal for tx {} to {} endorsers",
            operation.tx_id,
            operation.targets.len()
        );

        let calls = operation
            .targets
            .iter()
            .map(|target| self.endorse_one(target, &proposal));
        let results = join_all(calls).await;

        let mut last_error = String::new();
        let mut reached = 0usize;
        let mut responses = Vec::with_capacity(results.len());
        for (response, answered) in results {
            if answered {
                reached += 1;
            } else if let Some(message) = &response.message {
                last_error = message.clone();
            }
            metrics::record_endorsement(response.source_node.as_str(), response.is_success());
            responses.push(response);
        }

        if reached == 0 {
            return Err(BroadcastError::AllUnreachable {
                attempted: operation.targets.len(),
                last_error,
            });
        }

        Ok(BroadcastResult { responses, proposal })
    }

    /// Returns the response and whether the node answered at all.
    async fn endorse_one(&self, target: &NodeAddress, proposal: &ProposalContext) -> (EndorsementResponse, bool) {
        match tokio::time::timeout(self.endorse_timeout, self.gateway.send_proposal(target, proposal)).await {
            Ok(Ok(response)) => (response, true),
            Ok(Err(e)) => {
                warn!("Endorser {} failed for tx {}: {}", target, proposal.tx_id, e);
                let answered = !e.is_unreachable();
                (EndorsementResponse::bad(target.clone(), e.to_string()), answered)
            }
            Err(_) => {
                warn!(
                    "Endorser {} did not answer within {:?} for tx {}",
                    target, self.endorse_timeout, proposal.tx_id
                );
                (EndorsementResponse::bad(target.clone(), "endorsement timeout"), false)
            }
        }
    }
}
