//! Hands endorsed transactions to the ordering service.

use ledger_network::{NodeGateway, TransactionEnvelope};
use ledger_types::{CommitResult, EndorsementOutcome, NodeAddress, TransactionId};
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::SubmitError;

pub struct CommitSubmitter {
    gateway: Arc<dyn NodeGateway>,
}

impl CommitSubmitter {
    pub fn new(gateway: Arc<dyn NodeGateway>) -> Self {
        Self { gateway }
    }

    /// Send the endorsed transaction to `orderer` exactly once.
    ///
    /// `accepted` only means the orderer took the envelope; whether it was
    /// committed is decided by the confirmation stage.
    pub async fn submit(
        &self,
        tx_id: &TransactionId,
        orderer: &NodeAddress,
        outcome: &EndorsementOutcome,
    ) -> Result<CommitResult, SubmitError> {
        if !outcome.approved {
            return Err(SubmitError::NotEndorsed(tx_id.clone()));
        }

        let envelope = TransactionEnvelope {
            tx_id: tx_id.clone(),
            proposal: outcome.proposal.clone(),
            endorsements: outcome.responses.clone(),
        };

        let reply = self.gateway.send_to_orderer(orderer, &envelope).await?;
        if reply.status.is_empty() {
            return Err(SubmitError::MalformedResponse(format!(
                "orderer {} returned an empty status",
                orderer
            )));
        }

        let result = CommitResult::from_status(reply.status);
        if result.accepted {
            info!("Successfully sent transaction {} to the orderer", tx_id);
        } else {
            warn!(
                "Orderer {} refused tx {}: status {} ({})",
                orderer,
                tx_id,
                result.status_code,
                reply.info.as_deref().unwrap_or("no info")
            );
        }
        Ok(result)
    }
}
