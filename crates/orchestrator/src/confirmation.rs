//! Multi-node commit confirmation.
//!
//! Every node gets its own one-shot subscription racing its own timer.
//! The aggregator waits for all of them and reports one
//! [`ConfirmationEvent`] per node, in input order.

use futures::future::join_all;
use ledger_network::{CommitNotification, NodeGateway, VALID_CODE};
use ledger_types::{ConfirmationEvent, NodeAddress, TransactionId};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{timeout_at, Instant};
use tracing::{info, warn};

use crate::metrics;

pub struct ConfirmationAggregator {
    gateway: Arc<dyn NodeGateway>,
}

impl ConfirmationAggregator {
    pub fn new(gateway: Arc<dyn NodeGateway>) -> Self {
        Self { gateway }
    }

    /// Wait for every node in `nodes` to confirm, reject or time out.
    ///
    /// Never fails and never returns before every subscription is resolved
    /// and unregistered. Worst-case latency is `timeout_per_node`.
    pub async fn confirm(
        &self,
        channel: &str,
        tx_id: &TransactionId,
        nodes: &[NodeAddress],
        timeout_per_node: Duration,
    ) -> Vec<ConfirmationEvent> {
        let watches = nodes
            .iter()
            .map(|node| self.watch(channel, tx_id, node, timeout_per_node));
        let events = join_all(watches).await;

        for event in &events {
            metrics::record_confirmation(event.source_node.as_str(), event.outcome().as_str());
        }
        events
    }

    async fn watch(
        &self,
        channel: &str,
        tx_id: &TransactionId,
        node: &NodeAddress,
        timeout_per_node: Duration,
    ) -> ConfirmationEvent {
        let deadline = Instant::now() + timeout_per_node;

        let mut subscription = match timeout_at(deadline, self.gateway.subscribe(node, channel, tx_id)).await {
            Ok(Ok(subscription)) => subscription,
            Ok(Err(e)) => {
                warn!("Could not subscribe to {} for tx {}: {}", node, tx_id, e);
                return ConfirmationEvent::invalid(node.clone(), format!("subscribe failed: {}", e));
            }
            Err(_) => {
                warn!("Subscribing to {} for tx {} timed out", node, tx_id);
                return ConfirmationEvent::timed_out(node.clone());
            }
        };

        let event = match timeout_at(deadline, subscription.next_notification()).await {
            Ok(Some(CommitNotification::Committed {
                validation_code,
                block_number,
            })) => {
                if validation_code == VALID_CODE {
                    info!("Transaction {} committed in block {} on {}", tx_id, block_number, node);
                    ConfirmationEvent::committed(node.clone(), block_number)
                } else {
                    warn!("Transaction {} was invalid on {}, code {}", tx_id, node, validation_code);
                    ConfirmationEvent::invalid(node.clone(), format!("invalid commit, code: {}", validation_code))
                }
            }
            Ok(Some(CommitNotification::Error(reason))) => {
                warn!("Commit notification error from {} for tx {}: {}", node, tx_id, reason);
                ConfirmationEvent::invalid(node.clone(), reason)
            }
            Ok(None) => ConfirmationEvent::invalid(node.clone(), "notification channel closed"),
            Err(_) => {
                warn!("The transaction {} was not confirmed by {} in time", tx_id, node);
                ConfirmationEvent::timed_out(node.clone())
            }
        };

        // One-shot: the listener goes away whatever the outcome.
        subscription.cancel();
        event
    }
}
