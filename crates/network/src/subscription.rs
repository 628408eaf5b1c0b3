//! One-shot commit notification subscriptions.
//!
//! A [`Subscription`] is the consumer half handed to the caller of
//! [`NodeGateway::subscribe`](crate::NodeGateway::subscribe). The gateway keeps
//! the matching [`SubscriptionFeed`] and pushes notifications into it until the
//! subscription is cancelled. Cancelling (explicitly or by dropping the
//! subscription) is how a listener is unregistered.

use ledger_types::{NodeAddress, TransactionId};
use tokio::sync::mpsc;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};
use tracing::debug;

/// Notification delivered by a peer for a watched transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitNotification {
    /// Transaction landed in a block with the given validation code.
    Committed { validation_code: String, block_number: u64 },
    /// The notification stream reported an error.
    Error(String),
}

/// Validation code of a transaction committed as valid.
pub const VALID_CODE: &str = "VALID";

/// Consumer half of a commit subscription.
#[derive(Debug)]
pub struct Subscription {
    node: NodeAddress,
    tx_id: TransactionId,
    events: mpsc::Receiver<CommitNotification>,
    token: CancellationToken,
}

/// Producer half kept by the gateway.
#[derive(Debug, Clone)]
pub struct SubscriptionFeed {
    events: mpsc::Sender<CommitNotification>,
    token: CancellationToken,
}

impl Subscription {
    /// Create a linked subscription/feed pair.
    pub fn channel(node: NodeAddress, tx_id: TransactionId) -> (Subscription, SubscriptionFeed) {
        let (tx, rx) = mpsc::channel(1);
        let token = CancellationToken::new();
        let subscription = Subscription {
            node,
            tx_id,
            events: rx,
            token: token.clone(),
        };
        (subscription, SubscriptionFeed { events: tx, token })
    }

    /// Wait for the next notification. `None` once the feed is gone.
    pub async fn next_notification(&mut self) -> Option<CommitNotification> {
        if self.token.is_cancelled() {
            return None;
        }
        self.events.recv().await
    }

    /// Unregister the listener. Idempotent.
    pub fn cancel(&self) {
        if !self.token.is_cancelled() {
            debug!("Unregistering commit listener for tx {} on {}", self.tx_id, self.node);
            self.token.cancel();
        }
        // Nothing buffered after this point is ever read.
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl SubscriptionFeed {
    /// Push a notification. Returns `false` when the subscriber is gone.
    pub async fn deliver(&self, notification: CommitNotification) -> bool {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => false,
            sent = self.events.send(notification) => sent.is_ok(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled() || self.events.is_closed()
    }

    /// Resolves once the subscriber cancels.
    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> (Subscription, SubscriptionFeed) {
        Subscription::channel(NodeAddress::from("peer0"), TransactionId::from("tx1"))
    }

    #[tokio::test]
    async fn test_delivers_notification() {
        let (mut sub, feed) = pair();
        let notification = CommitNotification::Committed {
            validation_code: VALID_CODE.to_string(),
            block_number: 5,
        };

        assert!(feed.deliver(notification.clone()).await);
        assert_eq!(sub.next_notification().await, Some(notification));
    }

    #[tokio::test]
    async fn test_cancel_stops_delivery() {
        let (mut sub, feed) = pair();
        sub.cancel();

        assert!(sub.is_cancelled());
        assert!(feed.is_cancelled());
        assert!(!feed.deliver(CommitNotification::Error("late".into())).await);
        assert_eq!(sub.next_notification().await, None);
    }

    #[tokio::test]
    async fn test_drop_cancels_feed() {
        let (sub, feed) = pair();
        drop(sub);
        feed.cancelled().await;
        assert!(feed.is_cancelled());
    }

    #[tokio::test]
    async fn test_closed_feed_yields_none() {
        let (mut sub, feed) = pair();
        drop(feed);
        assert_eq!(sub.next_notification().await, None);
    }
}
