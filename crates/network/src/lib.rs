//! Network collaborators of the ledger gateway.
//!
//! The transaction pipeline never talks to peers directly. It goes through:
//!
//! - [`IdentityProvider`]: resolves caller credentials into a [`ClientHandle`]
//! - [`NodeGateway`]: proposals, ordering and commit subscriptions
//! - [`LedgerQuery`]: chain info and block lookups
//!
//! [`HttpNodeGateway`] implements both node traits over a JSON/HTTP bridge.

pub mod error;
pub mod gateway;
pub mod http;
pub mod identity;
pub mod profile;
pub mod subscription;

pub use error::{IdentityError, NetworkError, NetworkResult};
pub use gateway::{LedgerQuery, NodeGateway, OrdererReply, TransactionEnvelope};
pub use http::{HttpGatewayConfig, HttpNodeGateway};
pub use identity::{ClientHandle, IdentityProvider, StaticIdentityProvider};
pub use profile::{ChannelProfile, NetworkProfile};
pub use subscription::{CommitNotification, Subscription, SubscriptionFeed, VALID_CODE};
