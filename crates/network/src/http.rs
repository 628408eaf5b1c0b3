//! JSON-over-HTTP gateway to a peer/orderer REST bridge.
//!
//! Endpoints (relative to a node's base URL):
//!
//! | Method | Path | Purpose |
//! |--------|------|---------|
//! | POST | `/channels/{channel}/proposals` | endorse or evaluate a proposal |
//! | POST | `/channels/{channel}/broadcast` | submit an envelope (orderer) |
//! | GET  | `/channels/{channel}/transactions/{tx_id}/commit?wait_ms=N` | long-poll commit status |
//! | GET  | `/channels/{channel}/info` | chain height |
//! | GET  | `/channels/{channel}/blocks/{number}` | block by number |
//! | GET  | `/channels/{channel}/blocks/by-hash/{hex}` | block by hash |
//!
//! A commit long-poll answers `204 No Content` while the transaction is not
//! yet in a block.

use async_trait::async_trait;
use chrono::Utc;
use ledger_types::{
    Block, ChainInfo, EndorsementResponse, NodeAddress, ProposalContext, ProposalCreator,
    ProposedOperation, TransactionId,
};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{NetworkError, NetworkResult};
use crate::gateway::{LedgerQuery, NodeGateway, OrdererReply, TransactionEnvelope};
use crate::identity::ClientHandle;
use crate::subscription::{CommitNotification, Subscription, SubscriptionFeed};

const IDENTITY_HEADER: &str = "x-ledger-identity";
const MSP_HEADER: &str = "x-ledger-msp";

/// Tuning knobs for [`HttpNodeGateway`].
#[derive(Debug, Clone)]
pub struct HttpGatewayConfig {
    /// Timeout for every non-polling request.
    pub request_timeout: Duration,
    /// How long the peer may hold a commit long-poll open.
    pub poll_wait: Duration,
    /// Pause between empty long-poll answers.
    pub poll_interval: Duration,
}

impl Default for HttpGatewayConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            poll_wait: Duration::from_secs(5),
            poll_interval: Duration::from_millis(200),
        }
    }
}

/// Proposal body as serialized into [`ProposalContext::bytes`].
#[derive(Debug, Serialize, Deserialize)]
struct ProposalPayload {
    tx_id: String,
    channel: String,
    chaincode: String,
    function: String,
    args: Vec<String>,
    creator: String,
    timestamp: chrono::DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct ProposalReply {
    status: i32,
    #[serde(default)]
    payload: String,
    #[serde(default)]
    endorsement: String,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CommitStatusReply {
    validation_code: String,
    block_number: u64,
}

/// HTTP implementation of [`NodeGateway`] and [`LedgerQuery`].
#[derive(Clone)]
pub struct HttpNodeGateway {
    http: reqwest::Client,
    config: HttpGatewayConfig,
}

impl HttpNodeGateway {
    pub fn new(config: HttpGatewayConfig) -> NetworkResult<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| NetworkError::Client(e.to_string()))?;
        Ok(Self { http, config })
    }

    fn url(node: &NodeAddress, channel: &str, path: &str) -> String {
        format!("{}/channels/{}/{}", node.as_str().trim_end_matches('/'), channel, path)
    }

    async fn read_json<T: DeserializeOwned>(node: &NodeAddress, response: reqwest::Response) -> NetworkResult<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NetworkError::RequestRejected {
                node: node.clone(),
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| NetworkError::MalformedResponse {
                node: node.clone(),
                reason: e.to_string(),
            })
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        creator: &ProposalCreator,
        node: &NodeAddress,
        url: &str,
        body: &B,
    ) -> NetworkResult<T> {
        let response = self
            .http
            .post(url)
            .timeout(self.config.request_timeout)
            .header(IDENTITY_HEADER, creator.identity.as_str())
            .header(MSP_HEADER, creator.msp_id.as_str())
            .json(body)
            .send()
            .await
            .map_err(|e| NetworkError::from_reqwest(node, e))?;

        Self::read_json(node, response).await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        client: &ClientHandle,
        node: &NodeAddress,
        url: &str,
    ) -> NetworkResult<T> {
        let response = self
            .http
            .get(url)
            .timeout(self.config.request_timeout)
            .header(IDENTITY_HEADER, client.identity())
            .header(MSP_HEADER, client.msp_id())
            .send()
            .await
            .map_err(|e| NetworkError::from_reqwest(node, e))?;

        Self::read_json(node, response).await
    }

    fn decode_hex(node: &NodeAddress, field: &str, value: &str) -> NetworkResult<Vec<u8>> {
        hex::decode(value).map_err(|e| NetworkError::MalformedResponse {
            node: node.clone(),
            reason: format!("{} is not hex: {}", field, e),
        })
    }

    /// Long-poll the commit endpoint until a status arrives or the feed is cancelled.
    ///
    /// Subscriptions are not bound to a client, so polls carry no identity headers.
    async fn watch_commit(self, node: NodeAddress, url: String, tx_id: TransactionId, feed: SubscriptionFeed) {
        let wait_ms = self.config.poll_wait.as_millis().to_string();

        loop {
            let poll = self
                .http
                .get(&url)
                .query(&[("wait_ms", wait_ms.as_str())])
                .timeout(self.config.poll_wait + self.config.request_timeout)
                .send();

            let response = tokio::select! {
                biased;
                _ = feed.cancelled() => break,
                response = poll => response,
            };

            let notification = match response {
                Ok(resp) if resp.status() == StatusCode::NO_CONTENT => {
                    tokio::select! {
                        biased;
                        _ = feed.cancelled() => break,
                        _ = tokio::time::sleep(self.config.poll_interval) => continue,
                    }
                }
                Ok(resp) => match Self::read_json::<CommitStatusReply>(&node, resp).await {
                    Ok(reply) => CommitNotification::Committed {
                        validation_code: reply.validation_code,
                        block_number: reply.block_number,
                    },
                    Err(e) => CommitNotification::Error(e.to_string()),
                },
                Err(e) => CommitNotification::Error(NetworkError::from_reqwest(&node, e).to_string()),
            };

            if !feed.deliver(notification).await {
                debug!("Listener for tx {} on {} went away before delivery", tx_id, node);
            }
            break;
        }

        debug!("Commit watcher for tx {} on {} stopped", tx_id, node);
    }
}

#[async_trait]
impl NodeGateway for HttpNodeGateway {
    fn prepare_proposal(
        &self,
        client: &ClientHandle,
        operation: &ProposedOperation,
    ) -> NetworkResult<ProposalContext> {
        if operation.function.is_empty() {
            return Err(NetworkError::InvalidRequest("function name is empty".to_string()));
        }
        if operation.chaincode.is_empty() {
            return Err(NetworkError::InvalidRequest("chaincode name is empty".to_string()));
        }
        if client.channel(&operation.channel).is_none() {
            return Err(NetworkError::ChannelNotFound(operation.channel.clone()));
        }

        let payload = ProposalPayload {
            tx_id: operation.tx_id.0.clone(),
            channel: operation.channel.clone(),
            chaincode: operation.chaincode.clone(),
            function: operation.function.clone(),
            args: operation.args.clone(),
            creator: hex::encode(client.creator()),
            timestamp: Utc::now(),
        };

        let bytes = serde_json::to_vec(&payload)
            .map_err(|e| NetworkError::InvalidRequest(format!("failed to encode proposal: {}", e)))?;

        Ok(ProposalContext {
            tx_id: operation.tx_id.clone(),
            channel: operation.channel.clone(),
            creator: ProposalCreator {
                identity: client.identity().to_string(),
                msp_id: client.msp_id().to_string(),
            },
            bytes,
        })
    }

    async fn send_proposal(
        &self,
        target: &NodeAddress,
        proposal: &ProposalContext,
    ) -> NetworkResult<EndorsementResponse> {
        let url = Self::url(target, &proposal.channel, "proposals");
        let reply: ProposalReply = self.post_json(&proposal.creator, target, &url, proposal).await?;

        let mut response = EndorsementResponse::new(
            target.clone(),
            reply.status,
            Self::decode_hex(target, "payload", &reply.payload)?,
            Self::decode_hex(target, "endorsement", &reply.endorsement)?,
        );
        response.message = reply.message;
        Ok(response)
    }

    async fn send_to_orderer(
        &self,
        orderer: &NodeAddress,
        envelope: &TransactionEnvelope,
    ) -> NetworkResult<OrdererReply> {
        let url = Self::url(orderer, &envelope.proposal.channel, "broadcast");
        self.post_json(&envelope.proposal.creator, orderer, &url, envelope).await
    }

    async fn subscribe(
        &self,
        node: &NodeAddress,
        channel: &str,
        tx_id: &TransactionId,
    ) -> NetworkResult<Subscription> {
        if tx_id.as_str().is_empty() {
            return Err(NetworkError::InvalidRequest("empty transaction id".to_string()));
        }

        let url = Self::url(node, channel, &format!("transactions/{}/commit", tx_id));
        let (subscription, feed) = Subscription::channel(node.clone(), tx_id.clone());

        tokio::spawn(self.clone().watch_commit(node.clone(), url, tx_id.clone(), feed));
        debug!("Registered commit listener for tx {} on {}", tx_id, node);

        Ok(subscription)
    }
}

#[async_trait]
impl LedgerQuery for HttpNodeGateway {
    async fn query_chain_info(
        &self,
        client: &ClientHandle,
        peer: &NodeAddress,
        channel: &str,
    ) -> NetworkResult<ChainInfo> {
        let url = Self::url(peer, channel, "info");
        self.get_json(client, peer, &url).await
    }

    async fn query_block(
        &self,
        client: &ClientHandle,
        peer: &NodeAddress,
        channel: &str,
        number: u64,
    ) -> NetworkResult<Block> {
        let url = Self::url(peer, channel, &format!("blocks/{}", number));
        self.get_json(client, peer, &url).await
    }

    async fn query_block_by_hash(
        &self,
        client: &ClientHandle,
        peer: &NodeAddress,
        channel: &str,
        hash: &[u8],
    ) -> NetworkResult<Block> {
        if hash.is_empty() {
            warn!("Block-by-hash query with empty hash on {}", peer);
            return Err(NetworkError::InvalidRequest("empty block hash".to_string()));
        }
        let url = Self::url(peer, channel, &format!("blocks/by-hash/{}", hex::encode(hash)));
        self.get_json(client, peer, &url).await
    }
}
