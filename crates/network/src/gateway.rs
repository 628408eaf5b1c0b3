//! Collaborator traits for the peers, orderers and ledger queries.

use async_trait::async_trait;
use futures::future::join_all;
use ledger_types::{
    Block, ChainInfo, EndorsementResponse, NodeAddress, ProposalContext, ProposedOperation,
    TransactionId,
};
use serde::{Deserialize, Serialize};

use crate::error::NetworkResult;
use crate::identity::ClientHandle;
use crate::subscription::Subscription;

/// Endorsed transaction sent to the ordering service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransactionEnvelope {
    pub tx_id: TransactionId,
    pub proposal: ProposalContext,
    pub endorsements: Vec<EndorsementResponse>,
}

/// Raw answer of the ordering service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrdererReply {
    pub status: String,
    #[serde(default)]
    pub info: Option<String>,
}

/// Endorsing, ordering and notification nodes of the ledger network.
///
/// Implementations must be safe to share across concurrent pipelines.
#[async_trait]
pub trait NodeGateway: Send + Sync {
    /// Build and sign the proposal for `operation`.
    fn prepare_proposal(
        &self,
        client: &ClientHandle,
        operation: &ProposedOperation,
    ) -> NetworkResult<ProposalContext>;

    /// Ask one peer to endorse (or evaluate) a proposal.
    async fn send_proposal(
        &self,
        target: &NodeAddress,
        proposal: &ProposalContext,
    ) -> NetworkResult<EndorsementResponse>;

    /// Hand an endorsed transaction to the ordering service.
    async fn send_to_orderer(
        &self,
        orderer: &NodeAddress,
        envelope: &TransactionEnvelope,
    ) -> NetworkResult<OrdererReply>;

    /// Evaluate a read-only proposal on every target. Nothing is ordered.
    ///
    /// Fails on the first target that cannot answer.
    async fn query_chaincode(
        &self,
        client: &ClientHandle,
        operation: &ProposedOperation,
    ) -> NetworkResult<Vec<EndorsementResponse>> {
        let proposal = self.prepare_proposal(client, operation)?;
        let calls = operation
            .targets
            .iter()
            .map(|target| self.send_proposal(target, &proposal));

        join_all(calls).await.into_iter().collect()
    }

    /// Register a commit listener for `tx_id` on `node`.
    async fn subscribe(
        &self,
        node: &NodeAddress,
        channel: &str,
        tx_id: &TransactionId,
    ) -> NetworkResult<Subscription>;
}

/// Read-only ledger queries against a single peer.
#[async_trait]
pub trait LedgerQuery: Send + Sync {
    async fn query_chain_info(
        &self,
        client: &ClientHandle,
        peer: &NodeAddress,
        channel: &str,
    ) -> NetworkResult<ChainInfo>;

    async fn query_block(
        &self,
        client: &ClientHandle,
        peer: &NodeAddress,
        channel: &str,
        number: u64,
    ) -> NetworkResult<Block>;

    async fn query_block_by_hash(
        &self,
        client: &ClientHandle,
        peer: &NodeAddress,
        channel: &str,
        hash: &[u8],
    ) -> NetworkResult<Block>;
}
