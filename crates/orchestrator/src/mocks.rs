use async_trait::async_trait;
use ledger_network::{
    ClientHandle, LedgerQuery, NetworkResult, NodeGateway, OrdererReply, Subscription, TransactionEnvelope,
};
use ledger_types::{
    Block, ChainInfo, EndorsementResponse, NodeAddress, ProposalContext, ProposalCreator, ProposedOperation,
    TransactionId,
};
use mockall::mock;

mock! {
    pub Gateway {}

    #[async_trait]
    impl NodeGateway for Gateway {
        fn prepare_proposal(
            &self,
            client: &ClientHandle,
            operation: &ProposedOperation,
        ) -> NetworkResult<ProposalContext>;

        async fn send_proposal(
            &self,
            target: &NodeAddress,
            proposal: &ProposalContext,
        ) -> NetworkResult<EndorsementResponse>;

        async fn send_to_orderer(
            &self,
            orderer: &NodeAddress,
            envelope: &TransactionEnvelope,
        ) -> NetworkResult<OrdererReply>;

        async fn subscribe(
            &self,
            node: &NodeAddress,
            channel: &str,
            tx_id: &TransactionId,
        ) -> NetworkResult<Subscription>;
    }
}

mock! {
    pub Ledger {}

    #[async_trait]
    impl LedgerQuery for Ledger {
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
}

/// Proposal context the mock hands back for any operation.
pub fn proposal_for(operation: &ProposedOperation) -> ProposalContext {
    ProposalContext {
        tx_id: operation.tx_id.clone(),
        channel: operation.channel.clone(),
        creator: ProposalCreator::default(),
        bytes: operation.function.as_bytes().to_vec(),
    }
}
