//! Scripted in-memory ledger network shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use ledger_network::{
    ChannelProfile, ClientHandle, CommitNotification, LedgerQuery, NetworkError, NetworkProfile,
    NetworkResult, NodeGateway, OrdererReply, StaticIdentityProvider, Subscription,
    TransactionEnvelope, VALID_CODE,
};
use ledger_orchestrator::{CoordinatorSettings, TransactionCoordinator};
use ledger_types::{
    Block, BlockTransaction, ChainInfo, EndorsementResponse, NodeAddress, ProposalContext,
    ProposalCreator, ProposedOperation, TransactionId,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const CHANNEL: &str = "mychannel";
pub const USER: &str = "user1";
pub const SECRET: &str = "user1pw";
pub const ADMIN: &str = "admin";
pub const ADMIN_SECRET: &str = "adminpw";

/// How an endorser answers a proposal.
#[derive(Debug, Clone)]
pub enum Endorse {
    Status(i32),
    Unreachable,
    Hang,
}

/// What a node's commit feed delivers.
#[derive(Debug, Clone)]
pub enum Commit {
    Valid(u64),
    Invalid(&'static str),
    Error(&'static str),
    Silent,
}

/// Every call that reached the fake, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Prepare(TransactionId),
    Propose(String, TransactionId),
    Order(TransactionId),
    Subscribe(String, TransactionId),
    Cancel(String),
    ChainInfo(String),
    Block(u64),
    BlockByHash(Vec<u8>),
}

pub struct FakeNetwork {
    endorsers: HashMap<String, Endorse>,
    commits: HashMap<String, Commit>,
    orderer_status: String,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl FakeNetwork {
    pub fn new() -> Self {
        Self {
            endorsers: HashMap::new(),
            commits: HashMap::new(),
            orderer_status: "SUCCESS".to_string(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn endorser(mut self, node: &str, behaviour: Endorse) -> Self {
        self.endorsers.insert(node.to_string(), behaviour);
        self
    }

    pub fn commit(mut self, node: &str, behaviour: Commit) -> Self {
        self.commits.insert(node.to_string(), behaviour);
        self
    }

    pub fn orderer_status(mut self, status: &str) -> Self {
        self.orderer_status = status.to_string();
        self
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }

    /// Wait until the listener tasks have observed `expected` cancellations.
    pub async fn wait_for_cancels(&self, expected: usize) -> usize {
        for _ in 0..1000 {
            let seen = self.count(|c| matches!(c, Call::Cancel(_)));
            if seen >= expected {
                return seen;
            }
            tokio::task::yield_now().await;
        }
        self.count(|c| matches!(c, Call::Cancel(_)))
    }
}

#[async_trait]
impl NodeGateway for FakeNetwork {
    fn prepare_proposal(&self, client: &ClientHandle, operation: &ProposedOperation) -> NetworkResult<ProposalContext> {
        if client.channel(&operation.channel).is_none() {
            return Err(NetworkError::ChannelNotFound(operation.channel.clone()));
        }
        self.record(Call::Prepare(operation.tx_id.clone()));
        Ok(ProposalContext {
            tx_id: operation.tx_id.clone(),
            channel: operation.channel.clone(),
            creator: ProposalCreator {
                identity: client.identity().to_string(),
                msp_id: client.msp_id().to_string(),
            },
            bytes: operation.function.as_bytes().to_vec(),
        })
    }

    async fn send_proposal(&self, target: &NodeAddress, proposal: &ProposalContext) -> NetworkResult<EndorsementResponse> {
        self.record(Call::Propose(target.to_string(), proposal.tx_id.clone()));

        match self.endorsers.get(target.as_str()).cloned().unwrap_or(Endorse::Status(200)) {
            Endorse::Status(status) => Ok(EndorsementResponse::new(
                target.clone(),
                status,
                format!("payload-from-{}", target).into_bytes(),
                vec![0xAB],
            )),
            Endorse::Unreachable => Err(NetworkError::ConnectionFailed {
                node: target.clone(),
                reason: "connection refused".to_string(),
            }),
            Endorse::Hang => std::future::pending().await,
        }
    }

    async fn send_to_orderer(&self, _orderer: &NodeAddress, envelope: &TransactionEnvelope) -> NetworkResult<OrdererReply> {
        self.record(Call::Order(envelope.tx_id.clone()));
        Ok(OrdererReply {
            status: self.orderer_status.clone(),
            info: None,
        })
    }

    async fn subscribe(&self, node: &NodeAddress, _channel: &str, tx_id: &TransactionId) -> NetworkResult<Subscription> {
        self.record(Call::Subscribe(node.to_string(), tx_id.clone()));

        let (subscription, feed) = Subscription::channel(node.clone(), tx_id.clone());
        let behaviour = self.commits.get(node.as_str()).cloned().unwrap_or(Commit::Valid(1));
        let calls = Arc::clone(&self.calls);
        let name = node.to_string();

        tokio::spawn(async move {
            let notification = match behaviour {
                Commit::Valid(block_number) => Some(CommitNotification::Committed {
                    validation_code: VALID_CODE.to_string(),
                    block_number,
                }),
                Commit::Invalid(code) => Some(CommitNotification::Committed {
                    validation_code: code.to_string(),
                    block_number: 1,
                }),
                Commit::Error(message) => Some(CommitNotification::Error(message.to_string())),
                Commit::Silent => None,
            };
            if let Some(notification) = notification {
                feed.deliver(notification).await;
            }
            feed.cancelled().await;
            calls.lock().unwrap().push(Call::Cancel(name));
        });

        Ok(subscription)
    }
}

#[async_trait]
impl LedgerQuery for FakeNetwork {
    async fn query_chain_info(&self, client: &ClientHandle, _peer: &NodeAddress, _channel: &str) -> NetworkResult<ChainInfo> {
        self.record(Call::ChainInfo(client.identity().to_string()));
        Ok(ChainInfo {
            height: 42,
            current_block_hash: "aa".repeat(32),
            previous_block_hash: "bb".repeat(32),
        })
    }

    async fn query_block(&self, _client: &ClientHandle, _peer: &NodeAddress, _channel: &str, number: u64) -> NetworkResult<Block> {
        self.record(Call::Block(number));
        Ok(Block {
            number,
            previous_hash: "bb".repeat(32),
            data_hash: "cc".repeat(32),
            transactions: vec![BlockTransaction {
                tx_id: "abc".to_string(),
                validation_code: VALID_CODE.to_string(),
            }],
        })
    }

    async fn query_block_by_hash(&self, _client: &ClientHandle, _peer: &NodeAddress, _channel: &str, hash: &[u8]) -> NetworkResult<Block> {
        self.record(Call::BlockByHash(hash.to_vec()));
        Ok(Block {
            number: 7,
            previous_hash: "bb".repeat(32),
            data_hash: hex::encode(hash),
            transactions: vec![],
        })
    }
}

pub fn nodes(names: &[&str]) -> Vec<NodeAddress> {
    names.iter().map(|n| NodeAddress::from(*n)).collect()
}

/// Network profile with one channel served by `endorsers`.
pub fn profile(endorsers: &[&str], event_sources: &[&str]) -> NetworkProfile {
    NetworkProfile::default().with_channel(
        CHANNEL,
        ChannelProfile {
            endorsers: nodes(endorsers),
            orderer: NodeAddress::from("orderer0"),
            event_sources: nodes(event_sources),
        },
    )
}

pub fn settings() -> CoordinatorSettings {
    CoordinatorSettings {
        channel: CHANNEL.to_string(),
        chaincode: "fabcar".to_string(),
        confirm_timeout: Duration::from_millis(3000),
        endorse_timeout: Duration::from_secs(5),
        admin_identity: ADMIN.to_string(),
        admin_secret: ADMIN_SECRET.to_string(),
    }
}

pub fn coordinator_with(
    network: Arc<FakeNetwork>,
    profile: NetworkProfile,
    settings: CoordinatorSettings,
) -> TransactionCoordinator {
    let identities = StaticIdentityProvider::new(
        "Org1MSP",
        Arc::new(profile),
        vec![
            (USER.to_string(), SECRET.to_string()),
            (ADMIN.to_string(), ADMIN_SECRET.to_string()),
        ],
    );
    TransactionCoordinator::new(Arc::new(identities), network.clone(), network, settings)
}

pub fn coordinator(network: Arc<FakeNetwork>, endorsers: &[&str]) -> TransactionCoordinator {
    coordinator_with(network, profile(endorsers, &[]), settings())
}
