use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use ledger_api::{create_router, AppState};
use ledger_network::{
    ChannelProfile, ClientHandle, CommitNotification, LedgerQuery, NetworkError, NetworkProfile,
    NetworkResult, NodeGateway, OrdererReply, StaticIdentityProvider, Subscription,
    TransactionEnvelope, VALID_CODE,
};
use ledger_orchestrator::{CoordinatorSettings, TransactionCoordinator};
use ledger_types::{
    Block, ChainInfo, EndorsementResponse, NodeAddress, ProposalContext, ProposalCreator,
    ProposedOperation, TransactionId,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

/// Network where everything succeeds except the `failing` function.
struct StubNetwork;

#[async_trait]
impl NodeGateway for StubNetwork {
    fn prepare_proposal(&self, _client: &ClientHandle, operation: &ProposedOperation) -> NetworkResult<ProposalContext> {
        Ok(ProposalContext {
            tx_id: operation.tx_id.clone(),
            channel: operation.channel.clone(),
            creator: ProposalCreator::default(),
            bytes: operation.function.as_bytes().to_vec(),
        })
    }

    async fn send_proposal(&self, target: &NodeAddress, proposal: &ProposalContext) -> NetworkResult<EndorsementResponse> {
        let status = if proposal.bytes == b"failing" { 500 } else { 200 };
        Ok(EndorsementResponse::new(target.clone(), status, b"{\"color\":\"red\"}".to_vec(), vec![1]))
    }

    async fn send_to_orderer(&self, _orderer: &NodeAddress, _envelope: &TransactionEnvelope) -> NetworkResult<OrdererReply> {
        Ok(OrdererReply {
            status: "SUCCESS".to_string(),
            info: None,
        })
    }

    async fn subscribe(&self, node: &NodeAddress, _channel: &str, tx_id: &TransactionId) -> NetworkResult<Subscription> {
        let (subscription, feed) = Subscription::channel(node.clone(), tx_id.clone());
        tokio::spawn(async move {
            feed.deliver(CommitNotification::Committed {
                validation_code: VALID_CODE.to_string(),
                block_number: 11,
            })
            .await;
        });
        Ok(subscription)
    }
}

#[async_trait]
impl LedgerQuery for StubNetwork {
    async fn query_chain_info(&self, _client: &ClientHandle, _peer: &NodeAddress, _channel: &str) -> NetworkResult<ChainInfo> {
        Ok(ChainInfo {
            height: 12,
            current_block_hash: "aa".to_string(),
            previous_block_hash: "bb".to_string(),
        })
    }

    async fn query_block(&self, _client: &ClientHandle, peer: &NodeAddress, _channel: &str, number: u64) -> NetworkResult<Block> {
        if number > 11 {
            return Err(NetworkError::RequestRejected {
                node: peer.clone(),
                status: 404,
                body: "block not found".to_string(),
            });
        }
        Ok(Block {
            number,
            previous_hash: "bb".to_string(),
            data_hash: "cc".to_string(),
            transactions: vec![],
        })
    }

    async fn query_block_by_hash(&self, _client: &ClientHandle, _peer: &NodeAddress, _channel: &str, hash: &[u8]) -> NetworkResult<Block> {
        Ok(Block {
            number: 5,
            previous_hash: "bb".to_string(),
            data_hash: hex_string(hash),
            transactions: vec![],
        })
    }
}

fn hex_string(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn app() -> axum::Router {
    let profile = NetworkProfile::default().with_channel(
        "mychannel",
        ChannelProfile {
            endorsers: vec![NodeAddress::from("peer0"), NodeAddress::from("peer1")],
            orderer: NodeAddress::from("orderer0"),
            event_sources: vec![],
        },
    );
    let identities = StaticIdentityProvider::new(
        "Org1MSP",
        Arc::new(profile),
        vec![
            ("user1".to_string(), "pw".to_string()),
            ("admin".to_string(), "adminpw".to_string()),
        ],
    );
    let network = Arc::new(StubNetwork);
    let coordinator = TransactionCoordinator::new(
        Arc::new(identities),
        network.clone(),
        network,
        CoordinatorSettings {
            confirm_timeout: Duration::from_secs(2),
            admin_secret: "adminpw".to_string(),
            ..CoordinatorSettings::default()
        },
    );
    create_router(AppState::new(coordinator))
}

async fn send(request: Request<Body>) -> (StatusCode, Value) {
    let response = app().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_health() {
    let (status, body) = send(get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["channel"], "mychannel");
}

#[tokio::test]
async fn test_invoke_success() {
    let (status, body) = send(post_json(
        "/invoke",
        json!({ "enrollmentName": "user1", "enrollmentSecrets": "pw", "fcn": "createCar", "args": ["CAR1"] }),
    ))
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["commit_status"], "SUCCESS");
    assert_eq!(body["events"].as_array().unwrap().len(), 2);
    assert_eq!(body["events"][0]["block_number"], 11);
}

#[tokio::test]
async fn test_invoke_endorsement_rejected() {
    let (status, body) = send(post_json(
        "/invoke",
        json!({ "enrollmentName": "user1", "enrollmentSecrets": "pw", "fcn": "failing" }),
    ))
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["status"], "failure");
    assert_eq!(body["stage"], "evaluating");
}

#[tokio::test]
async fn test_invoke_bad_credentials() {
    let (status, body) = send(post_json(
        "/invoke",
        json!({ "enrollmentName": "user1", "enrollmentSecrets": "nope", "fcn": "createCar" }),
    ))
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["stage"], "enrolling");
    assert!(body.get("tx_id").is_none());
}

#[tokio::test]
async fn test_invoke_missing_fcn() {
    let (status, body) = send(post_json(
        "/invoke",
        json!({ "enrollmentName": "user1", "enrollmentSecrets": "pw", "fcn": "" }),
    ))
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["type"], "bad_request");
}

#[tokio::test]
async fn test_query() {
    let (status, body) = send(post_json(
        "/query",
        json!({ "enrollmentName": "user1", "enrollmentSecrets": "pw", "fcn": "queryCar", "args": ["CAR1"] }),
    ))
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["responses"][0], "query: CAR1 result: {\"color\":\"red\"}");
    assert_eq!(body["responses"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_chain_info() {
    let (status, body) = send(get("/blocks")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["height"], 12);
}

#[tokio::test]
async fn test_block_by_number_and_missing_block() {
    let (status, body) = send(get("/blocks/3")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["number"], 3);

    let (status, body) = send(get("/blocks/99")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["type"], "not_found");
}

#[tokio::test]
async fn test_block_by_hash() {
    let (status, body) = send(get("/transactions/0aff")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data_hash"], "0aff");

    let (status, _) = send(get("/transactions/xyz")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let response = app().oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
