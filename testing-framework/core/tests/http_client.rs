use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{Arc, Mutex},
};

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::{Value, json};
use spark_core::{
    ChainClient as _, ChainError, Denomination, HttpChainClient, PrivateKey,
    chain::{GET_BALANCE, SEND_TRANSACTION},
};
use tokio::net::TcpListener;

type TestResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[derive(Clone, Default)]
struct FakeNode {
    balances: Arc<Mutex<HashMap<String, u128>>>,
    transfers: Arc<Mutex<Vec<Value>>>,
}

async fn get_balance(
    State(node): State<FakeNode>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let Some(address) = params.get("address") else {
        return (StatusCode::BAD_REQUEST, "missing address").into_response();
    };
    let balance = node
        .balances
        .lock()
        .unwrap()
        .get(address)
        .copied()
        .unwrap_or_default();
    Json(json!({ "balance": balance })).into_response()
}

async fn send_transaction(State(node): State<FakeNode>, Json(body): Json<Value>) -> Json<Value> {
    let accepted = body["amount"].as_u64().is_some_and(|amount| amount > 0);
    node.transfers.lock().unwrap().push(body);
    Json(json!({ "result": accepted, "txid": "abc" }))
}

async fn spawn_node(node: FakeNode) -> Result<SocketAddr, std::io::Error> {
    let app = Router::new()
        .route(GET_BALANCE, get(get_balance))
        .route(SEND_TRANSACTION, post(send_transaction))
        .route("/broken/wallet/getbalance", get(|| async { StatusCode::BAD_GATEWAY }))
        .with_state(node);

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(addr)
}

fn client(base: &str) -> HttpChainClient {
    HttpChainClient::new(
        base.parse().expect("valid url"),
        PrivateKey::from_bytes([1; 32]),
        Denomination::default(),
    )
}

#[tokio::test]
async fn reads_balances_and_submits_transfers() -> TestResult {
    let node = FakeNode::default();
    let addr = spawn_node(node.clone()).await?;
    let client = client(&format!("http://{addr}"));

    let recipient = client.address_from_private_key(&PrivateKey::from_bytes([2; 32]));
    node.balances
        .lock()
        .unwrap()
        .insert(recipient.to_string(), 42);

    assert_eq!(client.get_balance(&recipient).await?, 42);

    let receipt = client.send_transaction(&recipient, 5_000_000).await?;
    assert!(receipt.result);
    assert_eq!(receipt.txid.as_deref(), Some("abc"));

    let transfers = node.transfers.lock().unwrap().clone();
    assert_eq!(transfers.len(), 1);
    assert_eq!(transfers[0]["to"], recipient.to_string());
    assert_eq!(transfers[0]["amount"], 5_000_000);
    assert_eq!(transfers[0]["ownerKey"], hex::encode([1u8; 32]));
    Ok(())
}

#[tokio::test]
async fn falsy_send_result_is_reported_not_raised() -> TestResult {
    let addr = spawn_node(FakeNode::default()).await?;
    let client = client(&format!("http://{addr}"));
    let recipient = client.default_address();

    let receipt = client.send_transaction(&recipient, 0).await?;
    assert!(!receipt.result);
    Ok(())
}

#[tokio::test]
async fn error_status_surfaces_as_chain_error() -> TestResult {
    let addr = spawn_node(FakeNode::default()).await?;
    let client = client(&format!("http://{addr}/broken/"));

    let err = client
        .get_balance(&client.default_address())
        .await
        .unwrap_err();
    assert!(matches!(err, ChainError::Status { status: 502, .. }));
    Ok(())
}

#[tokio::test]
async fn unreachable_node_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client(&format!("http://{addr}"));
    let err = client
        .get_balance(&client.default_address())
        .await
        .unwrap_err();
    assert!(matches!(err, ChainError::Request(_)));
}
