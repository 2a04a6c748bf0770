//! Typed proxies sharing one daemon connection, against an in-process daemon
//! that relays by destination.

use std::sync::Arc;

use chia_rpc::config::Config;
use chia_rpc::proxies::{DaemonProxy, FarmerProxy, FullNodeProxy, ProxyError, Service, WalletProxy};
use chia_rpc::transport::{EndpointInfo, Message, TransportError};
use chia_rpc::types::{encode_puzzle_hash, service_names};
use chia_rpc::websocket::WebSocketRpcClient;
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message as Frame;

const FARMER_PH: &str = "0x000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f";

fn blockchain_state() -> Value {
    json!({
        "peak": {
            "header_hash": "0x0000000000000000000000000000000000000000000000000000000000000001",
            "prev_hash": "0x0000000000000000000000000000000000000000000000000000000000000000",
            "height": 5_000_000,
            "weight": 123456789012345678901234567890u128,
            "total_iters": 1,
            "signage_point_index": 3,
            "sub_slot_iters": 147849216,
            "farmer_puzzle_hash": FARMER_PH,
            "pool_puzzle_hash": FARMER_PH,
            "required_iters": 1000,
            "deficit": 16,
            "overflow": false,
            "prev_transaction_block_height": 4_999_999
        },
        "genesis_challenge_initialized": true,
        "sync": {"sync_mode": false, "synced": true, "sync_tip_height": 5_000_000, "sync_progress_height": 5_000_000},
        "difficulty": 11264,
        "sub_slot_iters": 147849216,
        "space": 19_000_000_000_000_000_000u128
    })
}

fn relay(request: &Message) -> Value {
    match (request.destination.as_str(), request.command.as_str()) {
        ("daemon", "register_service") | ("daemon", "ping") => json!({"success": true, "value": "pong"}),
        ("chia_full_node", "get_blockchain_state") =>
            json!({"success": true, "blockchain_state": blockchain_state()}),
        ("chia_wallet", "get_wallets") => json!({
            "success": true,
            "wallets": [{"id": 1, "name": "Chia Wallet", "type": 0, "data": ""}]
        }),
        (destination, _) => json!({"success": false, "error": format!("{} is not running", destination)}),
    }
}

async fn spawn_daemon() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(async move {
                let ws = tokio_tungstenite::accept_async(stream).await.expect("handshake");
                let (mut sink, mut source) = ws.split();
                let (tx, mut rx) = mpsc::unbounded_channel::<Message>();

                tokio::spawn(async move {
                    while let Some(message) = rx.recv().await {
                        let text = message.to_json().expect("encode");
                        if sink.send(Frame::Text(text.into())).await.is_err() {
                            break;
                        }
                    }
                });

                while let Some(Ok(frame)) = source.next().await {
                    let Frame::Text(text) = frame else { continue };
                    let request = Message::from_json(text.as_str()).expect("request");
                    let _ = tx.send(Message::response_to(&request, relay(&request)));
                    if request.command == "register_service" {
                        for origin in [service_names::FULL_NODE, service_names::WALLET] {
                            let _ = tx.send(Message::new(
                                "state_changed",
                                json!({"state": "sync_changed"}),
                                service_names::WALLET_UI,
                                origin,
                            ));
                        }
                    }
                }
            });
        }
    });

    format!("ws://{}", addr)
}

#[tokio::test]
async fn test_proxies_share_daemon_connection() {
    let client = Arc::new(WebSocketRpcClient::new(EndpointInfo::new(spawn_daemon().await)));
    client.connect().await.expect("connect");

    let daemon = DaemonProxy::new(client.clone(), service_names::WALLET_UI);
    let full_node: FullNodeProxy = daemon.create_proxy();
    let wallet: WalletProxy = daemon.create_proxy();
    let farmer: FarmerProxy = daemon.create_proxy();

    let mut wallet_changes = wallet.proxy().state_changes().expect("websocket pushes");
    daemon.register_service(service_names::WALLET_UI).await.expect("register");
    let change = wallet_changes.next().await.expect("wallet state change");
    assert_eq!(change.origin, service_names::WALLET);

    let (state, wallets, pong) =
        tokio::join!(full_node.get_blockchain_state(), wallet.get_wallets(None), daemon.ping());
    let state = state.expect("blockchain state");
    let peak = state.peak.expect("peak");
    assert_eq!(peak.height, 5_000_000);
    assert_eq!(peak.weight, 123456789012345678901234567890u128);
    assert_eq!(state.space, 19_000_000_000_000_000_000u128);
    assert_eq!(wallets.expect("wallets")[0].name, "Chia Wallet");
    assert_eq!(pong.expect("ping"), "pong");

    match farmer.get_pool_state().await {
        Err(ProxyError::Transport(TransportError::Rpc(msg))) => assert!(msg.contains("not running")),
        other => panic!("Expected Rpc error, got {:?}", other),
    }
    assert!(!farmer.healthz().await.expect("healthz"));

    let config = Config::from_yaml(
        "selected_network: testnet11\nnetwork_overrides:\n  config:\n    testnet11:\n      address_prefix: txch\n",
        "/tmp/chia",
    )
    .expect("config");
    let address = encode_puzzle_hash(&peak.farmer_puzzle_hash, config.address_prefix()).expect("encode");
    assert!(address.starts_with("txch1"));

    assert_eq!(client.pending_requests(), 0);
    chia_rpc::transport::RpcClient::close(client.as_ref()).await;
    assert!(!client.is_connected());
    let ended = tokio::time::timeout(std::time::Duration::from_secs(2), wallet_changes.next())
        .await
        .expect("state changes end with the connection");
    assert!(ended.is_none());
}
