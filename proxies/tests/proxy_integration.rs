//! Proxies against a scripted in-memory client.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use proxies::{
    Change, DaemonProxy, DataLayerProxy, FullNodeProxy, HarvesterProxy, ProxyError, Service,
    WalletProxy,
};
use serde_json::{json, Value};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use transport::{DynRpcClient, EndpointInfo, Message, RpcClient, TransportError};
use types::{Bytes32, NodeType, WalletType};

const HASH: &str = "0x000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f";
const ADDRESS: &str = "xch1qqqsyqcyq5rqwzqfpg9scrgwpugpzysnzs23v9ccrydpk8qarc0srg6dkm";

/// Answers each command with a canned `data`; unknown commands fail and
/// `hang` never answers.
struct ScriptedClient {
    endpoint: EndpointInfo,
    replies: HashMap<&'static str, Value>,
    sent: Mutex<Vec<Message>>,
    events: Option<broadcast::Sender<Message>>,
}

impl ScriptedClient {
    fn new(replies: Vec<(&'static str, Value)>) -> Arc<Self> {
        Arc::new(Self {
            endpoint: EndpointInfo::new("scripted://"),
            replies: replies.into_iter().collect(),
            sent: Mutex::new(Vec::new()),
            events: None,
        })
    }

    fn with_events(replies: Vec<(&'static str, Value)>) -> (Arc<Self>, broadcast::Sender<Message>) {
        let (tx, _) = broadcast::channel(16);
        let client = Arc::new(Self {
            endpoint: EndpointInfo::new("scripted://"),
            replies: replies.into_iter().collect(),
            sent: Mutex::new(Vec::new()),
            events: Some(tx.clone()),
        });
        (client, tx)
    }

    fn sent(&self) -> Vec<Message> { self.sent.lock().expect("sent lock").clone() }
}

#[async_trait]
impl RpcClient for ScriptedClient {
    async fn send_message(&self, message: Message) -> Result<(), TransportError> {
        self.sent.lock().expect("sent lock").push(message);
        Ok(())
    }

    async fn post_message(
        &self,
        message: Message,
        cancel: &CancellationToken,
    ) -> Result<Message, TransportError> {
        self.sent.lock().expect("sent lock").push(message.clone());
        if message.command == "hang" {
            cancel.cancelled().await;
            return Err(TransportError::Cancelled);
        }
        let data = self.replies.get(message.command.as_str()).cloned().unwrap_or_else(
            || json!({"success": false, "error": format!("unknown command {}", message.command)}),
        );
        Ok(Message::response_to(&message, data))
    }

    fn endpoint(&self) -> &EndpointInfo { &self.endpoint }

    fn subscribe(&self) -> Option<broadcast::Receiver<Message>> {
        self.events.as_ref().map(|tx| tx.subscribe())
    }

    async fn close(&self) {}
}

fn dyn_client(client: &Arc<ScriptedClient>) -> DynRpcClient { client.clone() }

#[tokio::test]
async fn test_full_node_blockchain_state() {
    let client = ScriptedClient::new(vec![(
        "get_blockchain_state",
        json!({
            "success": true,
            "blockchain_state": {
                "peak": null,
                "genesis_challenge_initialized": true,
                "sync": {"sync_mode": false, "synced": true, "sync_tip_height": 0, "sync_progress_height": 0},
                "difficulty": 1024,
                "sub_slot_iters": 147849216,
                "space": 0
            }
        }),
    )]);
    let full_node = FullNodeProxy::new(dyn_client(&client), "tests");

    let state = full_node.get_blockchain_state().await.expect("state");
    assert!(state.sync.synced);
    assert_eq!(state.difficulty, 1024);

    let sent = client.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].command, "get_blockchain_state");
    assert_eq!(sent[0].destination, "chia_full_node");
    assert_eq!(sent[0].origin, "tests");
    assert_eq!(sent[0].request_id.len(), 64);
}

#[tokio::test]
async fn test_daemon_routes_created_proxies() {
    let client = ScriptedClient::new(vec![
        ("ping", json!({"success": true, "value": "pong"})),
        ("get_height_info", json!({"success": true, "height": 4_200_000})),
        ("get_version", json!({"success": true, "version": "2.4.4rc1"})),
    ]);
    let daemon = DaemonProxy::new(dyn_client(&client), "tests");

    assert_eq!(daemon.ping().await.expect("ping"), "pong");
    let version = daemon.get_version().await.expect("version");
    assert!(version.at_least(2, 4, 4));
    assert!(!version.is_release());

    let wallet: WalletProxy = daemon.create_proxy();
    assert_eq!(wallet.get_height_info().await.expect("height"), 4_200_000);

    let destinations: Vec<String> = client.sent().into_iter().map(|m| m.destination).collect();
    assert_eq!(destinations, vec!["daemon", "daemon", "chia_wallet"]);
}

#[tokio::test]
async fn test_rpc_failure_is_surfaced() {
    let client = ScriptedClient::new(vec![(
        "get_block_record",
        json!({"success": false, "error": "Block 0x00 not found"}),
    )]);
    let full_node = FullNodeProxy::new(dyn_client(&client), "tests");
    let hash: Bytes32 = HASH.parse().expect("hash");

    match full_node.get_block_record(&hash).await {
        Err(ProxyError::Transport(TransportError::Rpc(msg))) => assert!(msg.contains("not found")),
        other => panic!("Expected Rpc error, got {:?}", other),
    }
    assert_eq!(client.sent()[0].data, json!({"header_hash": HASH}));
}

#[tokio::test]
async fn test_missing_and_malformed_fields() {
    let client = ScriptedClient::new(vec![
        ("get_routes", json!({"success": true})),
        ("get_connections", json!({"success": true, "connections": [{"node_id": "nope"}]})),
        ("get_version", json!({"success": true, "version": "unknown"})),
    ]);
    let full_node = FullNodeProxy::new(dyn_client(&client), "tests");

    match full_node.get_routes().await {
        Err(ProxyError::MissingField { command, field }) => {
            assert_eq!(command, "get_routes");
            assert_eq!(field, "routes");
        }
        other => panic!("Expected MissingField, got {:?}", other),
    }

    let result = full_node.get_connections(Some(NodeType::Wallet)).await;
    assert!(matches!(result, Err(ProxyError::Decode { ref field, .. }) if field == "connections"));
    assert_eq!(client.sent()[1].data, json!({"node_type": 6}));

    let daemon = DaemonProxy::new(dyn_client(&client), "tests");
    assert!(matches!(daemon.get_version().await, Err(ProxyError::Decode { .. })));
}

#[tokio::test]
async fn test_invalid_arguments_are_not_sent() {
    let client = ScriptedClient::new(vec![]);
    let full_node = FullNodeProxy::new(dyn_client(&client), "tests");
    let wallet = WalletProxy::new(dyn_client(&client), "tests");
    let harvester = HarvesterProxy::new(dyn_client(&client), "tests");
    let data_layer = DataLayerProxy::new(dyn_client(&client), "tests");
    let id: Bytes32 = HASH.parse().expect("hash");

    assert!(matches!(full_node.get_block_records(10, 5).await, Err(ProxyError::InvalidArgument(_))));
    assert!(matches!(full_node.get_fee_estimate(&[], 0).await, Err(ProxyError::InvalidArgument(_))));
    assert!(matches!(
        wallet.wallet(1).send_transaction("not-an-address", 1, 0, &[]).await,
        Err(ProxyError::InvalidArgument(_))
    ));
    assert!(matches!(
        wallet.wallet(1).send_transaction(ADDRESS, 0, 0, &[]).await,
        Err(ProxyError::InvalidArgument(_))
    ));
    assert!(matches!(wallet.push_tx("0xabc").await, Err(ProxyError::InvalidArgument(_))));
    assert!(matches!(harvester.add_plot_directory(" ").await, Err(ProxyError::InvalidArgument(_))));
    assert!(matches!(data_layer.batch_update(&id, &[], 0).await, Err(ProxyError::InvalidArgument(_))));
    assert!(client.sent().is_empty());
}

#[tokio::test]
async fn test_wallet_commands() {
    let client = ScriptedClient::new(vec![
        (
            "get_wallets",
            json!({"success": true, "wallets": [{"id": 2, "name": "CAT", "type": 6, "data": "ab"}]}),
        ),
        ("cat_get_asset_id", json!({"success": true, "asset_id": "ab", "wallet_id": 2})),
        ("get_transaction_count", json!({"success": true, "count": 7, "wallet_id": 2})),
    ]);
    let wallet = WalletProxy::new(dyn_client(&client), "tests");

    let wallets = wallet.get_wallets(Some(WalletType::Cat)).await.expect("wallets");
    assert_eq!(wallets[0].wallet_type, WalletType::Cat);

    let cat = wallet.cat_wallet(wallets[0].id);
    assert_eq!(cat.get_asset_id().await.expect("asset id"), "ab");
    assert_eq!(cat.wallet().get_transaction_count().await.expect("count"), 7);

    let sent = client.sent();
    assert_eq!(sent[0].data, json!({"include_data": true, "type": 6}));
    assert_eq!(sent[1].data, json!({"wallet_id": 2}));
    assert!(sent.iter().all(|m| m.destination == "chia_wallet"));
}

#[tokio::test]
async fn test_data_layer_root_and_changes() {
    let client = ScriptedClient::new(vec![
        ("get_root", json!({"success": true, "hash": null, "confirmed": true, "timestamp": 1_700_000_000})),
        ("batch_update", json!({"success": true, "tx_id": HASH})),
    ]);
    let data_layer = DataLayerProxy::new(dyn_client(&client), "tests");
    let id: Bytes32 = HASH.parse().expect("hash");

    let root = data_layer.get_root(&id).await.expect("root");
    assert_eq!(root.id, Some(id));
    assert!(root.hash.is_none());

    let tx_id = data_layer.batch_update(&id, &[Change::insert(b"a", b"b")], 0).await.expect("tx");
    assert_eq!(tx_id, id);
    assert_eq!(client.sent()[1].data["changelist"][0]["action"], "insert");
}

#[tokio::test]
async fn test_healthz() {
    let healthy = ScriptedClient::new(vec![("healthz", json!({"success": true}))]);
    let full_node = FullNodeProxy::new(dyn_client(&healthy), "tests");
    assert!(full_node.healthz().await.expect("healthz"));

    let unhealthy = ScriptedClient::new(vec![]);
    let full_node = FullNodeProxy::new(dyn_client(&unhealthy), "tests");
    assert!(!full_node.healthz().await.expect("healthz"));
}

#[tokio::test(start_paused = true)]
async fn test_request_timeout() {
    let client = ScriptedClient::new(vec![]);
    let proxy = proxies::ServiceProxy::new(dyn_client(&client), "chia_full_node", "tests")
        .with_timeout(Duration::from_secs(5));

    match proxy.send("hang", json!({})).await {
        Err(ProxyError::Transport(TransportError::Timeout(after))) => {
            assert_eq!(after, Duration::from_secs(5))
        }
        other => panic!("Expected Timeout, got {:?}", other),
    }
}

#[tokio::test]
async fn test_cancel_all() {
    let client = ScriptedClient::new(vec![]);
    let proxy = proxies::ServiceProxy::new(dyn_client(&client), "chia_full_node", "tests");
    let clone = proxy.clone();

    let (result, _) = tokio::join!(proxy.send("hang", json!({})), async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        clone.cancel_all();
    });
    assert!(matches!(result, Err(ProxyError::Transport(TransportError::Cancelled))));
}

#[tokio::test]
async fn test_state_changes_filtered_by_service() {
    let (client, events) = ScriptedClient::with_events(vec![]);
    let wallet = WalletProxy::new(dyn_client(&client), "tests");
    let mut changes = wallet.proxy().state_changes().expect("push channel");

    let event = |command: &str, origin: &str| {
        Message::new(command, json!({"state": "sync_changed"}), "wallet_ui", origin)
    };
    events.send(event("state_changed", "chia_full_node")).expect("send");
    events.send(event("keyring_status_changed", "chia_wallet")).expect("send");
    events.send(event("state_changed", "chia_wallet")).expect("send");
    drop(events);

    let change = changes.next().await.expect("wallet state change");
    assert_eq!(change.origin, "chia_wallet");
    assert_eq!(change.data["state"], "sync_changed");

    // the scripted client still holds a sender, so nothing else arrives
    let next = tokio::time::timeout(Duration::from_millis(50), changes.next()).await;
    assert!(next.is_err());

    let http_like = ScriptedClient::new(vec![]);
    let full_node = FullNodeProxy::new(dyn_client(&http_like), "tests");
    assert!(full_node.proxy().state_changes().is_none());
}
