use std::fs;
use std::path::PathBuf;

use config::{Config, ConfigError, ROOT_ENV};
use serial_test::serial;

const NODE_CONFIG: &str = r#"
self_hostname: 127.0.0.1
daemon_port: 55400
daemon_ssl:
  private_crt: config/ssl/daemon/private_daemon.crt
  private_key: config/ssl/daemon/private_daemon.key
selected_network: testnet11
network_overrides:
  config:
    mainnet:
      address_prefix: xch
    testnet11:
      address_prefix: txch
logging:
  log_level: INFO
  log_stdout: false
full_node:
  port: 8444
  rpc_port: 8555
  ssl:
    private_crt: config/ssl/full_node/private_full_node.crt
    private_key: config/ssl/full_node/private_full_node.key
wallet:
  rpc_port: 9256
  ssl:
    private_crt: /etc/chia/ssl/private_wallet.crt
    private_key: /etc/chia/ssl/private_wallet.key
farmer:
  rpc_port: 8559
harvester:
  ssl:
    private_crt: config/ssl/harvester/private_harvester.crt
    private_key: config/ssl/harvester/private_harvester.key
seeder:
  port: 8444
  crawler:
    rpc_port: 8561
    ssl:
      private_crt: config/ssl/crawler/private_crawler.crt
      private_key: config/ssl/crawler/private_crawler.key
"#;

fn write_root() -> tempfile::TempDir {
    let root = tempfile::tempdir().expect("Failed to create temporary root");
    fs::create_dir_all(root.path().join("config")).expect("Failed to create config directory");
    fs::write(root.path().join("config").join("config.yaml"), NODE_CONFIG)
        .expect("Failed to write config.yaml");
    root
}

#[test]
fn test_open_and_resolve_endpoints() {
    let root = write_root();
    let config = Config::open(root.path()).expect("Failed to open config");

    assert_eq!(config.self_hostname(), "127.0.0.1");
    assert_eq!(config.selected_network(), Some("testnet11"));
    assert_eq!(config.address_prefix(), "txch");
    assert_eq!(config.log_level(), "info");

    let daemon = config.endpoint("daemon").expect("daemon endpoint");
    assert_eq!(daemon.uri, "wss://127.0.0.1:55400");
    assert_eq!(
        daemon.cert_path,
        Some(root.path().join("config/ssl/daemon/private_daemon.crt"))
    );

    let full_node = config.endpoint("full_node").expect("full node endpoint");
    assert_eq!(full_node.uri, "https://127.0.0.1:8555");
    assert_eq!(
        full_node.key_path,
        Some(root.path().join("config/ssl/full_node/private_full_node.key"))
    );
    assert_eq!(config.endpoint("chia_full_node").expect("daemon service name"), full_node);

    // absolute paths are left alone
    let wallet = config.endpoint("wallet").expect("wallet endpoint");
    assert_eq!(wallet.cert_path, Some(PathBuf::from("/etc/chia/ssl/private_wallet.crt")));

    let crawler = config.endpoint("crawler").expect("crawler endpoint");
    assert_eq!(crawler.uri, "https://127.0.0.1:8561");
}

#[test]
fn test_incomplete_sections() {
    let root = write_root();
    let config = Config::open(root.path()).expect("Failed to open config");

    match config.endpoint("farmer") {
        Err(ConfigError::MissingSection(name)) => assert_eq!(name, "farmer.ssl"),
        other => panic!("Expected MissingSection, got {:?}", other),
    }
    match config.endpoint("harvester") {
        Err(ConfigError::MissingSection(name)) => assert_eq!(name, "harvester.rpc_port"),
        other => panic!("Expected MissingSection, got {:?}", other),
    }
    assert!(matches!(config.endpoint("data_layer"), Err(ConfigError::MissingSection(_))));
}

#[test]
fn test_from_file_infers_root() {
    let root = write_root();
    let path = root.path().join("config").join("config.yaml");

    let config = Config::from_file(&path).expect("Failed to load config from file");
    assert_eq!(config.root(), root.path());
    assert!(config.section("seeder").is_some());
    assert!(config.section("introducer").is_none());
}

#[test]
fn test_read_and_parse_errors() {
    let root = tempfile::tempdir().expect("Failed to create temporary root");
    match Config::open(root.path()) {
        Err(ConfigError::FileRead { path, .. }) => assert!(path.ends_with("config/config.yaml")),
        other => panic!("Expected FileRead error, got {:?}", other),
    }

    fs::create_dir_all(root.path().join("config")).expect("Failed to create config directory");
    fs::write(root.path().join("config").join("config.yaml"), "daemon_port: [not, a, port]")
        .expect("Failed to write invalid config");
    assert!(matches!(Config::open(root.path()), Err(ConfigError::Parse(_))));
}

#[test]
#[serial]
fn test_default_root_env() {
    let previous = std::env::var_os(ROOT_ENV);

    std::env::set_var(ROOT_ENV, "/var/lib/chia/testnet");
    let root = Config::default_root().expect("root from environment");
    assert_eq!(root, PathBuf::from("/var/lib/chia/testnet"));

    std::env::remove_var(ROOT_ENV);
    if let Ok(root) = Config::default_root() {
        assert!(root.ends_with(".chia/mainnet"));
    }

    match previous {
        Some(value) => std::env::set_var(ROOT_ENV, value),
        None => std::env::remove_var(ROOT_ENV),
    }
}
