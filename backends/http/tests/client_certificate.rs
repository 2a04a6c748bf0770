//! HTTPS against an in-process service that requires a client certificate
//! signed by the node's private CA.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chia_rpc_http::HttpRpcClient;
use rcgen::{
    BasicConstraints, Certificate, CertificateParams, DnType, ExtendedKeyUsagePurpose, IsCa,
    KeyPair, KeyUsagePurpose,
};
use rustls::pki_types::{PrivateKeyDer, PrivatePkcs8KeyDer};
use rustls::server::WebPkiClientVerifier;
use rustls::{RootCertStore, ServerConfig};
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_rustls::TlsAcceptor;
use tokio_util::sync::CancellationToken;
use transport::{EndpointInfo, Message, RpcClient, TransportError};

const REPLY: &str = r#"{"success": true, "network_name": "mainnet", "network_prefix": "xch"}"#;

struct PrivateCa {
    cert: Certificate,
    key: KeyPair,
}

impl PrivateCa {
    fn new() -> Self {
        let key = KeyPair::generate().expect("ca key");
        let mut params = CertificateParams::new(Vec::<String>::new()).expect("ca params");
        params.distinguished_name.push(DnType::CommonName, "Chia CA");
        params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
        params.key_usages = vec![KeyUsagePurpose::KeyCertSign, KeyUsagePurpose::DigitalSignature];
        let cert = params.self_signed(&key).expect("ca certificate");
        Self { cert, key }
    }

    fn issue(&self, purpose: ExtendedKeyUsagePurpose) -> (Certificate, KeyPair) {
        let key = KeyPair::generate().expect("leaf key");
        let mut params = CertificateParams::new(vec!["localhost".to_string()]).expect("leaf params");
        params.distinguished_name.push(DnType::CommonName, "Chia");
        params.extended_key_usages = vec![purpose];
        let cert = params.signed_by(&key, &self.cert, &self.key).expect("leaf certificate");
        (cert, key)
    }

    fn write_client_pair(&self, dir: &Path) -> (PathBuf, PathBuf) {
        let (cert, key) = self.issue(ExtendedKeyUsagePurpose::ClientAuth);
        let (cert_path, key_path) =
            (dir.join("private_full_node.crt"), dir.join("private_full_node.key"));
        std::fs::write(&cert_path, cert.pem()).expect("write certificate");
        std::fs::write(&key_path, key.serialize_pem()).expect("write key");
        (cert_path, key_path)
    }

    fn server_config(&self) -> Arc<ServerConfig> {
        let provider = Arc::new(rustls::crypto::ring::default_provider());
        let mut roots = RootCertStore::empty();
        roots.add(self.cert.der().clone()).expect("ca root");
        let verifier = WebPkiClientVerifier::builder_with_provider(Arc::new(roots), Arc::clone(&provider))
            .build()
            .expect("client verifier");

        let (cert, key) = self.issue(ExtendedKeyUsagePurpose::ServerAuth);
        let key = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(key.serialize_der()));
        let config = ServerConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()
            .expect("protocol versions")
            .with_client_cert_verifier(verifier)
            .with_single_cert(vec![cert.der().clone()], key)
            .expect("server certificate");
        Arc::new(config)
    }
}

/// Serves [`REPLY`] to every request that completes the TLS handshake.
async fn serve(config: Arc<ServerConfig>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let acceptor = TlsAcceptor::from(config);

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let acceptor = acceptor.clone();
            tokio::spawn(async move {
                let Ok(mut tls) = acceptor.accept(stream).await else { return };
                let mut buf = Vec::new();
                let mut chunk = [0u8; 4096];
                let (head_len, content_length) = loop {
                    let Ok(n) = tls.read(&mut chunk).await else { return };
                    if n == 0 {
                        return;
                    }
                    buf.extend_from_slice(&chunk[..n]);
                    let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
                        continue;
                    };
                    let head = String::from_utf8_lossy(&buf[..pos]).to_string();
                    let length = head
                        .lines()
                        .find_map(|line| {
                            let (name, value) = line.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    break (pos + 4, length);
                };
                while buf.len() < head_len + content_length {
                    match tls.read(&mut chunk).await {
                        Ok(n) if n > 0 => buf.extend_from_slice(&chunk[..n]),
                        _ => break,
                    }
                }

                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    REPLY.len(),
                    REPLY
                );
                let _ = tls.write_all(response.as_bytes()).await;
                let _ = tls.shutdown().await;
            });
        }
    });

    format!("https://127.0.0.1:{}", addr.port())
}

fn request() -> Message { Message::new("get_network_info", json!({}), "chia_full_node", "tests") }

#[tokio::test]
async fn test_https_with_client_certificate() {
    let ca = PrivateCa::new();
    let dir = tempfile::tempdir().expect("Failed to create temporary directory");
    let (cert, key) = ca.write_client_pair(dir.path());
    let uri = serve(ca.server_config()).await;

    let client = HttpRpcClient::new(EndpointInfo::new(uri).with_certificate(cert, key))
        .expect("client with certificate");
    let response =
        client.post_message(request(), &CancellationToken::new()).await.expect("response");
    assert_eq!(response.into_data().expect("success")["network_name"], "mainnet");
}

#[tokio::test]
async fn test_https_without_client_certificate_is_rejected() {
    let ca = PrivateCa::new();
    let uri = serve(ca.server_config()).await;

    let client = HttpRpcClient::new(EndpointInfo::new(uri)).expect("client");
    let result = client.post_message(request(), &CancellationToken::new()).await;
    assert!(matches!(result, Err(TransportError::Http(_))), "got {:?}", result);
}
