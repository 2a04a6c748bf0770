#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Node configuration
//!
//! Reads the node's own `config.yaml` (found under `<root>/config/`) and turns
//! it into the connection details the transports need: host, port and the
//! client certificate each service expects.
//!
//! Only the handful of keys a client cares about are typed. The rest of the
//! file stays available as raw YAML through [`Config::section`].

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;
use transport::EndpointInfo;

/// Environment variable overriding the node root directory
pub const ROOT_ENV: &str = "CHIA_ROOT";

/// Errors that can occur when loading configuration or resolving endpoints
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        /// File that could not be read
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },
    /// Failed to parse the YAML configuration
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
    /// A section required for the requested service is absent
    #[error("Missing config section: {0}")]
    MissingSection(String),
    /// The service name is not one the node runs
    #[error("Unknown service: {0}")]
    UnknownService(String),
    /// Neither `CHIA_ROOT` nor a home directory is available
    #[error("Could not determine the node root directory")]
    RootUnavailable,
}

/// Result alias for this crate
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Certificate and key paths of a TLS section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SslPaths {
    /// Certificate signed by the node's private CA
    pub private_crt: PathBuf,
    /// Key of `private_crt`
    pub private_key: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
struct ServiceSection {
    rpc_port: Option<u16>,
    ssl: Option<SslPaths>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct NetworkConfig {
    address_prefix: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct NetworkOverrides {
    #[serde(default)]
    config: std::collections::BTreeMap<String, NetworkConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct LoggingSection {
    log_level: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct Settings {
    #[serde(default = "default_hostname")]
    self_hostname: String,
    #[serde(default = "default_daemon_port")]
    daemon_port: u16,
    daemon_ssl: Option<SslPaths>,
    selected_network: Option<String>,
    #[serde(default)]
    network_overrides: NetworkOverrides,
    #[serde(default)]
    logging: LoggingSection,
}

fn default_hostname() -> String { "localhost".to_string() }

fn default_daemon_port() -> u16 { 55400 }

/// A loaded node configuration.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    settings: Settings,
    raw: serde_yaml::Value,
}

impl Config {
    /// Load `<root>/config/config.yaml`.
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref();
        let path = root.join("config").join("config.yaml");
        let contents = std::fs::read_to_string(&path)
            .map_err(|source| ConfigError::FileRead { path: path.clone(), source })?;
        tracing::debug!(path = %path.display(), "loaded node config");
        Self::from_yaml(&contents, root)
    }

    /// Load an explicit config file.
    ///
    /// The root is inferred from the file location: a file inside a
    /// `config` directory has that directory's parent as root.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::FileRead { path: path.to_path_buf(), source })?;
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let root = match dir.file_name() {
            Some(name) if name == "config" => dir.parent().unwrap_or(dir),
            _ => dir,
        };
        Self::from_yaml(&contents, root)
    }

    /// Parse YAML text; relative certificate paths resolve against `root`.
    pub fn from_yaml<P: Into<PathBuf>>(contents: &str, root: P) -> Result<Self> {
        let raw: serde_yaml::Value = serde_yaml::from_str(contents)?;
        let settings: Settings = serde_yaml::from_value(raw.clone())?;
        Ok(Self { root: root.into(), settings, raw })
    }

    /// `$CHIA_ROOT` when set, else `~/.chia/mainnet`.
    pub fn default_root() -> Result<PathBuf> {
        Self::default_root_internal(std::env::var(ROOT_ENV).ok(), dirs::home_dir())
    }

    fn default_root_internal(env_root: Option<String>, home: Option<PathBuf>) -> Result<PathBuf> {
        match env_root.filter(|r| !r.trim().is_empty()) {
            Some(root) => match root.strip_prefix("~/") {
                Some(rest) => Ok(home.ok_or(ConfigError::RootUnavailable)?.join(rest)),
                None => Ok(PathBuf::from(root)),
            },
            None => Ok(home.ok_or(ConfigError::RootUnavailable)?.join(".chia").join("mainnet")),
        }
    }

    /// Root directory this configuration belongs to.
    pub fn root(&self) -> &Path { &self.root }

    /// Host every local service listens on.
    pub fn self_hostname(&self) -> &str { &self.settings.self_hostname }

    /// Name of the selected network, if the file names one.
    pub fn selected_network(&self) -> Option<&str> { self.settings.selected_network.as_deref() }

    /// Address prefix of the selected network, `xch` when unspecified.
    pub fn address_prefix(&self) -> &str {
        self.settings
            .selected_network
            .as_ref()
            .and_then(|net| self.settings.network_overrides.config.get(net))
            .and_then(|net| net.address_prefix.as_deref())
            .unwrap_or("xch")
    }

    /// The node's `logging.log_level` translated to a `tracing` level name.
    pub fn log_level(&self) -> &'static str {
        match self.settings.logging.log_level.as_deref().map(str::to_ascii_uppercase).as_deref()
        {
            Some("CRITICAL") | Some("ERROR") => "error",
            Some("INFO") => "info",
            Some("DEBUG") => "debug",
            Some("NOTSET") => "trace",
            _ => "warn",
        }
    }

    /// Raw access to a top-level section.
    pub fn section(&self, name: &str) -> Option<&serde_yaml::Value> { self.raw.get(name) }

    /// Where and how to reach `service`.
    ///
    /// Accepts the short section name (`full_node`) or the daemon service
    /// name (`chia_full_node`).
    pub fn endpoint(&self, service: &str) -> Result<EndpointInfo> {
        let name = service.strip_prefix("chia_").unwrap_or(service);
        let host = &self.settings.self_hostname;

        if name == "daemon" {
            let ssl = self
                .settings
                .daemon_ssl
                .as_ref()
                .ok_or_else(|| ConfigError::MissingSection("daemon_ssl".to_string()))?;
            let uri = format!("wss://{}:{}", host, self.settings.daemon_port);
            return Ok(EndpointInfo::new(uri)
                .with_certificate(self.resolve(&ssl.private_crt), self.resolve(&ssl.private_key)));
        }

        let value = match name {
            "full_node" | "wallet" | "farmer" | "harvester" | "data_layer" | "timelord" =>
                self.raw.get(name),
            "crawler" => self.raw.get("seeder").and_then(|s| s.get("crawler")),
            _ => return Err(ConfigError::UnknownService(service.to_string())),
        }
        .ok_or_else(|| ConfigError::MissingSection(name.to_string()))?;

        let section: ServiceSection = serde_yaml::from_value(value.clone())?;
        let port = section
            .rpc_port
            .ok_or_else(|| ConfigError::MissingSection(format!("{}.rpc_port", name)))?;
        let ssl = section.ssl.ok_or_else(|| ConfigError::MissingSection(format!("{}.ssl", name)))?;

        Ok(EndpointInfo::new(format!("https://{}:{}", host, port))
            .with_certificate(self.resolve(&ssl.private_crt), self.resolve(&ssl.private_key)))
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    /// Parses YAML with the current directory as root.
    fn from_str(s: &str) -> Result<Self> { Self::from_yaml(s, ".") }
}
