use ledger_network::{ChannelProfile, HttpGatewayConfig, NetworkProfile};
use ledger_orchestrator::CoordinatorSettings;
use ledger_types::NodeAddress;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load config file: {0}")]
    Load(String),

    #[error("Invalid {name}: {reason}")]
    InvalidEnv { name: &'static str, reason: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub network: NetworkConfig,
    pub ledger: LedgerConfig,
    pub admin: AdminConfig,
    /// Identity name -> secret accepted by the gateway
    #[serde(default)]
    pub identities: BTreeMap<String, String>,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub listen_addr: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub msp_id: String,
    pub request_timeout_ms: u64,
    pub poll_wait_ms: u64,
    #[serde(default)]
    pub channels: BTreeMap<String, ChannelConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChannelConfig {
    pub endorsers: Vec<String>,
    pub orderer: String,
    #[serde(default)]
    pub event_peers: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    pub channel: String,
    pub chaincode: String,
    pub confirm_timeout_ms: u64,
    pub endorse_timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    pub identity: String,
    pub secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    /// "text" or "json"
    pub format: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        let mut channels = BTreeMap::new();
        channels.insert(
            "mychannel".to_string(),
            ChannelConfig {
                endorsers: vec!["http://localhost:7051".to_string()],
                orderer: "http://localhost:7050".to_string(),
                event_peers: vec![],
            },
        );

        AppConfig {
            server: ServerConfig {
                listen_addr: "0.0.0.0:8080".to_string(),
            },
            network: NetworkConfig {
                msp_id: "Org1MSP".to_string(),
                request_timeout_ms: 30_000,
                poll_wait_ms: 5_000,
                channels,
            },
            ledger: LedgerConfig {
                channel: "mychannel".to_string(),
                chaincode: "fabcar".to_string(),
                confirm_timeout_ms: 3_000,
                endorse_timeout_ms: 30_000,
            },
            admin: AdminConfig {
                identity: "admin".to_string(),
                secret: "adminpw".to_string(),
            },
            identities: BTreeMap::new(),
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "text".to_string(),
            },
        }
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_ms(name: &'static str, value: &str) -> Result<u64, ConfigError> {
    value.parse().map_err(|e: std::num::ParseIntError| ConfigError::InvalidEnv {
        name,
        reason: e.to_string(),
    })
}

impl AppConfig {
    /// Defaults, then the config file, then environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut app_config = AppConfig::default();

        let file = match path {
            Some(path) => Some(path.to_path_buf()),
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => Some(DEFAULT_CONFIG_PATH.into()),
            None => None,
        };

        if let Some(file) = file {
            let settings = config::Config::builder()
                .add_source(config::File::from(file.as_path()))
                .build()
                .map_err(|e| ConfigError::Load(e.to_string()))?;

            app_config = settings
                .try_deserialize::<AppConfig>()
                .map_err(|e| ConfigError::Load(format!("{}: {}", file.display(), e)))?;
        }

        app_config.override_from(|name| std::env::var(name).ok())?;

        Ok(app_config)
    }

    /// Apply overrides looked up by environment variable name.
    pub fn override_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(listen_addr) = lookup("LISTEN_ADDR") {
            self.server.listen_addr = listen_addr;
        }

        if let Some(channel) = lookup("CHANNEL_NAME") {
            self.ledger.channel = channel;
        }

        if let Some(chaincode) = lookup("CHAINCODE_NAME") {
            self.ledger.chaincode = chaincode;
        }

        if let Some(timeout) = lookup("CONFIRM_TIMEOUT_MS") {
            self.ledger.confirm_timeout_ms = parse_ms("CONFIRM_TIMEOUT_MS", &timeout)?;
        }

        if let Some(timeout) = lookup("ENDORSE_TIMEOUT_MS") {
            self.ledger.endorse_timeout_ms = parse_ms("ENDORSE_TIMEOUT_MS", &timeout)?;
        }

        // Peer overrides apply to the default channel.
        let endorsers = lookup("ENDORSER_PEERS");
        let event_peers = lookup("EVENT_PEERS");
        let orderer = lookup("ORDERER_URL");
        if endorsers.is_some() || event_peers.is_some() || orderer.is_some() {
            let channel = self
                .network
                .channels
                .entry(self.ledger.channel.clone())
                .or_default();
            if let Some(endorsers) = endorsers {
                channel.endorsers = split_list(&endorsers);
            }
            if let Some(event_peers) = event_peers {
                channel.event_peers = split_list(&event_peers);
            }
            if let Some(orderer) = orderer {
                channel.orderer = orderer;
            }
        }

        if let Some(admin) = lookup("ADMIN_ID") {
            self.admin.identity = admin;
        }

        if let Some(secret) = lookup("ADMIN_SECRET") {
            self.admin.secret = secret;
        }

        if let Some(format) = lookup("LOG_FORMAT") {
            self.logging.format = format;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.listen_addr()?;

        let channel = self.network.channels.get(&self.ledger.channel).ok_or_else(|| {
            ConfigError::Invalid(format!(
                "default channel {} is not defined under network.channels",
                self.ledger.channel
            ))
        })?;

        for (name, channel) in &self.network.channels {
            if channel.orderer.is_empty() {
                return Err(ConfigError::Invalid(format!("channel {} has no orderer", name)));
            }
        }

        if channel.endorsers.is_empty() {
            return Err(ConfigError::Invalid(format!(
                "channel {} has no endorsing peers",
                self.ledger.channel
            )));
        }

        if self.ledger.chaincode.is_empty() {
            return Err(ConfigError::Invalid("chaincode name cannot be empty".to_string()));
        }

        if self.ledger.confirm_timeout_ms == 0 {
            return Err(ConfigError::Invalid("confirm_timeout_ms must be greater than zero".to_string()));
        }

        if self.ledger.endorse_timeout_ms == 0 {
            return Err(ConfigError::Invalid("endorse_timeout_ms must be greater than zero".to_string()));
        }

        if self.admin.identity.is_empty() {
            return Err(ConfigError::Invalid("admin identity cannot be empty".to_string()));
        }

        if !matches!(self.logging.format.as_str(), "text" | "json") {
            return Err(ConfigError::Invalid(format!(
                "unknown log format {}, expected text or json",
                self.logging.format
            )));
        }

        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.server
            .listen_addr
            .parse()
            .map_err(|e| ConfigError::Invalid(format!("Invalid listen_addr: {}", e)))
    }

    pub fn network_profile(&self) -> NetworkProfile {
        let to_nodes = |addrs: &[String]| -> Vec<NodeAddress> { addrs.iter().map(|a| NodeAddress(a.clone())).collect() };

        self.network
            .channels
            .iter()
            .fold(NetworkProfile::default(), |profile, (name, channel)| {
                profile.with_channel(
                    name.clone(),
                    ChannelProfile {
                        endorsers: to_nodes(&channel.endorsers),
                        orderer: NodeAddress(channel.orderer.clone()),
                        event_sources: to_nodes(&channel.event_peers),
                    },
                )
            })
    }

    /// Credential table for the identity provider, admin included.
    pub fn credentials(&self) -> Vec<(String, String)> {
        let mut credentials: Vec<_> = self
            .identities
            .iter()
            .map(|(name, secret)| (name.clone(), secret.clone()))
            .collect();
        credentials.push((self.admin.identity.clone(), self.admin.secret.clone()));
        credentials
    }

    pub fn coordinator_settings(&self) -> CoordinatorSettings {
        CoordinatorSettings {
            channel: self.ledger.channel.clone(),
            chaincode: self.ledger.chaincode.clone(),
            confirm_timeout: Duration::from_millis(self.ledger.confirm_timeout_ms),
            endorse_timeout: Duration::from_millis(self.ledger.endorse_timeout_ms),
            admin_identity: self.admin.identity.clone(),
            admin_secret: self.admin.secret.clone(),
        }
    }

    pub fn gateway_config(&self) -> HttpGatewayConfig {
        HttpGatewayConfig {
            request_timeout: Duration::from_millis(self.network.request_timeout_ms),
            poll_wait: Duration::from_millis(self.network.poll_wait_ms),
            ..HttpGatewayConfig::default()
        }
    }

    /// Copy with every secret masked, for display.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        copy.admin.secret = "********".to_string();
        for secret in copy.identities.values_mut() {
            *secret = "********".to_string();
        }
        copy
    }
}
