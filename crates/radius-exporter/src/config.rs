use crate::client::ClientConfig;
use crate::http::AccessPolicy;
use crate::request::HomeServerTarget;
use clap::Parser;
use ipnetwork::IpNetwork;
use serde::{Deserialize, Deserializer};
use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// FreeRADIUS Exporter - Prometheus metrics from the FreeRADIUS status server
#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
#[command(name = "freeradius_exporter")]
pub struct Cli {
    /// Path to a JSON configuration file
    #[arg(long, env = "CONFIG")]
    pub config: Option<PathBuf>,

    /// Address to listen on for web interface and telemetry
    #[arg(long, env = "WEB_LISTEN_ADDRESS")]
    pub listen_address: Option<String>,

    /// Path under which to expose metrics
    #[arg(long, env = "WEB_TELEMETRY_PATH")]
    pub telemetry_path: Option<String>,

    /// Token accepted in the X-Auth-Token header
    #[arg(long, env = "WEB_AUTH_TOKEN")]
    pub auth_token: Option<String>,

    /// Comma-separated IPs or CIDR networks allowed to scrape
    #[arg(long, env = "WEB_ALLOWED_IPS")]
    pub allowed_ips: Option<String>,

    /// Scrape timeout in milliseconds
    #[arg(long, env = "RADIUS_TIMEOUT", value_name = "MS")]
    pub radius_timeout: Option<u64>,

    /// Resend interval in milliseconds
    #[arg(long, env = "RADIUS_RETRY_INTERVAL", value_name = "MS")]
    pub radius_retry_interval: Option<u64>,

    /// FreeRADIUS status server address
    #[arg(long, env = "RADIUS_ADDRESS")]
    pub radius_address: Option<String>,

    /// Comma-separated home servers (ip:port[:auth|acct])
    #[arg(long, env = "RADIUS_HOMESERVERS")]
    pub radius_homeservers: Option<String>,

    /// Status server shared secret
    #[arg(long, env = "RADIUS_SECRET")]
    pub radius_secret: Option<String>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, env = "LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Validate configuration and exit (doesn't start server)
    #[arg(long)]
    pub validate: bool,
}

/// Exporter configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    /// Web listen address; a bare ":port" listens on all interfaces
    #[serde(default = "default_listen_address", alias = "web.listen-address")]
    pub listen_address: String,

    #[serde(default = "default_telemetry_path", alias = "web.telemetry-path")]
    pub telemetry_path: String,

    #[serde(default, alias = "web.auth-token")]
    pub auth_token: Option<String>,

    /// IPs or CIDR networks; entries may themselves be comma-separated
    #[serde(default, alias = "web.allowed-ips", deserialize_with = "string_or_list")]
    pub allowed_ips: Vec<String>,

    /// Scrape timeout (milliseconds)
    #[serde(default = "default_radius_timeout", alias = "radius.timeout")]
    pub radius_timeout: u64,

    /// Resend interval (milliseconds)
    #[serde(default = "default_radius_retry_interval", alias = "radius.retry-interval")]
    pub radius_retry_interval: u64,

    #[serde(default = "default_radius_address", alias = "radius.address")]
    pub radius_address: String,

    /// Targets; a single comma-separated string is accepted too
    #[serde(default, alias = "radius.homeservers", deserialize_with = "string_or_list")]
    pub radius_homeservers: Vec<String>,

    #[serde(default = "default_radius_secret", alias = "radius.secret")]
    pub radius_secret: String,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Either one comma-separated string or a list of entries
#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrList {
    String(String),
    List(Vec<String>),
}

fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match StringOrList::deserialize(deserializer)? {
        StringOrList::String(s) => vec![s],
        StringOrList::List(list) => list,
    })
}

fn default_listen_address() -> String {
    "0.0.0.0:9812".to_string()
}

fn default_telemetry_path() -> String {
    "/metrics".to_string()
}

fn default_radius_timeout() -> u64 {
    ClientConfig::DEFAULT_TIMEOUT.as_millis() as u64
}

fn default_radius_retry_interval() -> u64 {
    ClientConfig::DEFAULT_RETRY_INTERVAL.as_millis() as u64
}

fn default_radius_address() -> String {
    "127.0.0.1:18121".to_string()
}

fn default_radius_secret() -> String {
    "adminsecret".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            listen_address: default_listen_address(),
            telemetry_path: default_telemetry_path(),
            auth_token: None,
            allowed_ips: vec![],
            radius_timeout: default_radius_timeout(),
            radius_retry_interval: default_radius_retry_interval(),
            radius_address: default_radius_address(),
            radius_homeservers: vec![],
            radius_secret: default_radius_secret(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file
    ///
    /// Fields missing from the file take their defaults. The result is not
    /// validated, since command-line values may still override it.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Build the effective configuration: flags and environment over the
    /// optional file over defaults
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let mut config = match cli.config {
            Some(ref path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.merge(cli);
        config.validate()?;
        Ok(config)
    }

    /// Apply every value set on the command line or in the environment
    pub fn merge(&mut self, cli: &Cli) {
        if let Some(ref v) = cli.listen_address {
            self.listen_address = v.clone();
        }
        if let Some(ref v) = cli.telemetry_path {
            self.telemetry_path = v.clone();
        }
        if let Some(ref v) = cli.auth_token {
            self.auth_token = Some(v.clone());
        }
        if let Some(ref v) = cli.allowed_ips {
            self.allowed_ips = vec![v.clone()];
        }
        if let Some(v) = cli.radius_timeout {
            self.radius_timeout = v;
        }
        if let Some(v) = cli.radius_retry_interval {
            self.radius_retry_interval = v;
        }
        if let Some(ref v) = cli.radius_address {
            self.radius_address = v.clone();
        }
        if let Some(ref v) = cli.radius_homeservers {
            self.radius_homeservers = vec![v.clone()];
        }
        if let Some(ref v) = cli.radius_secret {
            self.radius_secret = v.clone();
        }
        if let Some(ref v) = cli.log_level {
            self.log_level = v.clone();
        }
    }

    /// Get socket address for the web listener
    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        let address = if self.listen_address.starts_with(':') {
            format!("0.0.0.0{}", self.listen_address)
        } else {
            self.listen_address.clone()
        };
        address
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("Invalid listen address: {}", self.listen_address)))
    }

    /// Get the status server address
    pub fn radius_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.radius_address
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("Invalid RADIUS address: {}", self.radius_address)))
    }

    pub fn home_servers(&self) -> Result<Vec<HomeServerTarget>, ConfigError> {
        HomeServerTarget::parse_list(&self.radius_homeservers)
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    pub fn allowed_networks(&self) -> Result<Vec<IpNetwork>, ConfigError> {
        let mut networks = Vec::new();
        for entry in &self.allowed_ips {
            networks.extend(parse_allowed_ips(entry)?);
        }
        Ok(networks)
    }

    pub fn client_config(&self) -> Result<ClientConfig, ConfigError> {
        Ok(ClientConfig::new(self.radius_addr()?, self.radius_secret.clone())
            .with_home_servers(self.home_servers()?)
            .with_timeout(Duration::from_millis(self.radius_timeout))
            .with_retry_interval(Duration::from_millis(self.radius_retry_interval)))
    }

    pub fn access_policy(&self) -> Result<AccessPolicy, ConfigError> {
        Ok(AccessPolicy::new(
            self.auth_token.clone().filter(|t| !t.is_empty()),
            self.allowed_networks()?,
        ))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.listen_addr()?;

        if !self.telemetry_path.starts_with('/') {
            return Err(ConfigError::Invalid(format!(
                "Telemetry path must start with '/': {}",
                self.telemetry_path
            )));
        }
        if self.telemetry_path == "/" {
            return Err(ConfigError::Invalid(
                "Telemetry path cannot be the landing page '/'".to_string(),
            ));
        }

        if self.radius_timeout == 0 {
            return Err(ConfigError::Invalid("RADIUS timeout cannot be 0".to_string()));
        }
        if self.radius_retry_interval == 0 {
            return Err(ConfigError::Invalid("RADIUS retry interval cannot be 0".to_string()));
        }

        if self.radius_secret.is_empty() {
            return Err(ConfigError::Invalid("Secret cannot be empty".to_string()));
        }

        self.radius_addr()?;
        self.home_servers()?;
        self.allowed_networks()?;

        Ok(())
    }
}

/// Parse a comma-separated list of IPs and CIDR networks
///
/// Single addresses become /32 (IPv4) or /128 (IPv6) networks.
pub fn parse_allowed_ips(input: &str) -> Result<Vec<IpNetwork>, ConfigError> {
    let mut networks = Vec::new();
    for entry in input.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        if let Ok(network) = entry.parse::<IpNetwork>() {
            networks.push(network);
        } else if let Ok(ip) = entry.parse::<IpAddr>() {
            networks.push(IpNetwork::from(ip));
        } else {
            return Err(ConfigError::Invalid(format!("Invalid IP or CIDR: {}", entry)));
        }
    }
    Ok(networks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.listen_addr().unwrap().port(), 9812);
        assert_eq!(config.radius_addr().unwrap(), "127.0.0.1:18121".parse().unwrap());
        assert_eq!(config.radius_secret, "adminsecret");
        assert_eq!(config.radius_timeout, 5000);
        assert_eq!(config.radius_retry_interval, 1000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        config.radius_secret = "".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.telemetry_path = "metrics".to_string();
        assert!(config.validate().is_err());
        config.telemetry_path = "/".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.radius_timeout = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.radius_address = "localhost".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.radius_homeservers = vec!["172.28.1.2:1812:proxy".to_string()];
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.allowed_ips = vec!["10.0.0.1,not-an-ip".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_listen_address_without_host() {
        let config = Config {
            listen_address: ":9812".to_string(),
            ..Default::default()
        };
        assert_eq!(config.listen_addr().unwrap(), "0.0.0.0:9812".parse().unwrap());
    }

    #[test]
    fn test_parse_allowed_ips() {
        let networks = parse_allowed_ips("192.168.1.0/24, 10.0.0.1,,").unwrap();
        assert_eq!(networks.len(), 2);
        assert!(networks[0].contains("192.168.1.77".parse().unwrap()));
        assert!(networks[1].contains("10.0.0.1".parse().unwrap()));
        assert!(!networks[1].contains("10.0.0.2".parse().unwrap()));

        let err = parse_allowed_ips("10.0.0.1,bogus").unwrap_err();
        assert!(err.to_string().contains("Invalid IP or CIDR: bogus"));
    }

    #[test]
    fn test_from_file_with_dotted_names() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "radius.address": "10.1.1.1:18121",
                "radius.secret": "filesecret",
                "radius.homeservers": ["172.28.1.2:1812:auth"],
                "web.allowed-ips": ["192.168.1.0/24"]
            }}"#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.radius_address, "10.1.1.1:18121");
        assert_eq!(config.radius_secret, "filesecret");
        assert_eq!(config.telemetry_path, "/metrics");
        assert_eq!(config.home_servers().unwrap().len(), 1);
        assert_eq!(config.allowed_networks().unwrap().len(), 1);
    }

    #[test]
    fn test_from_file_with_comma_separated_lists() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "radius.address": "10.1.1.1:18121",
                "radius.homeservers": "172.28.1.2:1812:auth,172.28.1.3:1813:acct",
                "web.allowed-ips": "10.0.0.0/8"
            }}"#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        let targets = config.home_servers().unwrap();
        assert_eq!(targets.len(), 2);
        assert_eq!(targets[0].to_string(), "172.28.1.2:1812:auth");
        assert_eq!(targets[1].to_string(), "172.28.1.3:1813:acct");

        let networks = config.allowed_networks().unwrap();
        assert_eq!(networks.len(), 1);
        assert!(networks[0].contains("10.20.30.40".parse().unwrap()));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_file_rejects_non_string_list() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"radius_homeservers": 1812}}"#).unwrap();
        assert!(matches!(Config::from_file(file.path()), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_cli_overrides_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"radius_secret": "filesecret", "radius_timeout": 2000}}"#).unwrap();

        let cli = Cli {
            config: Some(file.path().to_path_buf()),
            radius_secret: Some("clisecret".to_string()),
            radius_homeservers: Some("172.28.1.2:1812,172.28.1.3:1813:acct".to_string()),
            ..Default::default()
        };
        let config = Config::load(&cli).unwrap();

        assert_eq!(config.radius_secret, "clisecret");
        assert_eq!(config.radius_timeout, 2000);
        assert_eq!(config.home_servers().unwrap().len(), 2);
    }

    #[test]
    fn test_load_rejects_invalid_merge() {
        let cli = Cli {
            radius_secret: Some(String::new()),
            ..Default::default()
        };
        assert!(matches!(Config::load(&cli), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_cli_parses_flags() {
        let cli = Cli::try_parse_from([
            "freeradius_exporter",
            "--radius-address",
            "127.0.0.1:18121",
            "--allowed-ips",
            "10.0.0.0/8",
            "--radius-timeout",
            "250",
            "--validate",
        ])
        .unwrap();
        assert!(cli.validate);
        assert_eq!(cli.radius_timeout, Some(250));
        assert_eq!(cli.allowed_ips.as_deref(), Some("10.0.0.0/8"));
    }

    #[test]
    fn test_client_config_and_policy() {
        let config = Config {
            auth_token: Some("secret-token".to_string()),
            allowed_ips: vec!["10.0.0.1".to_string()],
            radius_timeout: 300,
            ..Default::default()
        };
        let client = config.client_config().unwrap();
        assert_eq!(client.timeout, Duration::from_millis(300));
        assert_eq!(client.secret, "adminsecret");

        let policy = config.access_policy().unwrap();
        assert!(policy.permits(Some("secret-token"), None));
        assert!(policy.permits(None, Some("10.0.0.1".parse().unwrap())));
        assert!(!policy.permits(None, Some("10.0.0.2".parse().unwrap())));
    }
}
