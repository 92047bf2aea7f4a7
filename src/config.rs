use crate::hostname::HostnameResolver;
use crate::paths::expand_home;
use serde::Deserialize;
use std::net::IpAddr;
use std::path::{Path, PathBuf};

/// Global configuration for the resolver and its HTTP front end
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Top-level domain the sites are served under (default: "test")
    #[serde(default = "default_tld")]
    pub tld: String,

    /// Parked directories; every subdirectory is a site. Searched in order.
    #[serde(default)]
    pub paths: Vec<String>,

    /// Directory of linked sites (symlinks), searched before parked paths
    #[serde(default = "default_links_path")]
    pub links_path: Option<String>,

    /// Extra wildcard-DNS services, e.g. "*.ngrok.io"
    #[serde(default)]
    pub tunnel_services: Vec<String>,

    /// Site served when no directory matches the host
    #[serde(default)]
    pub default: Option<String>,

    /// Render HTML listings for directories without an index
    #[serde(default)]
    pub directory_listing: bool,

    /// Directory of declarative extension drivers
    #[serde(default = "default_drivers_path")]
    pub drivers_path: Option<String>,

    /// Address reported to scripts as SERVER_ADDR
    #[serde(default = "default_loopback")]
    pub loopback: String,

    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Bind address (default: 127.0.0.1)
    #[serde(default = "default_bind_address")]
    pub bind: String,

    /// HTTP port (default: 80)
    #[serde(default = "default_listen_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind_address(),
            port: default_listen_port(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tld: default_tld(),
            paths: Vec::new(),
            links_path: default_links_path(),
            tunnel_services: Vec::new(),
            default: None,
            directory_listing: false,
            drivers_path: default_drivers_path(),
            loopback: default_loopback(),
            server: ServerConfig::default(),
        }
    }
}

fn default_tld() -> String {
    "test".to_string()
}

fn default_links_path() -> Option<String> {
    Some("~/.config/parkgate/Sites".to_string())
}

fn default_drivers_path() -> Option<String> {
    Some("~/.config/parkgate/Drivers".to_string())
}

fn default_loopback() -> String {
    "127.0.0.1".to_string()
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_listen_port() -> u16 {
    80
}

/// Where the binary looks for its configuration when no path is given.
pub fn default_config_path() -> PathBuf {
    expand_home("~/.config/parkgate/config.toml")
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        let mut errors = Vec::new();

        let tld = self.tld.trim_matches('.');
        if tld.is_empty() {
            errors.push("tld must not be empty".to_string());
        } else if tld.contains(|c: char| c.is_whitespace() || c == '/' || c == ':') {
            errors.push(format!("tld '{}' is not a valid domain suffix", self.tld));
        }

        if self.loopback.parse::<IpAddr>().is_err() {
            errors.push(format!("loopback '{}' is not an IP address", self.loopback));
        }

        if let Err(e) = HostnameResolver::new(&self.tld, &self.tunnel_services) {
            errors.push(format!("invalid tunnel service pattern: {}", e));
        }

        if self.paths.iter().any(|path| path.trim().is_empty()) {
            errors.push("parked paths must not be empty strings".to_string());
        }

        if !errors.is_empty() {
            anyhow::bail!("Configuration errors:\n  - {}", errors.join("\n  - "));
        }

        Ok(())
    }

    /// Parked paths with `~/` expanded, in configured order.
    pub fn parked_paths(&self) -> Vec<PathBuf> {
        self.paths.iter().map(|path| expand_home(path)).collect()
    }

    pub fn links_path(&self) -> Option<PathBuf> {
        self.links_path.as_deref().map(expand_home)
    }

    pub fn default_site(&self) -> Option<PathBuf> {
        self.default.as_deref().map(expand_home)
    }

    pub fn drivers_path(&self) -> Option<PathBuf> {
        self.drivers_path.as_deref().map(expand_home)
    }

    /// Socket address string for the listener
    pub fn listen_address(&self) -> String {
        if self.server.bind.contains(':') {
            format!("[{}]:{}", self.server.bind, self.server.port)
        } else {
            format!("{}:{}", self.server.bind, self.server.port)
        }
    }
}
