//! Configuration management for the MCP gateway.
//!
//! Settings are layered, lowest precedence first:
//!
//! 1. Built-in defaults per adapter (base URL, listen port)
//! 2. The TOML config file, stored in a platform-specific location:
//!    - **macOS/Linux**: `~/.config/dev-server-workflow/config.toml`
//!    - **Windows**: `%APPDATA%\dev-server-workflow\config.toml`
//! 3. Environment variables (`GITHUB_TOKEN`, `GITLAB_API_URL`, `LOG_LEVEL`, ...)
//!
//! # Example
//!
//! ```ignore
//! use dsw_core::config::{AdapterConfig, AdapterKind, Config};
//!
//! let file = Config::load()?;
//! let github = AdapterConfig::from_env(AdapterKind::GitHub, &file)?;
//! println!("listening on {}", github.listen_addr());
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{Error, Result};

/// Config file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Config directory name.
const CONFIG_DIR_NAME: &str = "dev-server-workflow";

/// Upstream request timeout used when nothing else is configured.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_LOG_DIR: &str = "logs";

// =============================================================================
// Adapter kinds
// =============================================================================

/// The upstream systems the gateway knows how to front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdapterKind {
    GitHub,
    GitLab,
    OpenProject,
    AppFlowy,
}

impl AdapterKind {
    pub const ALL: [AdapterKind; 4] = [
        AdapterKind::GitHub,
        AdapterKind::GitLab,
        AdapterKind::OpenProject,
        AdapterKind::AppFlowy,
    ];

    /// Lowercase adapter name, used in logs, tool prefixes and config keys.
    pub fn name(&self) -> &'static str {
        match self {
            AdapterKind::GitHub => "github",
            AdapterKind::GitLab => "gitlab",
            AdapterKind::OpenProject => "openproject",
            AdapterKind::AppFlowy => "appflowy",
        }
    }

    /// Prefix of the adapter-specific environment variables.
    pub fn env_prefix(&self) -> &'static str {
        match self {
            AdapterKind::GitHub => "GITHUB",
            AdapterKind::GitLab => "GITLAB",
            AdapterKind::OpenProject => "OPENPROJECT",
            AdapterKind::AppFlowy => "APPFLOWY",
        }
    }

    pub fn default_port(&self) -> u16 {
        match self {
            AdapterKind::GitHub => 3001,
            AdapterKind::GitLab => 3002,
            AdapterKind::OpenProject => 3003,
            AdapterKind::AppFlowy => 3004,
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            AdapterKind::GitHub => "https://api.github.com",
            AdapterKind::GitLab => "https://gitlab.com",
            AdapterKind::OpenProject => "http://localhost:8080",
            AdapterKind::AppFlowy => "https://beta.appflowy.cloud",
        }
    }
}

impl fmt::Display for AdapterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AdapterKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "github" => Ok(AdapterKind::GitHub),
            "gitlab" => Ok(AdapterKind::GitLab),
            "openproject" => Ok(AdapterKind::OpenProject),
            "appflowy" => Ok(AdapterKind::AppFlowy),
            other => Err(Error::Config(format!("Unknown adapter: {}", other))),
        }
    }
}

// =============================================================================
// Config file structures
// =============================================================================

/// Contents of the TOML config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<UpstreamSection>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gitlab: Option<UpstreamSection>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openproject: Option<UpstreamSection>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appflowy: Option<UpstreamSection>,

    /// Settings shared by every adapter process
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<ServerSection>,
}

/// Per-adapter section of the config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpstreamSection {
    /// Upstream API base URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Upstream credential (PAT, private token, API key or bearer token)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Port the adapter's gateway listens on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

/// `[server]` section of the config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,
}

impl Config {
    /// Get the configuration directory path.
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(CONFIG_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
    }

    /// Get the configuration file path.
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from the default location.
    ///
    /// Returns a default (empty) config if the file doesn't exist.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    ///
    /// Returns a default (empty) config if the file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = ?path, "Config file does not exist, using defaults");
            return Ok(Self::default());
        }

        debug!(path = ?path, "Loading config");

        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config file: {}", e)))?;

        info!(path = ?path, "Config loaded successfully");
        Ok(config)
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        self.save_to(&path)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("Failed to create config directory: {}", e)))?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, contents)
            .map_err(|e| Error::Config(format!("Failed to write config file: {}", e)))?;

        info!(path = ?path, "Config saved successfully");
        Ok(())
    }

    /// Section for one adapter, if present.
    pub fn section(&self, kind: AdapterKind) -> Option<&UpstreamSection> {
        match kind {
            AdapterKind::GitHub => self.github.as_ref(),
            AdapterKind::GitLab => self.gitlab.as_ref(),
            AdapterKind::OpenProject => self.openproject.as_ref(),
            AdapterKind::AppFlowy => self.appflowy.as_ref(),
        }
    }

    fn section_mut(&mut self, kind: AdapterKind) -> &mut UpstreamSection {
        let slot = match kind {
            AdapterKind::GitHub => &mut self.github,
            AdapterKind::GitLab => &mut self.gitlab,
            AdapterKind::OpenProject => &mut self.openproject,
            AdapterKind::AppFlowy => &mut self.appflowy,
        };
        slot.get_or_insert_with(UpstreamSection::default)
    }

    /// Names of the adapters that have a section in the file.
    pub fn configured_adapters(&self) -> Vec<&'static str> {
        AdapterKind::ALL
            .iter()
            .filter(|kind| self.section(**kind).is_some())
            .map(|kind| kind.name())
            .collect()
    }

    /// Set a configuration value by key path.
    ///
    /// Key format: `section.field` (e.g., `github.token`, `server.log_level`)
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let (section, field) = split_key(key)?;

        if section == "server" {
            let server = self.server.get_or_insert_with(ServerSection::default);
            match field {
                "host" => server.host = Some(value.to_string()),
                "timeout_ms" | "timeout" => server.timeout_ms = Some(parse_number(key, value)?),
                "log_level" => server.log_level = Some(value.to_string()),
                "log_dir" => server.log_dir = Some(PathBuf::from(value)),
                _ => {
                    return Err(Error::Config(format!(
                        "Unknown server config field: {}",
                        field
                    )))
                }
            }
            return Ok(());
        }

        let kind: AdapterKind = section.parse()?;
        let upstream = self.section_mut(kind);
        match field {
            "url" | "base_url" => upstream.url = Some(value.to_string()),
            "token" => upstream.token = Some(value.to_string()),
            "port" => upstream.port = Some(parse_number(key, value)?),
            _ => {
                return Err(Error::Config(format!(
                    "Unknown {} config field: {}",
                    kind, field
                )))
            }
        }

        Ok(())
    }

    /// Get a configuration value by key path.
    ///
    /// Key format: `section.field` (e.g., `gitlab.url`, `server.host`)
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let (section, field) = split_key(key)?;

        if section == "server" {
            let Some(server) = &self.server else {
                return Ok(None);
            };
            return match field {
                "host" => Ok(server.host.clone()),
                "timeout_ms" | "timeout" => Ok(server.timeout_ms.map(|t| t.to_string())),
                "log_level" => Ok(server.log_level.clone()),
                "log_dir" => Ok(server.log_dir.as_ref().map(|p| p.display().to_string())),
                _ => Err(Error::Config(format!(
                    "Unknown server config field: {}",
                    field
                ))),
            };
        }

        let kind: AdapterKind = section.parse()?;
        let Some(upstream) = self.section(kind) else {
            return Ok(None);
        };
        match field {
            "url" | "base_url" => Ok(upstream.url.clone()),
            "token" => Ok(upstream.token.clone()),
            "port" => Ok(upstream.port.map(|p| p.to_string())),
            _ => Err(Error::Config(format!(
                "Unknown {} config field: {}",
                kind, field
            ))),
        }
    }
}

fn split_key(key: &str) -> Result<(&str, &str)> {
    let parts: Vec<&str> = key.split('.').collect();
    if parts.len() != 2 {
        return Err(Error::Config(format!(
            "Invalid config key '{}'. Expected format: section.field",
            key
        )));
    }
    Ok((parts[0], parts[1]))
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| Error::Config(format!("Invalid numeric value for {}: {}", key, value)))
}

// =============================================================================
// Resolved per-process configuration
// =============================================================================

/// Fully resolved settings for one adapter process.
#[derive(Debug, Clone)]
pub struct AdapterConfig {
    pub kind: AdapterKind,
    pub base_url: String,
    pub token: String,
    pub host: String,
    pub port: u16,
    pub timeout_ms: u64,
    pub log_level: String,
    pub log_dir: PathBuf,
}

impl AdapterConfig {
    /// Resolve settings from the config file and the process environment.
    pub fn from_env(kind: AdapterKind, file: &Config) -> Result<Self> {
        Self::resolve(kind, file, |name| std::env::var(name).ok())
    }

    /// Resolve settings with an explicit environment lookup.
    pub fn resolve<F>(kind: AdapterKind, file: &Config, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let prefix = kind.env_prefix();
        let section = file.section(kind).cloned().unwrap_or_default();
        let server = file.server.clone().unwrap_or_default();
        let var = |suffix: &str| env(&format!("{}_{}", prefix, suffix)).filter(|v| !v.is_empty());

        let base_url = var("API_URL")
            .or(section.url)
            .unwrap_or_else(|| kind.default_base_url().to_string());

        let token = var("TOKEN").or(section.token).ok_or_else(|| {
            Error::Config(format!(
                "{}_TOKEN is not set and no {}.token is configured",
                prefix, kind
            ))
        })?;

        let port = match var("MCP_PORT") {
            Some(raw) => parse_number(&format!("{}_MCP_PORT", prefix), &raw)?,
            None => section.port.unwrap_or_else(|| kind.default_port()),
        };

        let timeout_ms = match env("MCP_TIMEOUT_MS") {
            Some(raw) => parse_number("MCP_TIMEOUT_MS", &raw)?,
            None => server.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS),
        };

        Ok(Self {
            kind,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            host: env("MCP_HOST")
                .or(server.host)
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            timeout_ms,
            log_level: env("LOG_LEVEL")
                .or(server.log_level)
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            log_dir: env("LOG_DIR")
                .map(PathBuf::from)
                .or(server.log_dir)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DIR)),
        })
    }

    /// Socket address string the gateway binds to.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Per-adapter log file name, e.g. `github-mcp.log`.
    pub fn log_file_name(&self) -> String {
        format!("{}-mcp.log", self.kind)
    }
}

// =============================================================================
// Tests
// =============================================================================
