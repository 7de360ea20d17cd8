//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.phaseboard.toml` files.

use crate::models::MilestoneRule;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default config file name, looked up in the current directory.
pub const DEFAULT_CONFIG_FILE: &str = ".phaseboard.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Jira connection and initiative settings.
    #[serde(default)]
    pub jira: JiraConfig,

    /// Snapshot cache settings.
    #[serde(default)]
    pub cache: CacheConfig,

    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Custom milestone labels, matched by keyword against phase summaries.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub milestones: Vec<MilestoneRule>,
}

/// Jira connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraConfig {
    /// Site root, e.g. `https://acme.atlassian.net`.
    #[serde(default)]
    pub base_url: String,

    /// Account email used for Basic auth.
    #[serde(default)]
    pub email: String,

    /// API token used for Basic auth.
    #[serde(default)]
    pub api_token: String,

    /// Key of the initiative to track.
    #[serde(default = "default_initiative")]
    pub initiative_key: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Records requested per search page.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for JiraConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            email: String::new(),
            api_token: String::new(),
            initiative_key: default_initiative(),
            timeout_seconds: default_timeout(),
            page_size: default_page_size(),
        }
    }
}

fn default_initiative() -> String {
    "BAC-18816".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_page_size() -> u32 {
    crate::jira::DEFAULT_PAGE_SIZE
}

/// Snapshot cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Seconds a snapshot is served before a rebuild.
    #[serde(default = "default_ttl")]
    pub ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_ttl(),
        }
    }
}

fn default_ttl() -> u64 {
    300
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory holding `dashboard.html` and its assets.
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5052
}

fn default_static_dir() -> String {
    "static".to_string()
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments (including their environment fallbacks) take precedence
    /// over config file settings, but only when they were actually given.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref base_url) = args.base_url {
            self.jira.base_url = base_url.clone();
        }
        if let Some(ref email) = args.email {
            self.jira.email = email.clone();
        }
        if let Some(ref token) = args.api_token {
            self.jira.api_token = token.clone();
        }
        if let Some(ref key) = args.initiative {
            self.jira.initiative_key = key.clone();
        }
        if let Some(timeout) = args.timeout {
            self.jira.timeout_seconds = timeout;
        }
        if let Some(page_size) = args.page_size {
            self.jira.page_size = page_size;
        }

        if let Some(ttl) = args.cache_ttl {
            self.cache.ttl_seconds = ttl;
        }

        if let Some(ref host) = args.host {
            self.server.host = host.clone();
        }
        if let Some(port) = args.port {
            self.server.port = port;
        }
        if let Some(ref dir) = args.static_dir {
            self.server.static_dir = dir.display().to_string();
        }

        self.jira.base_url = self.jira.base_url.trim_end_matches('/').to_string();
    }

    /// Check the merged configuration before any network access.
    pub fn validate(&self) -> Result<(), String> {
        let url = &self.jira.base_url;
        if url.is_empty() {
            return Err("Jira base URL is required (--base-url or JIRA_BASE_URL)".to_string());
        }
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err("Jira base URL must start with 'http://' or 'https://'".to_string());
        }
        if self.jira.initiative_key.trim().is_empty() {
            return Err("Initiative key must not be empty".to_string());
        }
        if self.jira.timeout_seconds == 0 {
            return Err("Timeout must be at least 1 second".to_string());
        }
        if self.jira.page_size == 0 {
            return Err("Page size must be at least 1".to_string());
        }
        for rule in &self.milestones {
            if rule.label.trim().is_empty() {
                return Err("Milestone label must not be empty".to_string());
            }
            if rule.keywords.iter().all(|k| k.trim().is_empty()) {
                return Err(format!("Milestone '{}' needs at least one keyword", rule.label));
            }
        }
        Ok(())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        let mut content = toml::to_string_pretty(&config).unwrap_or_else(|_| String::new());
        content.push_str(
            "\n# Optional milestone labels, matched by keyword against phase summaries:\n\
             # [[milestones]]\n\
             # keywords = [\"poc\", \"validation\"]\n\
             # label = \"POC validation complete\"\n",
        );
        content
    }
}
