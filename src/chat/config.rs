//! Configuration types for the chat application.
//!
//! Settings are layered: built-in defaults, then an optional YAML file,
//! then environment variables, then command-line arguments parsed via
//! `arrrg`.  Later layers win.

use std::path::Path;
use std::time::Duration;

use arrrg_derive::CommandLine;
use serde::{Deserialize, Serialize};

use crate::client::{Client, DEFAULT_BASE_URL};
use crate::error::{Error, Result};

/// Default per-request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Environment variable overriding the orchestrator base URL.
pub const BASE_URL_ENV: &str = "TOOLCHAT_BASE_URL";

/// Environment variable supplying the bearer token.
pub const TOKEN_ENV: &str = "TOOLCHAT_API_TOKEN";

/// Command-line arguments for the toolchat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Orchestrator API base URL.
    #[arrrg(optional, "Orchestrator API base URL (default: http://localhost:8000/api/)", "URL")]
    pub base_url: Option<String>,

    /// Bearer token sent with every request.
    #[arrrg(optional, "Bearer token for the orchestrator", "TOKEN")]
    pub token: Option<String>,

    /// Path to a YAML configuration file.
    #[arrrg(optional, "YAML configuration file", "PATH")]
    pub config: Option<String>,

    /// Comma-separated initial domain filter.
    #[arrrg(optional, "Comma-separated tool domains to start with (default: all)", "DOMAINS")]
    pub domains: Option<String>,

    /// Request timeout in seconds.
    #[arrrg(optional, "Request timeout in seconds (default: 60)", "SECS")]
    pub timeout: Option<u64>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,
}

/// Configuration for a chat session.
///
/// This struct holds the resolved configuration values after layering the
/// config file, the environment and the command line over the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Base URL of the orchestrator API.
    pub base_url: String,

    /// Bearer token; no `Authorization` header is sent when absent.
    pub token: Option<String>,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,

    /// Domains selected at startup; empty means all.
    pub domains: Vec<String>,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    ///
    /// Defaults:
    /// - Base URL: http://localhost:8000/api/
    /// - Token: none
    /// - Timeout: 60 seconds
    /// - Domains: all
    /// - Color: enabled
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            domains: Vec::new(),
            use_color: true,
        }
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the bearer token.
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    /// Sets the request timeout in seconds.
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Sets the initial domain filter.
    pub fn with_domains(mut self, domains: Vec<String>) -> Self {
        self.domains = domains;
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }

    /// Parses a YAML document; absent keys keep their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|err| Error::configuration(format!("invalid config file: {err}")))
    }

    /// Reads and parses a YAML config file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .map_err(|err| Error::io(format!("failed to read {}", path.display()), err))?;
        Self::from_yaml_str(&yaml)
    }

    /// Applies environment overrides read through `lookup`.
    pub fn with_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base_url) = lookup(BASE_URL_ENV).filter(|v| !v.is_empty()) {
            self.base_url = base_url;
        }
        if let Some(token) = lookup(TOKEN_ENV).filter(|v| !v.is_empty()) {
            self.token = Some(token);
        }
        self
    }

    /// Applies command-line overrides.
    pub fn with_args(mut self, args: &ChatArgs) -> Self {
        if let Some(base_url) = &args.base_url {
            self.base_url = base_url.clone();
        }
        if let Some(token) = &args.token {
            self.token = Some(token.clone());
        }
        if let Some(domains) = &args.domains {
            self.domains = parse_domain_list(domains);
        }
        if let Some(timeout) = args.timeout {
            self.timeout_secs = timeout;
        }
        if args.no_color {
            self.use_color = false;
        }
        self
    }

    /// Resolves the full configuration for a run of the binary.
    pub fn resolve(args: &ChatArgs) -> Result<Self> {
        let base = match &args.config {
            Some(path) => Self::from_file(path)?,
            None => Self::new(),
        };
        let config = base
            .with_env(|name| std::env::var(name).ok())
            .with_args(args);
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings no client could work with.
    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            return Err(Error::configuration("timeout must be at least one second"));
        }
        Ok(())
    }

    /// The request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Builds a client from this configuration.
    pub fn client(&self) -> Result<Client> {
        self.validate()?;
        Client::with_options(
            Some(self.base_url.clone()),
            self.token.clone(),
            Some(self.timeout()),
        )
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Splits a comma-separated domain list, dropping blanks.
pub fn parse_domain_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
        .collect()
}
