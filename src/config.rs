// Copyright (c) 2025 - Cowboy AI, Inc.
//! Conch connection configuration
//!
//! Configuration is an explicit value handed to [`ConchClient::new`]; nothing
//! here is process-global. It can be built directly, read from the
//! environment, or selected from a JSON profile file:
//!
//! ```json
//! {
//!   "default_profile": "prod",
//!   "profiles": {
//!     "prod": { "base_url": "https://conch.example.com", "token": "..." }
//!   }
//! }
//! ```
//!
//! [`ConchClient::new`]: crate::client::ConchClient::new

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::errors::{ConchError, ConchResult};

/// Environment variable holding the API base URL
pub const ENV_URL: &str = "CONCH_URL";
/// Environment variable holding the API token
pub const ENV_TOKEN: &str = "CONCH_TOKEN";
/// Environment variable holding the request timeout in seconds
pub const ENV_TIMEOUT: &str = "CONCH_TIMEOUT";

/// Configuration for a Conch API connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConchConfig {
    /// API base URL (e.g., "https://conch.example.com")
    pub base_url: String,

    /// Bearer token for authentication
    pub token: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// User-Agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("conch-shell/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for ConchConfig {
    fn default() -> Self {
        Self {
            base_url: "https://conch.joyent.us".to_string(),
            token: String::new(),
            timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl ConchConfig {
    /// Create a configuration for the given URL and token
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
            ..Self::default()
        }
    }

    /// Set the API token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = token.into();
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Load configuration from environment variables
    ///
    /// `CONCH_TOKEN` is required; `CONCH_URL` and `CONCH_TIMEOUT` fall back
    /// to the defaults.
    pub fn from_env() -> ConchResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub(crate) fn from_lookup<F>(lookup: F) -> ConchResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let token = lookup(ENV_TOKEN)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ConchError::Configuration(format!("{} not set", ENV_TOKEN)))?;

        let timeout_secs = match lookup(ENV_TIMEOUT) {
            Some(raw) => raw.parse().map_err(|_| {
                ConchError::Configuration(format!("{} is not a number: {}", ENV_TIMEOUT, raw))
            })?,
            None => defaults.timeout_secs,
        };

        Ok(Self {
            base_url: lookup(ENV_URL).unwrap_or(defaults.base_url),
            token,
            timeout_secs,
            user_agent: defaults.user_agent,
        })
    }

    /// Load a profile file; see [`ConfigFile`]
    pub fn load(path: impl AsRef<Path>) -> ConchResult<ConfigFile> {
        ConfigFile::load(path)
    }

    /// Validate fields that the HTTP layer cannot recover from
    pub fn validate(&self) -> ConchResult<()> {
        if self.token.is_empty() {
            return Err(ConchError::Configuration("API token is empty".to_string()));
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConchError::Configuration(format!(
                "base URL must be http(s): {}",
                self.base_url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(ConchError::Configuration(
                "timeout must be at least one second".to_string(),
            ));
        }
        Ok(())
    }
}

/// On-disk profile file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Profile used when none is named
    #[serde(default)]
    pub default_profile: Option<String>,

    /// Named connection profiles
    #[serde(default)]
    pub profiles: BTreeMap<String, ConchConfig>,
}

impl ConfigFile {
    /// Read and parse a profile file
    pub fn load(path: impl AsRef<Path>) -> ConchResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ConchError::Io(format!("{}: {}", path.display(), e)))?;
        Self::parse(&raw)
    }

    /// Parse profile file contents
    pub fn parse(raw: &str) -> ConchResult<Self> {
        serde_json::from_str(raw)
            .map_err(|e| ConchError::Configuration(format!("invalid config file: {}", e)))
    }

    /// Select a profile by name, or the default profile
    pub fn profile(&self, name: Option<&str>) -> ConchResult<ConchConfig> {
        let name = match name.or(self.default_profile.as_deref()) {
            Some(name) => name,
            None if self.profiles.len() == 1 => {
                // A lone profile is the default
                return Ok(self.profiles.values().next().cloned().unwrap_or_default());
            }
            None => {
                return Err(ConchError::Configuration(
                    "no profile named and no default_profile set".to_string(),
                ))
            }
        };

        self.profiles
            .get(name)
            .cloned()
            .ok_or_else(|| ConchError::Configuration(format!("unknown profile: {}", name)))
    }
}
