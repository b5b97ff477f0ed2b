// Copyright (c) 2025 - Cowboy AI, Inc.

//! Conch HTTP client
//!
//! Thin wrapper over `reqwest` that knows the API base URL and attaches the
//! bearer token to every request. Requests are built with the fluent
//! [`Request`] path builder:
//!
//! ```rust,no_run
//! use conch::client::ConchClient;
//! use conch::config::ConchConfig;
//! use conch::domain::RackLayout;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ConchClient::new(ConchConfig::from_env()?)?;
//!     let rack_id = uuid::Uuid::nil();
//!
//!     // GET /rack/{id}/layout
//!     let layout: RackLayout = client
//!         .path()
//!         .segment("rack")
//!         .segment(rack_id)
//!         .segment("layout")
//!         .get()
//!         .await?;
//!
//!     println!("{} slots", layout.len());
//!     Ok(())
//! }
//! ```

pub mod path;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::Client;
use std::time::Duration;
use tracing::info;

use crate::config::ConchConfig;
use crate::errors::{ConchError, ConchResult};

pub use path::Request;

/// Authenticated Conch API client
#[derive(Debug, Clone)]
pub struct ConchClient {
    config: ConchConfig,
    http: Client,
}

impl ConchClient {
    /// Create a new client from explicit configuration
    pub fn new(config: ConchConfig) -> ConchResult<Self> {
        config.validate()?;
        info!("Using Conch API at {}", config.base_url);

        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.token))
            .map_err(|e| ConchError::Configuration(format!("Invalid API token: {}", e)))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|e| ConchError::Configuration(format!("Invalid user agent: {}", e)))?,
        );

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| {
                ConchError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { config, http })
    }

    /// Start a request path at the API root
    pub fn path(&self) -> Request<'_> {
        Request::new(self)
    }

    /// Configuration this client was built from
    pub fn config(&self) -> &ConchConfig {
        &self.config
    }

    pub(crate) fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    pub(crate) fn http(&self) -> &Client {
        &self.http
    }
}
