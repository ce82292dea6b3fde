// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Client configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::DEFAULT_USER_AGENT;
use crate::engine::Timeouts;
use crate::error::{Error, Result};

/// HTTP client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Route requests through `proxy_host`
    pub use_proxy: bool,
    /// Named proxy, `host:port`
    pub proxy_host: String,
    /// Proxy username, sent only when non-empty
    pub proxy_username: String,
    /// Proxy password, sent only with a username
    pub proxy_password: String,
    /// User agent string
    pub user_agent: String,
    /// Validate TLS certificates; when false any chain, name or date is accepted
    pub verify_tls: bool,
    /// Per-primitive timeouts
    pub timeouts: Timeouts,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            use_proxy: false,
            proxy_host: String::new(),
            proxy_username: String::new(),
            proxy_password: String::new(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            verify_tls: false,
            timeouts: Timeouts::default(),
        }
    }
}

impl ClientConfig {
    /// Create a new client config
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a config from a JSON file; missing fields take their defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the settings a request cannot work without
    pub fn validate(&self) -> Result<()> {
        if self.user_agent.is_empty() {
            return Err(Error::Config("user_agent must not be empty".to_string()));
        }
        if self.use_proxy && self.proxy_host.is_empty() {
            return Err(Error::Config(
                "use_proxy is set but proxy_host is empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Enable/disable the named proxy
    pub fn use_proxy(mut self, use_proxy: bool) -> Self {
        self.use_proxy = use_proxy;
        self
    }

    /// Set proxy host and credentials
    pub fn proxy(
        mut self,
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.proxy_host = host.into();
        self.proxy_username = username.into();
        self.proxy_password = password.into();
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Enable/disable certificate validation
    pub fn verify_tls(mut self, verify: bool) -> Self {
        self.verify_tls = verify;
        self
    }

    /// Set timeouts
    pub fn timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }
}
