// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Client configuration

use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Agent API version used when none is configured
pub const DEFAULT_API_VERSION: &str = "v1";

/// Default request timeout (seconds)
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Default connect timeout (seconds)
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Configuration for a [`crate::CommandClient`].
///
/// Read once when the client is built and applied to every request. Can be
/// constructed directly, deserialized from JSON, or loaded from environment
/// variables with [`ClientConfig::from_env`].
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ClientConfig {
    /// Agent API version, the first path segment under the agent URL
    pub api_version: String,

    /// Whole-request timeout in seconds. `None` waits indefinitely, which
    /// is only sensible for commands sent with `wait=true` that are known
    /// to run long.
    pub timeout_secs: Option<u64>,

    /// TCP connect timeout in seconds
    pub connect_timeout_secs: u64,

    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout_secs: Some(DEFAULT_TIMEOUT_SECS),
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            user_agent: default_user_agent(),
        }
    }
}

fn default_user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

impl ClientConfig {
    /// Load configuration from environment variables
    ///
    /// - `NODE_AGENT_API_VERSION` (default `v1`)
    /// - `NODE_AGENT_TIMEOUT_SECS` (default 60, `0` disables the timeout)
    /// - `NODE_AGENT_CONNECT_TIMEOUT_SECS` (default 10)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] but reads variables through
    /// `lookup`, so callers can layer their own sources.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(version) = lookup("NODE_AGENT_API_VERSION") {
            let version = version.trim();
            if version.is_empty() {
                anyhow::bail!("NODE_AGENT_API_VERSION must not be empty");
            }
            config.api_version = version.to_string();
        }

        if let Some(secs) = lookup("NODE_AGENT_TIMEOUT_SECS") {
            let secs: u64 = secs
                .trim()
                .parse()
                .context("Invalid NODE_AGENT_TIMEOUT_SECS")?;
            config.timeout_secs = (secs > 0).then_some(secs);
        }

        if let Some(secs) = lookup("NODE_AGENT_CONNECT_TIMEOUT_SECS") {
            config.connect_timeout_secs = secs
                .trim()
                .parse()
                .context("Invalid NODE_AGENT_CONNECT_TIMEOUT_SECS")?;
        }

        Ok(config)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}
