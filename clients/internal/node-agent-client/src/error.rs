// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Error types for agent command dispatch

use thiserror::Error;

/// Errors returned by [`crate::CommandClient`].
///
/// Every per-request variant carries the identity of the target node and
/// the operation that was attempted (a command name such as
/// `standby.prepare_image`, or `get_status`).
#[derive(Debug, Error)]
pub enum AgentClientError {
    /// The target's metadata does not yield a usable agent endpoint.
    /// Not retryable until the target is reconfigured.
    #[error("{operation} on node {target}: {reason}")]
    Configuration {
        target: String,
        operation: String,
        reason: String,
    },

    /// Connection, timeout or other transport-level failure.
    #[error("{operation} on node {target}: request to agent failed: {source}")]
    Transport {
        target: String,
        operation: String,
        #[source]
        source: reqwest::Error,
    },

    /// The agent answered with a body that is not valid JSON.
    #[error("{operation} on node {target}: agent response is not valid JSON: {source}")]
    Decode {
        target: String,
        operation: String,
        #[source]
        source: serde_json::Error,
    },

    /// The agent answered with valid JSON that lacks a field we consume.
    #[error("{operation} on node {target}: unexpected agent response: {reason}")]
    Protocol {
        target: String,
        operation: String,
        reason: String,
    },

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

impl AgentClientError {
    /// Identity of the target node, if the error is tied to one.
    pub fn target(&self) -> Option<&str> {
        match self {
            Self::Configuration { target, .. }
            | Self::Transport { target, .. }
            | Self::Decode { target, .. }
            | Self::Protocol { target, .. } => Some(target),
            Self::HttpClient(_) => None,
        }
    }

    /// Operation that was being attempted, if the error is tied to one.
    pub fn operation(&self) -> Option<&str> {
        match self {
            Self::Configuration { operation, .. }
            | Self::Transport { operation, .. }
            | Self::Decode { operation, .. }
            | Self::Protocol { operation, .. } => Some(operation),
            Self::HttpClient(_) => None,
        }
    }

    /// Whether repeating the same call could succeed without changing the
    /// target. Only transport failures qualify.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configuration() -> AgentClientError {
        AgentClientError::Configuration {
            target: "1b6a5c1e".to_string(),
            operation: "standby.prepare_image".to_string(),
            reason: "no agent endpoint_url".to_string(),
        }
    }

    #[test]
    fn test_display_names_target_and_operation() {
        let msg = configuration().to_string();
        assert!(msg.contains("1b6a5c1e"));
        assert!(msg.contains("standby.prepare_image"));
        assert!(msg.contains("endpoint_url"));
    }

    #[test]
    fn test_accessors() {
        let err = configuration();
        assert_eq!(err.target(), Some("1b6a5c1e"));
        assert_eq!(err.operation(), Some("standby.prepare_image"));
    }

    #[test]
    fn test_only_transport_is_retryable() {
        assert!(!configuration().is_retryable());

        let decode = AgentClientError::Decode {
            target: "n".to_string(),
            operation: "get_status".to_string(),
            source: serde_json::from_str::<serde_json::Value>("<html>")
                .expect_err("html is not json"),
        };
        assert!(!decode.is_retryable());

        let protocol = AgentClientError::Protocol {
            target: "n".to_string(),
            operation: "get_status".to_string(),
            reason: "missing `commands`".to_string(),
        };
        assert!(!protocol.is_retryable());
    }
}
