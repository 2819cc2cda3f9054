// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! HTTP transport for agent commands

use reqwest::header::CONTENT_TYPE;
use serde_json::{Map, Value};
use tracing::{debug, warn};
use url::Url;

use crate::command::{Command, CommandResult};
use crate::config::ClientConfig;
use crate::error::AgentClientError;
use crate::target::{ENDPOINT_URL_KEY, InfoScope, TargetDescriptor, lookup_endpoint};

const APPLICATION_JSON: &str = "application/json";

/// Operation label used for status polling in errors and logs
const GET_STATUS: &str = "get_status";

/// Client for the command endpoint of node agents.
///
/// Holds one pooled `reqwest::Client` for its whole lifetime; clones share
/// the pool, so a single instance can serve any number of nodes and
/// concurrent callers. The client keeps no per-node state: the endpoint is
/// resolved from the target on every call, so metadata changes take effect
/// immediately.
#[derive(Clone, Debug)]
pub struct CommandClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl CommandClient {
    /// Create a client with its own connection pool
    pub fn new(config: ClientConfig) -> Result<Self, AgentClientError> {
        let mut builder = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout())
            .user_agent(config.user_agent.clone());

        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }

        let http = builder.build().map_err(AgentClientError::HttpClient)?;

        Ok(Self { http, config })
    }

    /// Create a client on top of an existing `reqwest::Client`. Timeouts
    /// and user agent from `config` are not applied in this case.
    pub fn new_with_client(config: ClientConfig, http: reqwest::Client) -> Self {
        Self { http, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Resolve the command URL of the agent on `target`:
    /// `{endpoint_url}/{api_version}/commands`.
    pub fn resolve_endpoint<T>(&self, target: &T) -> Result<Url, AgentClientError>
    where
        T: TargetDescriptor + ?Sized,
    {
        self.command_url(target, "resolve_endpoint")
    }

    fn command_url<T>(&self, target: &T, operation: &str) -> Result<Url, AgentClientError>
    where
        T: TargetDescriptor + ?Sized,
    {
        let (lookup, endpoint) =
            lookup_endpoint(target).ok_or_else(|| AgentClientError::Configuration {
                target: target.identity().to_string(),
                operation: operation.to_string(),
                reason: format!(
                    "agent requires {} in internal_info (or legacy public_info)",
                    ENDPOINT_URL_KEY
                ),
            })?;

        if lookup.scope == InfoScope::Public {
            warn!(
                node = target.identity(),
                "agent endpoint found only in legacy public_info"
            );
        }

        let raw = format!("{}/{}/commands", endpoint, self.config.api_version);
        Url::parse(&raw).map_err(|e| AgentClientError::Configuration {
            target: target.identity().to_string(),
            operation: operation.to_string(),
            reason: format!("invalid agent URL {raw:?}: {e}"),
        })
    }

    /// Send `name` with `params` to the agent on `target` and return the
    /// decoded response body as-is.
    ///
    /// With `wait` set the agent holds the response until the command has
    /// finished. No retries are attempted.
    pub async fn send_command<T>(
        &self,
        target: &T,
        name: &str,
        params: Map<String, Value>,
        wait: bool,
    ) -> Result<CommandResult, AgentClientError>
    where
        T: TargetDescriptor + ?Sized,
    {
        let mut url = self.command_url(target, name)?;
        url.query_pairs_mut()
            .append_pair("wait", if wait { "true" } else { "false" });

        let command = Command::new(name, params);

        debug!(
            node = target.identity(),
            command = name,
            wait,
            url = %url,
            "Sending agent command"
        );

        let response = self
            .http
            .post(url)
            .header(CONTENT_TYPE, APPLICATION_JSON)
            .json(&command)
            .send()
            .await
            .map_err(|source| transport(target, name, source))?;

        self.decode(target, name, response).await
    }

    /// Fetch the status of every command the agent on `target` has run,
    /// i.e. the `commands` list of the agent's response.
    pub async fn get_status<T>(&self, target: &T) -> Result<Vec<CommandResult>, AgentClientError>
    where
        T: TargetDescriptor + ?Sized,
    {
        let url = self.command_url(target, GET_STATUS)?;

        debug!(node = target.identity(), url = %url, "Fetching agent command status");

        let response = self
            .http
            .get(url)
            .header(CONTENT_TYPE, APPLICATION_JSON)
            .send()
            .await
            .map_err(|source| transport(target, GET_STATUS, source))?;

        let body = self.decode(target, GET_STATUS, response).await?;
        extract_commands(body).map_err(|reason| AgentClientError::Protocol {
            target: target.identity().to_string(),
            operation: GET_STATUS.to_string(),
            reason,
        })
    }

    async fn decode<T>(
        &self,
        target: &T,
        operation: &str,
        response: reqwest::Response,
    ) -> Result<CommandResult, AgentClientError>
    where
        T: TargetDescriptor + ?Sized,
    {
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|source| transport(target, operation, source))?;

        debug!(
            node = target.identity(),
            operation,
            status = %status,
            len = bytes.len(),
            "Agent responded"
        );

        serde_json::from_slice(&bytes).map_err(|source| AgentClientError::Decode {
            target: target.identity().to_string(),
            operation: operation.to_string(),
            source,
        })
    }
}

fn transport<T>(target: &T, operation: &str, source: reqwest::Error) -> AgentClientError
where
    T: TargetDescriptor + ?Sized,
{
    AgentClientError::Transport {
        target: target.identity().to_string(),
        operation: operation.to_string(),
        source,
    }
}

/// Pull the `commands` list out of a status response
fn extract_commands(body: Value) -> Result<Vec<CommandResult>, String> {
    let Value::Object(mut body) = body else {
        return Err("status response is not a JSON object".to_string());
    };

    match body.remove("commands") {
        Some(Value::Array(commands)) => Ok(commands),
        Some(_) => Err("`commands` is not a list".to_string()),
        None => Err("status response has no `commands` field".to_string()),
    }
}
