// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Node Agent Client Library
//!
//! A thin client for the provisioning agent that runs inside the ramdisk of
//! a managed node. The agent exposes a single command endpoint; this crate
//! resolves that endpoint from the node's metadata, posts named commands
//! with a JSON parameter object, and hands the decoded JSON response back
//! to the caller untouched.
//!
//! ## Usage
//!
//! ```ignore
//! use node_agent_client::{ClientConfig, CommandClient, NodeRecord};
//!
//! let client = CommandClient::new(ClientConfig::default())?;
//!
//! // Any type implementing `TargetDescriptor` works; `NodeRecord` is a
//! // plain serde record for callers without their own node model.
//! let node: NodeRecord = serde_json::from_str(&std::fs::read_to_string("node.json")?)?;
//!
//! // Raw dispatch
//! let result = client
//!     .send_command(&node, "standby.cache_image", params, false)
//!     .await?;
//!
//! // Typed wrappers fix the command name and the wait flag
//! client.prepare_image(&node, image_info).await?;
//! let running = client.get_status(&node).await?;
//! ```
//!
//! The client performs no retries. Every failure is an
//! [`AgentClientError`] naming the target and the attempted operation;
//! [`AgentClientError::is_retryable`] tells callers which ones are worth
//! another attempt under their own policy.

mod client;
pub mod command;
mod commands;
pub mod config;
pub mod error;
pub mod target;

pub use client::CommandClient;
pub use command::{Command, CommandName, CommandResult};
pub use commands::{
    CommandParams, ExecuteCleanStepParams, GetCleanStepsParams, InstallBootloaderParams,
    PrepareImageParams, StartTargetExportParams,
};
pub use config::{ClientConfig, DEFAULT_API_VERSION};
pub use error::AgentClientError;
pub use target::{
    ENDPOINT_LOOKUP, EndpointLookup, InfoScope, NodeRecord, PortDescriptor, PortRecord,
    TargetDescriptor,
};
