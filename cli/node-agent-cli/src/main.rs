// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Node Agent CLI - send commands to the provisioning agent on a node
//!
//! The target node is either a JSON node record (`--target node.json`,
//! same shape the provisioning service stores) or just an agent URL
//! (`--endpoint-url` / `NODE_AGENT_URL`).
//!
//! # Environment Variables
//!
//! - `NODE_AGENT_URL` - Agent base URL, e.g. `http://10.0.0.5:9999`
//! - `NODE_AGENT_API_VERSION` - Agent API version (default `v1`)
//! - `NODE_AGENT_TIMEOUT_SECS` - Request timeout, `0` disables (default 60)
//! - `NODE_AGENT_CONNECT_TIMEOUT_SECS` - Connect timeout (default 10)
//! - `RUST_LOG` - Log filter (default `node_agent=info,node_agent_client=info`)
//!
//! Flags take precedence over environment variables.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use node_agent_client::{ClientConfig, CommandClient, NodeRecord, TargetDescriptor};
use serde_json::{Map, Value};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "node-agent",
    version,
    about = "Send commands to the provisioning agent on a node"
)]
struct Cli {
    /// Path to a JSON node record describing the target
    ///
    /// Takes precedence over --endpoint-url.
    #[arg(long)]
    target: Option<PathBuf>,

    /// Agent base URL, used when no --target record is given
    #[arg(long, env = "NODE_AGENT_URL")]
    endpoint_url: Option<String>,

    /// Node identity for logs when targeting by --endpoint-url
    #[arg(long, default_value = "cli")]
    node: String,

    /// Agent API version
    #[arg(long)]
    api_version: Option<String>,

    /// Request timeout in seconds (0 disables)
    #[arg(long)]
    timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the command URL resolved for the target
    ResolveEndpoint,
    /// List the status of every command run by the agent
    Status,
    /// Send an arbitrary command
    Send {
        /// Command name, e.g. standby.cache_image
        name: String,
        /// Parameters as a JSON object
        #[arg(long, default_value = "{}")]
        params: String,
        /// Block until the agent has finished the command
        #[arg(long)]
        wait: bool,
    },
    /// Write an image to the node's disk
    PrepareImage {
        /// Image info as a JSON object
        #[arg(long)]
        image_info: String,
    },
    /// Expose the node's disk as an iSCSI target
    StartTargetExport {
        /// iSCSI qualified name
        #[arg(long)]
        iqn: String,
    },
    /// Install a boot loader on the written image
    InstallBootloader {
        #[arg(long)]
        root_uuid: String,
        #[arg(long)]
        efi_system_part_uuid: Option<String>,
    },
    /// Ask the agent for its clean steps
    GetCleanSteps {
        /// JSON file holding the node's ports as a list
        #[arg(long)]
        ports: Option<PathBuf>,
    },
    /// Start one clean step
    ExecuteCleanStep {
        /// Clean step as a JSON object
        #[arg(long)]
        step: String,
        /// JSON file holding the node's ports as a list
        #[arg(long)]
        ports: Option<PathBuf>,
    },
}

/// Parse a JSON object given on the command line
fn parse_object(what: &str, raw: &str) -> Result<Map<String, Value>> {
    match serde_json::from_str(raw).with_context(|| format!("Invalid JSON for {what}"))? {
        Value::Object(map) => Ok(map),
        other => anyhow::bail!("{what} must be a JSON object, got {other}"),
    }
}

fn read_json(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

fn load_ports(path: Option<&Path>) -> Result<Vec<Value>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };
    match read_json(path)? {
        Value::Array(ports) => Ok(ports),
        _ => anyhow::bail!("{} must contain a JSON list of ports", path.display()),
    }
}

/// Build the target node from --target or --endpoint-url
fn resolve_target(cli: &Cli) -> Result<NodeRecord> {
    if let Some(path) = &cli.target {
        let value = read_json(path)?;
        return serde_json::from_value(value)
            .with_context(|| format!("{} is not a node record", path.display()));
    }

    match &cli.endpoint_url {
        Some(url) => Ok(NodeRecord::with_endpoint(cli.node.clone(), url.clone())),
        // A bare record lets the client report the missing endpoint itself
        None => Ok(NodeRecord::new(cli.node.clone())),
    }
}

fn resolve_config(cli: &Cli) -> Result<ClientConfig> {
    let mut config = ClientConfig::from_env()?;
    if let Some(version) = &cli.api_version {
        config.api_version = version.clone();
    }
    if let Some(secs) = cli.timeout_secs {
        config.timeout_secs = (secs > 0).then_some(secs);
    }
    Ok(config)
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "node_agent=info,node_agent_client=info".to_string()),
        ))
        .with_writer(std::io::stderr)
        .init();

    let config = resolve_config(&cli)?;
    let node = resolve_target(&cli)?;
    let client = CommandClient::new(config)?;

    info!(node = node.identity(), "Using node");

    match cli.command {
        Commands::ResolveEndpoint => {
            println!("{}", client.resolve_endpoint(&node)?);
        }
        Commands::Status => {
            let commands = client.get_status(&node).await?;
            print_json(&Value::Array(commands))?;
        }
        Commands::Send { name, params, wait } => {
            let params = parse_object("--params", &params)?;
            let result = client.send_command(&node, &name, params, wait).await?;
            print_json(&result)?;
        }
        Commands::PrepareImage { image_info } => {
            let image_info = parse_object("--image-info", &image_info)?;
            let result = client
                .prepare_image(&node, Value::Object(image_info))
                .await?;
            print_json(&result)?;
        }
        Commands::StartTargetExport { iqn } => {
            let result = client.start_target_export(&node, &iqn).await?;
            print_json(&result)?;
        }
        Commands::InstallBootloader {
            root_uuid,
            efi_system_part_uuid,
        } => {
            let result = client
                .install_bootloader(&node, &root_uuid, efi_system_part_uuid.as_deref())
                .await?;
            print_json(&result)?;
        }
        Commands::GetCleanSteps { ports } => {
            let ports = load_ports(ports.as_deref())?;
            let result = client.get_clean_steps(&node, &ports).await?;
            print_json(&result)?;
        }
        Commands::ExecuteCleanStep { step, ports } => {
            let step = parse_object("--step", &step)?;
            let ports = load_ports(ports.as_deref())?;
            let result = client
                .execute_clean_step(&node, Value::Object(step), &ports)
                .await?;
            print_json(&result)?;
        }
    }

    Ok(())
}
