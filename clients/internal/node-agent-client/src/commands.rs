// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Typed wrappers for the agent commands used during deploy and cleaning
//!
//! Each wrapper only shapes parameters and delegates to
//! [`CommandClient::send_command`] with the command's fixed name and wait
//! flag.

use serde_json::{Map, Value};
use tracing::debug;

use crate::client::CommandClient;
use crate::command::{CommandName, CommandResult};
use crate::error::AgentClientError;
use crate::target::{PortDescriptor, TargetDescriptor};

/// Parameter shape of one agent command
pub trait CommandParams {
    const COMMAND: CommandName;

    fn into_params(self) -> Map<String, Value>;
}

/// `standby.prepare_image`: write an image to the node's disk
#[derive(Clone, Debug, PartialEq)]
pub struct PrepareImageParams {
    pub image_info: Value,
    /// Config drive URL or contents, omitted from the payload when `None`
    pub configdrive: Option<Value>,
}

impl PrepareImageParams {
    /// Take the config drive from the target's instance info, if present
    pub fn for_target<T>(target: &T, image_info: Value) -> Self
    where
        T: TargetDescriptor + ?Sized,
    {
        let configdrive = target
            .instance_info()
            .get("configdrive")
            .filter(|v| !v.is_null())
            .cloned();

        Self {
            image_info,
            configdrive,
        }
    }
}

impl CommandParams for PrepareImageParams {
    const COMMAND: CommandName = CommandName::PrepareImage;

    fn into_params(self) -> Map<String, Value> {
        let mut params = Map::new();
        params.insert("image_info".to_string(), self.image_info);
        if let Some(configdrive) = self.configdrive {
            params.insert("configdrive".to_string(), configdrive);
        }
        params
    }
}

/// `iscsi.start_iscsi_target`: export the node's disk as an iSCSI target
#[derive(Clone, Debug, PartialEq)]
pub struct StartTargetExportParams {
    pub iqn: String,
}

impl CommandParams for StartTargetExportParams {
    const COMMAND: CommandName = CommandName::StartTargetExport;

    fn into_params(self) -> Map<String, Value> {
        let mut params = Map::new();
        params.insert("iqn".to_string(), Value::String(self.iqn));
        params
    }
}

/// `image.install_bootloader`
#[derive(Clone, Debug, PartialEq)]
pub struct InstallBootloaderParams {
    pub root_uuid: String,
    /// Sent as `null` when the image has no EFI system partition
    pub efi_system_part_uuid: Option<String>,
}

impl CommandParams for InstallBootloaderParams {
    const COMMAND: CommandName = CommandName::InstallBootloader;

    fn into_params(self) -> Map<String, Value> {
        let mut params = Map::new();
        params.insert("root_uuid".to_string(), Value::String(self.root_uuid));
        params.insert(
            "efi_system_part_uuid".to_string(),
            self.efi_system_part_uuid
                .map(Value::String)
                .unwrap_or(Value::Null),
        );
        params
    }
}

/// `clean.get_clean_steps`
#[derive(Clone, Debug, PartialEq)]
pub struct GetCleanStepsParams {
    pub node: Value,
    pub ports: Vec<Value>,
}

impl GetCleanStepsParams {
    pub fn for_target<T, P>(target: &T, ports: &[P]) -> Self
    where
        T: TargetDescriptor + ?Sized,
        P: PortDescriptor,
    {
        Self {
            node: target.to_value(),
            ports: ports.iter().map(PortDescriptor::to_value).collect(),
        }
    }
}

impl CommandParams for GetCleanStepsParams {
    const COMMAND: CommandName = CommandName::GetCleanSteps;

    fn into_params(self) -> Map<String, Value> {
        let mut params = Map::new();
        params.insert("node".to_string(), self.node);
        params.insert("ports".to_string(), Value::Array(self.ports));
        params
    }
}

/// `clean.execute_clean_step`
#[derive(Clone, Debug, PartialEq)]
pub struct ExecuteCleanStepParams {
    pub step: Value,
    pub node: Value,
    pub ports: Vec<Value>,
    /// Hardware manager versions the clean steps were computed against,
    /// so the agent can refuse a step list that is out of date
    pub clean_version: Value,
}

impl ExecuteCleanStepParams {
    pub fn for_target<T, P>(target: &T, step: Value, ports: &[P]) -> Self
    where
        T: TargetDescriptor + ?Sized,
        P: PortDescriptor,
    {
        let clean_version = target
            .internal_info()
            .get("hardware_manager_version")
            .cloned()
            .unwrap_or(Value::Null);

        Self {
            step,
            node: target.to_value(),
            ports: ports.iter().map(PortDescriptor::to_value).collect(),
            clean_version,
        }
    }
}

impl CommandParams for ExecuteCleanStepParams {
    const COMMAND: CommandName = CommandName::ExecuteCleanStep;

    fn into_params(self) -> Map<String, Value> {
        let mut params = Map::new();
        params.insert("step".to_string(), self.step);
        params.insert("node".to_string(), self.node);
        params.insert("ports".to_string(), Value::Array(self.ports));
        params.insert("clean_version".to_string(), self.clean_version);
        params
    }
}

impl CommandClient {
    /// Send a typed command with its fixed name and wait flag
    pub async fn dispatch<T, P>(
        &self,
        target: &T,
        params: P,
    ) -> Result<CommandResult, AgentClientError>
    where
        T: TargetDescriptor + ?Sized,
        P: CommandParams,
    {
        self.send_command(
            target,
            P::COMMAND.as_str(),
            params.into_params(),
            P::COMMAND.wait(),
        )
        .await
    }

    /// Ask the agent to download and write `image_info` to disk. Returns
    /// as soon as the agent has accepted the command.
    pub async fn prepare_image<T>(
        &self,
        target: &T,
        image_info: Value,
    ) -> Result<CommandResult, AgentClientError>
    where
        T: TargetDescriptor + ?Sized,
    {
        let image = image_info
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or("<unknown>");
        debug!(image, node = target.identity(), "Preparing image on node");

        let params = PrepareImageParams::for_target(target, image_info);
        self.dispatch(target, params).await
    }

    /// Expose the node's disk as an iSCSI target named `iqn`
    pub async fn start_target_export<T>(
        &self,
        target: &T,
        iqn: &str,
    ) -> Result<CommandResult, AgentClientError>
    where
        T: TargetDescriptor + ?Sized,
    {
        debug!(node = target.identity(), iqn, "Starting iSCSI target on node");

        let params = StartTargetExportParams {
            iqn: iqn.to_string(),
        };
        self.dispatch(target, params).await
    }

    /// Install a boot loader on the freshly written image
    pub async fn install_bootloader<T>(
        &self,
        target: &T,
        root_uuid: &str,
        efi_system_part_uuid: Option<&str>,
    ) -> Result<CommandResult, AgentClientError>
    where
        T: TargetDescriptor + ?Sized,
    {
        debug!(
            node = target.identity(),
            root_uuid,
            efi_system_part_uuid,
            "Installing bootloader on node"
        );

        let params = InstallBootloaderParams {
            root_uuid: root_uuid.to_string(),
            efi_system_part_uuid: efi_system_part_uuid.map(str::to_string),
        };
        self.dispatch(target, params).await
    }

    pub async fn get_clean_steps<T, P>(
        &self,
        target: &T,
        ports: &[P],
    ) -> Result<CommandResult, AgentClientError>
    where
        T: TargetDescriptor + ?Sized,
        P: PortDescriptor,
    {
        debug!(node = target.identity(), "Fetching clean steps from node");

        let params = GetCleanStepsParams::for_target(target, ports);
        self.dispatch(target, params).await
    }

    /// Start one clean step. Progress is reported through `get_status`.
    pub async fn execute_clean_step<T, P>(
        &self,
        target: &T,
        step: Value,
        ports: &[P],
    ) -> Result<CommandResult, AgentClientError>
    where
        T: TargetDescriptor + ?Sized,
        P: PortDescriptor,
    {
        let step_name = step
            .get("step")
            .and_then(Value::as_str)
            .unwrap_or("<unnamed>");
        debug!(
            node = target.identity(),
            step = step_name,
            "Executing clean step on node"
        );

        let params = ExecuteCleanStepParams::for_target(target, step, ports);
        self.dispatch(target, params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::{NodeRecord, PortRecord};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn node() -> NodeRecord {
        NodeRecord::with_endpoint("1be26c0b", "http://10.0.0.5:9999")
    }

    #[test]
    fn test_prepare_image_without_configdrive() {
        let params = PrepareImageParams::for_target(&node(), json!({"id": "img1"}));
        assert_eq!(
            Value::Object(params.into_params()),
            json!({"image_info": {"id": "img1"}})
        );
    }

    #[test]
    fn test_prepare_image_null_configdrive_is_omitted() {
        let mut node = node();
        node.instance_info
            .insert("configdrive".to_string(), Value::Null);

        let params = PrepareImageParams::for_target(&node, json!({"id": "img1"}));
        assert!(!params.into_params().contains_key("configdrive"));
    }

    #[test]
    fn test_prepare_image_with_configdrive() {
        let mut node = node();
        node.instance_info.insert(
            "configdrive".to_string(),
            json!("http://swift/configdrive/1be26c0b"),
        );

        let params = PrepareImageParams::for_target(&node, json!({"id": "img1"}));
        assert_eq!(
            Value::Object(params.into_params()),
            json!({
                "image_info": {"id": "img1"},
                "configdrive": "http://swift/configdrive/1be26c0b"
            })
        );
    }

    #[test]
    fn test_install_bootloader_keeps_null_efi_partition() {
        let params = InstallBootloaderParams {
            root_uuid: "root-uuid".to_string(),
            efi_system_part_uuid: None,
        };
        assert_eq!(
            Value::Object(params.into_params()),
            json!({"root_uuid": "root-uuid", "efi_system_part_uuid": null})
        );
    }

    #[test]
    fn test_clean_step_params() {
        let mut node = node();
        node.internal_info.insert(
            "hardware_manager_version".to_string(),
            json!({"generic_hardware_manager": "1.0"}),
        );
        let ports = vec![PortRecord {
            uuid: "p1".to_string(),
            address: "52:54:00:cf:2d:31".to_string(),
            ..Default::default()
        }];
        let step = json!({"step": "erase_devices", "priority": 10, "interface": "deploy"});

        let params = ExecuteCleanStepParams::for_target(&node, step.clone(), &ports).into_params();

        assert_eq!(params["step"], step);
        assert_eq!(params["node"], node.to_value());
        assert_eq!(
            params["ports"],
            json!([{"uuid": "p1", "address": "52:54:00:cf:2d:31"}])
        );
        assert_eq!(
            params["clean_version"],
            json!({"generic_hardware_manager": "1.0"})
        );
    }

    #[test]
    fn test_clean_version_null_when_unknown() {
        let ports: Vec<Value> = Vec::new();
        let params =
            ExecuteCleanStepParams::for_target(&node(), json!({"step": "x"}), &ports).into_params();
        assert_eq!(params["clean_version"], Value::Null);
        assert_eq!(params["ports"], json!([]));
    }

    #[test]
    fn test_get_clean_steps_params() {
        let ports = vec![json!({"uuid": "p1"}), json!({"uuid": "p2"})];
        let params = GetCleanStepsParams::for_target(&node(), &ports).into_params();
        assert_eq!(params.len(), 2);
        assert_eq!(params["ports"], json!([{"uuid": "p1"}, {"uuid": "p2"}]));
    }
}
