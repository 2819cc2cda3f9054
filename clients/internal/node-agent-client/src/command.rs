// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Command payloads

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Decoded agent response, returned to callers without interpretation
pub type CommandResult = Value;

/// A named agent command and its parameters.
///
/// Serializes to the request body the agent expects:
/// `{"name": <command>, "params": <object>}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Command {
    name: String,
    params: Map<String, Value>,
}

impl Command {
    pub fn new(name: impl Into<String>, params: Map<String, Value>) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &Map<String, Value> {
        &self.params
    }
}

/// Commands with a typed wrapper on [`crate::CommandClient`].
///
/// Each command carries a fixed `wait` flag. Synchronous commands are sent
/// with `wait=true` and the agent answers once the command has finished;
/// the others return as soon as the agent has accepted the command and are
/// polled through `get_status`. The flag is part of the agent contract and
/// is not a caller choice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CommandName {
    PrepareImage,
    StartTargetExport,
    InstallBootloader,
    GetCleanSteps,
    ExecuteCleanStep,
}

impl CommandName {
    pub const ALL: [CommandName; 5] = [
        CommandName::PrepareImage,
        CommandName::StartTargetExport,
        CommandName::InstallBootloader,
        CommandName::GetCleanSteps,
        CommandName::ExecuteCleanStep,
    ];

    /// Wire name, `<extension>.<method>`
    pub fn as_str(self) -> &'static str {
        match self {
            CommandName::PrepareImage => "standby.prepare_image",
            CommandName::StartTargetExport => "iscsi.start_iscsi_target",
            CommandName::InstallBootloader => "image.install_bootloader",
            CommandName::GetCleanSteps => "clean.get_clean_steps",
            CommandName::ExecuteCleanStep => "clean.execute_clean_step",
        }
    }

    pub fn wait(self) -> bool {
        match self {
            CommandName::PrepareImage | CommandName::ExecuteCleanStep => false,
            CommandName::StartTargetExport
            | CommandName::InstallBootloader
            | CommandName::GetCleanSteps => true,
        }
    }
}

impl fmt::Display for CommandName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
