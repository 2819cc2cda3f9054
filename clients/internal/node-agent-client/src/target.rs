// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Target descriptors
//!
//! The client never owns node or port state. Callers hand it anything that
//! implements [`TargetDescriptor`] (and [`PortDescriptor`] for the clean
//! commands); the client reads connection metadata from it on every call.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key holding the agent base URL, e.g. `http://10.0.0.5:9999`
pub const ENDPOINT_URL_KEY: &str = "endpoint_url";

/// Which info mapping of a target a lookup reads from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InfoScope {
    /// Metadata written by the provisioning service itself
    Internal,
    /// Operator-supplied metadata
    Public,
}

/// One step of the endpoint lookup chain
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EndpointLookup {
    pub scope: InfoScope,
    pub key: &'static str,
}

/// Ordered chain of places the agent endpoint is looked up, first hit wins.
///
/// The public-info entry is a permanent compatibility path: nodes booted by
/// older provisioning code only carry the URL in their public info, and
/// some callers still populate only that field.
pub const ENDPOINT_LOOKUP: &[EndpointLookup] = &[
    EndpointLookup {
        scope: InfoScope::Internal,
        key: ENDPOINT_URL_KEY,
    },
    EndpointLookup {
        scope: InfoScope::Public,
        key: ENDPOINT_URL_KEY,
    },
];

/// A managed node as seen by the command client.
pub trait TargetDescriptor {
    /// Stable label (usually the node UUID) used in logs and errors
    fn identity(&self) -> &str;

    /// Provisioning-owned metadata
    fn internal_info(&self) -> &Map<String, Value>;

    /// Operator-supplied metadata
    fn public_info(&self) -> &Map<String, Value>;

    /// Metadata describing the instance being deployed onto the node
    fn instance_info(&self) -> &Map<String, Value>;

    /// Full serialized form, sent to the agent by the clean commands
    fn to_value(&self) -> Value;

    fn info(&self, scope: InfoScope) -> &Map<String, Value> {
        match scope {
            InfoScope::Internal => self.internal_info(),
            InfoScope::Public => self.public_info(),
        }
    }
}

/// A network port attached to a node
pub trait PortDescriptor {
    fn to_value(&self) -> Value;
}

impl PortDescriptor for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

/// Walk [`ENDPOINT_LOOKUP`] and return the first usable endpoint together
/// with the lookup step that produced it. Null, empty and non-string values
/// count as absent.
pub fn lookup_endpoint<T>(target: &T) -> Option<(&'static EndpointLookup, &str)>
where
    T: TargetDescriptor + ?Sized,
{
    ENDPOINT_LOOKUP.iter().find_map(|lookup| {
        target
            .info(lookup.scope)
            .get(lookup.key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(|url| (lookup, url))
    })
}

/// Plain node record for callers that have no node model of their own
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub uuid: String,
    #[serde(default)]
    pub internal_info: Map<String, Value>,
    #[serde(default)]
    pub public_info: Map<String, Value>,
    #[serde(default)]
    pub instance_info: Map<String, Value>,
    /// Any other node attributes, passed through to the agent untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NodeRecord {
    pub fn new(uuid: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            ..Default::default()
        }
    }

    /// Record whose only metadata is the agent endpoint in internal info
    pub fn with_endpoint(uuid: impl Into<String>, endpoint_url: impl Into<String>) -> Self {
        let mut node = Self::new(uuid);
        node.internal_info.insert(
            ENDPOINT_URL_KEY.to_string(),
            Value::String(endpoint_url.into()),
        );
        node
    }
}

impl TargetDescriptor for NodeRecord {
    fn identity(&self) -> &str {
        &self.uuid
    }

    fn internal_info(&self) -> &Map<String, Value> {
        &self.internal_info
    }

    fn public_info(&self) -> &Map<String, Value> {
        &self.public_info
    }

    fn instance_info(&self) -> &Map<String, Value> {
        &self.instance_info
    }

    fn to_value(&self) -> Value {
        let mut map = self.extra.clone();
        map.insert("uuid".to_string(), Value::String(self.uuid.clone()));
        map.insert(
            "internal_info".to_string(),
            Value::Object(self.internal_info.clone()),
        );
        map.insert(
            "public_info".to_string(),
            Value::Object(self.public_info.clone()),
        );
        map.insert(
            "instance_info".to_string(),
            Value::Object(self.instance_info.clone()),
        );
        Value::Object(map)
    }
}

/// Plain port record
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PortRecord {
    pub uuid: String,
    /// MAC address
    pub address: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PortDescriptor for PortRecord {
    fn to_value(&self) -> Value {
        let mut map = self.extra.clone();
        map.insert("uuid".to_string(), Value::String(self.uuid.clone()));
        map.insert("address".to_string(), Value::String(self.address.clone()));
        Value::Object(map)
    }
}
