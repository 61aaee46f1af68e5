//! Remote Model: Fleet's key-addressed package policy
//!
//! Fleet addresses inputs by `<policy_template>-<type>` and streams by
//! `<package>.<data_stream>` (see [`crate::keys`]). Both maps are
//! `BTreeMap`s so that iterating them is deterministic.

use crate::data_model::PackageRef;
use crate::keys::stream_key;
use crate::vars::{wrap, Vars};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

fn default_enabled() -> bool {
    true
}

/// Payload submitted to create a package policy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PackagePolicyRequest {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    pub package: PackageRef,
    /// The agent policy this package policy is added to.
    pub policy_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vars: Option<Vars>,
    #[serde(default)]
    pub inputs: BTreeMap<String, RequestInput>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestInput {
    /// Identity of the entry. It is never sent: on the wire it travels in
    /// the map key only. Stored requests that carry it keep it on read.
    #[serde(skip_serializing, default)]
    pub policy_template: String,
    #[serde(rename = "type", skip_serializing, default)]
    pub input_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vars: Option<Vars>,
    #[serde(default)]
    pub streams: BTreeMap<String, RequestStream>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestStream {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vars: Option<Vars>,
}

/// A package policy as Fleet returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemotePolicy {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub namespace: Option<String>,
    pub package: PackageRef,
    pub policy_id: String,
    #[serde(default)]
    pub revision: u64,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub vars: Option<Vars>,
    #[serde(default)]
    pub inputs: BTreeMap<String, RemoteInput>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteInput {
    #[serde(rename = "type")]
    pub input_type: String,
    pub policy_template: String,
    pub enabled: bool,
    #[serde(default)]
    pub vars: Option<Vars>,
    #[serde(default)]
    pub streams: BTreeMap<String, RemoteStream>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteStream {
    #[serde(default)]
    pub data_stream: RemoteDataStream,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub vars: Option<Vars>,
    #[serde(default)]
    pub compiled_stream: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteDataStream {
    /// `<package>.<data_stream>`
    #[serde(default)]
    pub dataset: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub stream_type: Option<String>,
}

impl RequestInput {
    /// `(policy_template, type)` for this entry.
    ///
    /// Without explicit fields the map key is split at its first `-`. That
    /// split is ambiguous when the policy template itself contains a `-`
    /// (`aws-cloudtrail-aws-s3` reads as template `aws`), so requests that
    /// will be read back should carry `policy_template` and `type`.
    fn identity(&self, key: &str) -> (String, String) {
        if !self.policy_template.is_empty() || !self.input_type.is_empty() {
            return (self.policy_template.clone(), self.input_type.clone());
        }
        match key.split_once('-') {
            Some((template, input_type)) => (template.to_string(), input_type.to_string()),
            None => (key.to_string(), String::new()),
        }
    }
}

impl RemotePolicy {
    /// The policy Fleet would return for `request` if it added nothing of
    /// its own: vars come back wrapped as `{"value": v}`, each stream's
    /// dataset is `<package>.<data_stream>`, and unset `enabled` flags are on.
    pub fn from_request(id: impl Into<String>, request: &PackagePolicyRequest) -> Self {
        let inputs = request
            .inputs
            .iter()
            .map(|(key, input)| {
                let (policy_template, input_type) = input.identity(key);
                let streams = input
                    .streams
                    .iter()
                    .map(|(stream_key, stream)| {
                        let remote = RemoteStream {
                            data_stream: RemoteDataStream {
                                dataset: Some(stream_key.clone()),
                                stream_type: None,
                            },
                            enabled: stream.enabled.unwrap_or(true),
                            vars: stream.vars.as_ref().map(wrap),
                            compiled_stream: None,
                        };
                        (stream_key.clone(), remote)
                    })
                    .collect();
                let remote = RemoteInput {
                    input_type,
                    policy_template,
                    enabled: input.enabled.unwrap_or(true),
                    vars: input.vars.as_ref().map(wrap),
                    streams,
                };
                (key.clone(), remote)
            })
            .collect();

        Self {
            id: id.into(),
            name: request.name.clone(),
            description: request.description.clone(),
            namespace: request.namespace.clone(),
            package: request.package.clone(),
            policy_id: request.policy_id.clone(),
            revision: 1,
            updated_at: None,
            vars: request.vars.as_ref().map(wrap),
            inputs,
        }
    }

    /// Look up a stream by input key and data stream name.
    pub fn stream(&self, input_key: &str, data_stream: &str) -> Option<&RemoteStream> {
        self.inputs
            .get(input_key)?
            .streams
            .get(&stream_key(&self.package.name, data_stream))
    }
}
