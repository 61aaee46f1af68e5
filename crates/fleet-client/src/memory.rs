//! In-memory Fleet
//!
//! Behaves like Fleet as far as the translation layer can tell: it assigns
//! ids, wraps vars into `{"value": ...}` envelopes, merges package defaults
//! into every input and stream, and compiles enabled streams. Responses go
//! through the same decoding as real ones.

use crate::api::FleetApi;
use crate::error::ClientError;
use crate::wire::{decode_create, decode_delete, decode_read, Response, STATUS_NOT_FOUND};
use chrono::Utc;
use fleet_core::vars::{flatten, VALUE_FIELD};
use fleet_core::{PackagePolicyRequest, RemotePolicy, Vars};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Vars a package declares with defaults, in Fleet's envelope form.
///
/// ```yaml
/// stream_vars:
///   processors: { type: yaml }
///   tags: { type: text, value: [] }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageDefaults {
    pub policy_vars: Vars,
    pub input_vars: Vars,
    pub stream_vars: Vars,
}

impl PackageDefaults {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ClientError> {
        serde_yaml::from_str(yaml).map_err(|e| ClientError::Config(e.to_string()))
    }
}

#[derive(Debug, Default)]
pub struct InMemoryFleet {
    policies: BTreeMap<String, RemotePolicy>,
    defaults: BTreeMap<String, PackageDefaults>,
    failure: RefCell<Option<Response>>,
}

impl InMemoryFleet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the defaults Fleet merges in for `package`.
    pub fn with_defaults(mut self, package: impl Into<String>, defaults: PackageDefaults) -> Self {
        self.defaults.insert(package.into(), defaults);
        self
    }

    /// Answer the next call with `status` and `body` instead of handling it.
    pub fn fail_next(&mut self, status: u16, body: impl Into<String>) {
        *self.failure.borrow_mut() = Some(Response::new(status, body));
    }

    /// Drop a policy behind the client's back, as another Fleet user would.
    pub fn remove_out_of_band(&mut self, id: &str) -> Option<RemotePolicy> {
        self.policies.remove(id)
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    fn handle_create(&mut self, request: &PackagePolicyRequest) -> Result<Response, ClientError> {
        if let Some(failure) = self.failure.take() {
            return Ok(failure);
        }

        let id = Uuid::new_v4().to_string();
        let mut policy = RemotePolicy::from_request(id.clone(), request);
        policy.updated_at = Some(Utc::now());
        if let Some(defaults) = self.defaults.get(&policy.package.name) {
            apply_defaults(&mut policy, defaults);
        }
        compile_streams(&mut policy);

        tracing::debug!(policy_id = %id, inputs = policy.inputs.len(), "created package policy");
        let response = Response::item(&policy)?;
        self.policies.insert(id, policy);
        Ok(response)
    }

    fn handle_read(&self, id: &str) -> Result<Response, ClientError> {
        if let Some(failure) = self.failure.take() {
            return Ok(failure);
        }
        match self.policies.get(id) {
            Some(policy) => Response::item(policy),
            None => Ok(not_found(id)),
        }
    }

    fn handle_delete(&mut self, id: &str) -> Result<Response, ClientError> {
        if let Some(failure) = self.failure.take() {
            return Ok(failure);
        }
        match self.policies.remove(id) {
            Some(_) => {
                tracing::debug!(policy_id = %id, "deleted package policy");
                Ok(Response::new(200, format!(r#"{{"id":"{}"}}"#, id)))
            }
            None => Ok(not_found(id)),
        }
    }
}

impl FleetApi for InMemoryFleet {
    fn create_package_policy(
        &mut self,
        request: &PackagePolicyRequest,
    ) -> Result<RemotePolicy, ClientError> {
        decode_create(&self.handle_create(request)?)
    }

    fn read_package_policy(&self, id: &str) -> Result<Option<RemotePolicy>, ClientError> {
        decode_read(&self.handle_read(id)?)
    }

    fn delete_package_policy(&mut self, id: &str) -> Result<(), ClientError> {
        decode_delete(&self.handle_delete(id)?)
    }
}

fn not_found(id: &str) -> Response {
    Response::new(
        STATUS_NOT_FOUND,
        format!(
            r#"{{"statusCode":404,"error":"Not Found","message":"Package policy {} not found"}}"#,
            id
        ),
    )
}

fn apply_defaults(policy: &mut RemotePolicy, defaults: &PackageDefaults) {
    merge_defaults(&mut policy.vars, &defaults.policy_vars);
    for input in policy.inputs.values_mut() {
        merge_defaults(&mut input.vars, &defaults.input_vars);
        for stream in input.streams.values_mut() {
            merge_defaults(&mut stream.vars, &defaults.stream_vars);
        }
    }
}

/// Merge declared defaults under the submitted vars. A submitted value
/// replaces the default's `value` but keeps its metadata (`type`, ...).
fn merge_defaults(vars: &mut Option<Vars>, defaults: &Vars) {
    if defaults.is_empty() {
        return;
    }
    let vars = vars.get_or_insert_with(Vars::new);
    for (key, default) in defaults {
        match vars.get_mut(key) {
            Some(Value::Object(submitted)) => {
                if let Value::Object(meta) = default {
                    for (field, value) in meta {
                        if field != VALUE_FIELD {
                            submitted.entry(field.clone()).or_insert_with(|| value.clone());
                        }
                    }
                }
            }
            Some(_) => {}
            None => {
                vars.insert(key.clone(), default.clone());
            }
        }
    }
}

fn compile_streams(policy: &mut RemotePolicy) {
    for input in policy.inputs.values_mut() {
        for stream in input.streams.values_mut() {
            if !stream.enabled {
                continue;
            }
            let compiled = stream.vars.as_ref().map(flatten).unwrap_or_default();
            stream.compiled_stream = Some(Value::Object(compiled));
        }
    }
}
