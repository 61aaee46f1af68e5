//! Forward translation: ConfigPolicy → PackagePolicyRequest
use crate::data_model::ConfigPolicy;
use crate::error::CoreError;
use crate::keys::{input_key, stream_key};
use crate::options::{DuplicateKeyPolicy, TranslateOptions};
use crate::remote::{PackagePolicyRequest, RequestInput, RequestStream};
use crate::vars::parse_vars;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

/// Build the create request for `cfg`.
///
/// Every `vars_json` is parsed into a JSON object; a failure names the
/// offending field (`input.1.stream.0.vars_json`). Nothing is filtered: at
/// submission time there is no remote state to compare against.
pub fn to_remote_request(
    cfg: &ConfigPolicy,
    opts: &TranslateOptions,
) -> Result<PackagePolicyRequest, CoreError> {
    let namespace = if cfg.namespace.is_empty() {
        opts.default_namespace.clone()
    } else {
        cfg.namespace.clone()
    };

    let mut inputs = BTreeMap::new();
    for (i, input) in cfg.inputs.iter().enumerate() {
        let mut streams = BTreeMap::new();
        for (j, stream) in input.streams.iter().enumerate() {
            let request = RequestStream {
                enabled: Some(stream.enabled),
                vars: parse_vars(
                    &stream.vars_json,
                    &format!("input.{}.stream.{}.vars_json", i, j),
                )?,
            };
            insert_keyed(
                &mut streams,
                stream_key(&cfg.package.name, &stream.data_stream),
                request,
                opts.duplicate_keys,
                || format!("input.{}.stream.{}", i, j),
            )?;
        }

        let request = RequestInput {
            policy_template: input.policy_template.clone(),
            input_type: input.input_type.clone(),
            enabled: Some(input.enabled),
            vars: parse_vars(&input.vars_json, &format!("input.{}.vars_json", i))?,
            streams,
        };
        insert_keyed(
            &mut inputs,
            input_key(&input.policy_template, &input.input_type),
            request,
            opts.duplicate_keys,
            || format!("input.{}", i),
        )?;
    }

    Ok(PackagePolicyRequest {
        name: cfg.name.clone(),
        description: cfg.description.clone(),
        namespace: Some(namespace),
        package: cfg.package.clone(),
        policy_id: cfg.agent_policy_id.clone(),
        vars: parse_vars(&cfg.vars_json, "vars_json")?,
        inputs,
    })
}

fn insert_keyed<V>(
    map: &mut BTreeMap<String, V>,
    key: String,
    value: V,
    policy: DuplicateKeyPolicy,
    path: impl FnOnce() -> String,
) -> Result<(), CoreError> {
    match (map.entry(key), policy) {
        (Entry::Vacant(slot), _) => {
            slot.insert(value);
        }
        (Entry::Occupied(mut slot), DuplicateKeyPolicy::LastWriteWins) => {
            slot.insert(value);
        }
        (Entry::Occupied(slot), DuplicateKeyPolicy::Reject) => {
            return Err(CoreError::DuplicateKey {
                path: path(),
                key: slot.key().clone(),
            });
        }
    }
    Ok(())
}
