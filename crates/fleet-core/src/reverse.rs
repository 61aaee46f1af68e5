//! Reverse translation: RemotePolicy → ConfigPolicy
//!
//! The result is what gets persisted and diffed against the user's config on
//! the next cycle, so it has to look like what the user wrote:
//!
//! - disabled inputs and streams are left out entirely,
//! - vars are unwrapped from Fleet's `{"value": ...}` envelopes and cut down
//!   to the keys the prior config specified (see [`crate::merge_filter`]),
//! - inputs and streams follow the prior config's order; entries the prior
//!   config does not know come last, sorted by remote key.

use crate::data_model::{ConfigInput, ConfigPolicy, ConfigStream};
use crate::error::CoreError;
use crate::keys::data_stream_from_dataset;
use crate::merge_filter::filter_unspecified_keys;
use crate::options::{CompiledStreamSource, TranslateOptions};
use crate::remote::{RemoteInput, RemotePolicy, RemoteStream};
use crate::vars::{flatten, to_json_string, Vars};

pub fn to_config_model(
    remote: &RemotePolicy,
    prior: Option<&ConfigPolicy>,
    opts: &TranslateOptions,
) -> Result<ConfigPolicy, CoreError> {
    let package = remote.package.name.as_str();

    let mut inputs = Vec::new();
    for input in remote.inputs.values() {
        if !input.enabled {
            continue;
        }
        let prior_input = prior.and_then(|p| prior_input(p, input));
        let position = prior_input.map(|(i, _)| i);
        let input = reconcile_input(package, input, prior_input.map(|(_, p)| p), opts)?;
        inputs.push((rank(position), input));
    }
    inputs.sort_by_key(|(rank, _)| *rank);

    Ok(ConfigPolicy {
        name: remote.name.clone(),
        description: remote.description.clone(),
        namespace: remote
            .namespace
            .clone()
            .unwrap_or_else(|| opts.default_namespace.clone()),
        package: remote.package.clone(),
        agent_policy_id: remote.policy_id.clone(),
        vars_json: reconcile_declared_vars(
            remote.vars.as_ref(),
            prior.map(|p| p.vars_json.as_str()),
        )?,
        inputs: inputs.into_iter().map(|(_, input)| input).collect(),
    })
}

fn reconcile_input(
    package: &str,
    input: &RemoteInput,
    prior: Option<&ConfigInput>,
    opts: &TranslateOptions,
) -> Result<ConfigInput, CoreError> {
    let mut streams = Vec::new();
    for (key, stream) in &input.streams {
        if !stream.enabled {
            continue;
        }
        let dataset = stream.data_stream.dataset.as_deref().unwrap_or(key);
        let data_stream = data_stream_from_dataset(package, dataset)?;
        let prior_stream = prior.and_then(|p| prior_stream(p, &data_stream));
        let position = prior_stream.map(|(j, _)| j);
        let stream = reconcile_stream(data_stream, stream, prior_stream.map(|(_, p)| p), opts)?;
        streams.push((rank(position), stream));
    }
    streams.sort_by_key(|(rank, _)| *rank);

    Ok(ConfigInput {
        policy_template: input.policy_template.clone(),
        input_type: input.input_type.clone(),
        enabled: input.enabled,
        vars_json: reconcile_declared_vars(
            input.vars.as_ref(),
            prior.map(|p| p.vars_json.as_str()),
        )?,
        streams: streams.into_iter().map(|(_, stream)| stream).collect(),
    })
}

fn reconcile_stream(
    data_stream: String,
    stream: &RemoteStream,
    prior: Option<&ConfigStream>,
    opts: &TranslateOptions,
) -> Result<ConfigStream, CoreError> {
    let vars = match &stream.vars {
        Some(vars) => to_json_string(vars)?,
        None => String::new(),
    };

    let compiled_stream = match (&stream.compiled_stream, opts.compiled_stream) {
        (None, _) => String::new(),
        (Some(compiled), CompiledStreamSource::Compiled) => serde_json::to_string(compiled)?,
        (Some(_), CompiledStreamSource::LegacyVars) => serde_json::to_string(&stream.vars)?,
    };

    Ok(ConfigStream {
        data_stream,
        enabled: stream.enabled,
        vars_json: reconcile_vars(stream.vars.as_ref(), prior.map(|p| p.vars_json.as_str()))?,
        compiled_stream,
        vars,
    })
}

/// Flatten remote vars and filter them against the prior `vars_json`.
fn reconcile_vars(remote: Option<&Vars>, prior: Option<&str>) -> Result<String, CoreError> {
    let Some(remote) = remote else {
        return Ok(String::new());
    };
    let candidate = to_json_string(&flatten(remote))?;
    match prior {
        Some(prior) if !prior.trim().is_empty() => filter_unspecified_keys(prior, &candidate),
        _ => Ok(candidate),
    }
}

/// Input and policy level vars: once the prior config exists, an empty
/// `vars_json` there means the user declared no keys at all.
fn reconcile_declared_vars(
    remote: Option<&Vars>,
    prior: Option<&str>,
) -> Result<String, CoreError> {
    match prior {
        Some(prior) if prior.trim().is_empty() => Ok(String::new()),
        prior => reconcile_vars(remote, prior),
    }
}

/// The prior input with the same `(policy_template, type)`, and its position.
/// The last one wins, as it does when duplicates are submitted.
fn prior_input<'a>(prior: &'a ConfigPolicy, input: &RemoteInput) -> Option<(usize, &'a ConfigInput)> {
    prior
        .inputs
        .iter()
        .enumerate()
        .rev()
        .find(|(_, p)| p.policy_template == input.policy_template && p.input_type == input.input_type)
}

fn prior_stream<'a>(prior: &'a ConfigInput, data_stream: &str) -> Option<(usize, &'a ConfigStream)> {
    prior
        .streams
        .iter()
        .enumerate()
        .rev()
        .find(|(_, p)| p.data_stream == data_stream)
}

/// Sort rank for an entry: its position in the prior config, unmatched last.
///
/// Sorting is stable and remote maps iterate in key order, so unmatched
/// entries stay lexicographic.
fn rank(prior_position: Option<usize>) -> usize {
    prior_position.unwrap_or(usize::MAX)
}
