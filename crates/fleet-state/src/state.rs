//! Persisted package policy state
//!
//! Reads the user's package policy out of a [`ConfigTree`], turns it into a
//! create request, and writes the reconciled view of Fleet's answer back.
//! The tree layout follows the resource schema:
//!
//! ```text
//! id, name, description, namespace, agent_policy_id, vars_json
//! package.0.{name,version}
//! input.N.{policy_template,type,enabled,vars_json}
//! input.N.stream.M.{data_stream,enabled,vars_json,compiled_stream,vars}
//! ```

use crate::error::StateError;
use crate::tree::ConfigTree;
use fleet_core::{
    to_config_model, to_remote_request, ConfigInput, ConfigPolicy, ConfigStream,
    PackagePolicyRequest, PackageRef, RemotePolicy, TranslateOptions,
};
use serde_json::Value;

/// Outcome of refreshing state from a Fleet read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Refresh {
    /// The reconciled policy now stored in the tree.
    Updated(ConfigPolicy),
    /// Fleet no longer has the policy; the tree's `id` was cleared.
    Gone,
}

pub fn load_policy(tree: &impl ConfigTree) -> Result<ConfigPolicy, StateError> {
    let mut cfg = ConfigPolicy::new(
        required_string(tree, "name")?,
        PackageRef::new(
            required_string(tree, "package.0.name")?,
            required_string(tree, "package.0.version")?,
        ),
        required_string(tree, "agent_policy_id")?,
    );
    cfg.description = tree.get_string("description")?;
    if let Some(namespace) = tree.get_string("namespace")? {
        cfg.namespace = namespace;
    }
    cfg.vars_json = tree.get_string("vars_json")?.unwrap_or_default();

    for i in 0..tree.get_list_len("input")? {
        let prefix = format!("input.{}", i);
        let mut input = ConfigInput::new(
            required_string(tree, &format!("{}.policy_template", prefix))?,
            required_string(tree, &format!("{}.type", prefix))?,
        )
        .enabled(tree.get_bool(&format!("{}.enabled", prefix))?.unwrap_or(true))
        .with_vars(
            tree.get_string(&format!("{}.vars_json", prefix))?
                .unwrap_or_default(),
        );

        for j in 0..tree.get_list_len(&format!("{}.stream", prefix))? {
            let prefix = format!("{}.stream.{}", prefix, j);
            let mut stream =
                ConfigStream::new(required_string(tree, &format!("{}.data_stream", prefix))?)
                    .enabled(tree.get_bool(&format!("{}.enabled", prefix))?.unwrap_or(true))
                    .with_vars(
                        tree.get_string(&format!("{}.vars_json", prefix))?
                            .unwrap_or_default(),
                    );
            stream.compiled_stream = tree
                .get_string(&format!("{}.compiled_stream", prefix))?
                .unwrap_or_default();
            stream.vars = tree
                .get_string(&format!("{}.vars", prefix))?
                .unwrap_or_default();
            input.streams.push(stream);
        }
        cfg.inputs.push(input);
    }

    Ok(cfg)
}

/// Write `cfg` into the tree, replacing any previous inputs.
pub fn store_policy(tree: &mut impl ConfigTree, cfg: &ConfigPolicy) {
    tree.set("name", Value::from(cfg.name.as_str()));
    match &cfg.description {
        Some(description) => tree.set("description", Value::from(description.as_str())),
        None => tree.remove("description"),
    }
    tree.set("namespace", Value::from(cfg.namespace.as_str()));
    tree.set("package.0.name", Value::from(cfg.package.name.as_str()));
    tree.set("package.0.version", Value::from(cfg.package.version.as_str()));
    tree.set("agent_policy_id", Value::from(cfg.agent_policy_id.as_str()));
    set_optional_text(tree, "vars_json", &cfg.vars_json);

    tree.remove("input");
    for (i, input) in cfg.inputs.iter().enumerate() {
        let prefix = format!("input.{}", i);
        tree.set(
            &format!("{}.policy_template", prefix),
            Value::from(input.policy_template.as_str()),
        );
        tree.set(&format!("{}.type", prefix), Value::from(input.input_type.as_str()));
        tree.set(&format!("{}.enabled", prefix), Value::from(input.enabled));
        set_optional_text(tree, &format!("{}.vars_json", prefix), &input.vars_json);

        if input.streams.is_empty() {
            tree.set(&format!("{}.stream", prefix), Value::Array(Vec::new()));
        }
        for (j, stream) in input.streams.iter().enumerate() {
            let prefix = format!("{}.stream.{}", prefix, j);
            tree.set(
                &format!("{}.data_stream", prefix),
                Value::from(stream.data_stream.as_str()),
            );
            tree.set(&format!("{}.enabled", prefix), Value::from(stream.enabled));
            set_optional_text(tree, &format!("{}.vars_json", prefix), &stream.vars_json);
            set_optional_text(
                tree,
                &format!("{}.compiled_stream", prefix),
                &stream.compiled_stream,
            );
            set_optional_text(tree, &format!("{}.vars", prefix), &stream.vars);
        }
    }
}

/// Build the create request from the user's config in `tree`.
pub fn plan_create(
    tree: &impl ConfigTree,
    opts: &TranslateOptions,
) -> Result<PackagePolicyRequest, StateError> {
    let cfg = load_policy(tree)?;
    let request = to_remote_request(&cfg, opts)?;
    tracing::debug!(
        name = %request.name,
        package = %request.package.name,
        inputs = request.inputs.len(),
        "planned package policy create"
    );
    Ok(request)
}

/// Reconcile a Fleet read into `tree`.
///
/// `None` means Fleet answered "not found": the policy was deleted out of
/// band, so the stored id is dropped. Otherwise the remote view is translated
/// back with the tree's current content as prior config and stored.
pub fn refresh(
    tree: &mut impl ConfigTree,
    remote: Option<&RemotePolicy>,
    opts: &TranslateOptions,
) -> Result<Refresh, StateError> {
    let Some(remote) = remote else {
        let id = tree.get_string("id")?.unwrap_or_default();
        tracing::info!(policy_id = %id, "package policy not found, removing from state");
        tree.remove("id");
        return Ok(Refresh::Gone);
    };

    let prior = if tree.get_string("name")?.is_some() {
        Some(load_policy(&*tree)?)
    } else {
        tracing::warn!(policy_id = %remote.id, "no prior state, storing remote vars unfiltered");
        None
    };

    let cfg = to_config_model(remote, prior.as_ref(), opts)?;
    tracing::debug!(
        policy_id = %remote.id,
        revision = remote.revision,
        inputs = cfg.inputs.len(),
        streams = cfg.inputs.iter().map(|i| i.streams.len()).sum::<usize>(),
        "refreshed package policy"
    );

    tree.set("id", Value::from(remote.id.as_str()));
    store_policy(tree, &cfg);
    Ok(Refresh::Updated(cfg))
}

fn required_string(tree: &impl ConfigTree, path: &str) -> Result<String, StateError> {
    tree.get_string(path)?
        .ok_or_else(|| StateError::MissingField(path.to_string()))
}

fn set_optional_text(tree: &mut impl ConfigTree, path: &str, text: &str) {
    if text.is_empty() {
        tree.remove(path);
    } else {
        tree.set(path, Value::from(text));
    }
}
