//! Config Model: the ordered, user-authored package policy
use serde::{Deserialize, Serialize};

pub const DEFAULT_NAMESPACE: &str = "default";

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRef {
    pub name: String,
    pub version: String,
}

impl PackageRef {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

/// A package policy as the user wrote it.
///
/// `inputs` and each input's `streams` keep authoring order. The order means
/// nothing to Fleet but it is what the stored state is compared against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigPolicy {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_namespace")]
    pub namespace: String,
    pub package: PackageRef,
    pub agent_policy_id: String,
    /// Root level variables, as JSON text.
    #[serde(default)]
    pub vars_json: String,
    #[serde(default)]
    pub inputs: Vec<ConfigInput>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigInput {
    pub policy_template: String,
    #[serde(rename = "type")]
    pub input_type: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub vars_json: String,
    #[serde(default)]
    pub streams: Vec<ConfigStream>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigStream {
    pub data_stream: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub vars_json: String,
    /// Read-only: the final configuration Fleet compiled for this stream.
    #[serde(default)]
    pub compiled_stream: String,
    /// Read-only: the stream vars as Fleet holds them, defaults included.
    #[serde(default)]
    pub vars: String,
}

impl ConfigPolicy {
    pub fn new(
        name: impl Into<String>,
        package: PackageRef,
        agent_policy_id: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: None,
            namespace: default_namespace(),
            package,
            agent_policy_id: agent_policy_id.into(),
            vars_json: String::new(),
            inputs: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_vars(mut self, vars_json: impl Into<String>) -> Self {
        self.vars_json = vars_json.into();
        self
    }

    pub fn with_input(mut self, input: ConfigInput) -> Self {
        self.inputs.push(input);
        self
    }

    /// Find an input by its `(policy_template, type)` identity.
    pub fn find_input(&self, policy_template: &str, input_type: &str) -> Option<&ConfigInput> {
        self.inputs
            .iter()
            .find(|i| i.policy_template == policy_template && i.input_type == input_type)
    }
}

impl ConfigInput {
    pub fn new(policy_template: impl Into<String>, input_type: impl Into<String>) -> Self {
        Self {
            policy_template: policy_template.into(),
            input_type: input_type.into(),
            enabled: true,
            vars_json: String::new(),
            streams: Vec::new(),
        }
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_vars(mut self, vars_json: impl Into<String>) -> Self {
        self.vars_json = vars_json.into();
        self
    }

    pub fn with_stream(mut self, stream: ConfigStream) -> Self {
        self.streams.push(stream);
        self
    }

    pub fn find_stream(&self, data_stream: &str) -> Option<&ConfigStream> {
        self.streams.iter().find(|s| s.data_stream == data_stream)
    }
}

impl ConfigStream {
    pub fn new(data_stream: impl Into<String>) -> Self {
        Self {
            data_stream: data_stream.into(),
            enabled: true,
            vars_json: String::new(),
            compiled_stream: String::new(),
            vars: String::new(),
        }
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_vars(mut self, vars_json: impl Into<String>) -> Self {
        self.vars_json = vars_json.into();
        self
    }
}
