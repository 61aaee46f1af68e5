//! Unified error model for package policy translation
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A `vars_json` field is not valid JSON or not a JSON object.
    #[error("VARS/{path}: {reason}")]
    InvalidVarsJson { path: String, reason: String },

    /// Malformed JSON handed to the merge filter.
    #[error("PARSE/{0}")]
    Parse(String),

    /// A stream dataset that does not look like `<package>.<data_stream>`.
    #[error("DATASET/{dataset:?} does not match package {package:?}")]
    MalformedDataset { dataset: String, package: String },

    /// Two config entries collapse onto the same remote key.
    #[error("DUPLICATE/{path}: key {key:?} already used")]
    DuplicateKey { path: String, key: String },

    #[error("SERIALIZE/{0}")]
    Serialize(String),

    #[error("OPTIONS/{0}")]
    Options(String),
}

impl CoreError {
    pub(crate) fn invalid_vars(path: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidVarsJson {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialize(err.to_string())
    }
}
