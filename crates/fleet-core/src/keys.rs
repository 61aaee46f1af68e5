//! Composite keys shared by the config and remote models
use crate::error::CoreError;

/// Key of an input in Fleet's `inputs` map: `<policy_template>-<type>`.
pub fn input_key(policy_template: &str, input_type: &str) -> String {
    format!("{}-{}", policy_template, input_type)
}

/// Key of a stream in an input's `streams` map: `<package>.<data_stream>`.
pub fn stream_key(package: &str, data_stream: &str) -> String {
    format!("{}.{}", package, data_stream)
}

/// Recover the data stream name from a dataset of the form `<package>.<data_stream>`.
pub fn data_stream_from_dataset(package: &str, dataset: &str) -> Result<String, CoreError> {
    let malformed = || CoreError::MalformedDataset {
        dataset: dataset.to_string(),
        package: package.to_string(),
    };

    if !dataset.contains('.') {
        return Err(malformed());
    }
    dataset
        .strip_prefix(package)
        .and_then(|rest| rest.strip_prefix('.'))
        .filter(|rest| !rest.is_empty())
        .map(str::to_string)
        .ok_or_else(malformed)
}
