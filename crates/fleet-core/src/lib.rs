//! Fleet Core: package policy translation and reconciliation
//!
//! A package policy exists in two shapes. The user writes an ordered
//! [`ConfigPolicy`]; Fleet stores a [`RemotePolicy`] whose inputs and streams
//! are maps keyed by composite identifiers, and whose vars it freely enriches.
//!
//! ```text
//! ConfigPolicy ──to_remote_request──▶ PackagePolicyRequest ──▶ Fleet
//!      ▲                                                         │
//!      └──────to_config_model(remote, prior)◀── RemotePolicy ◀───┘
//! ```
//!
//! Applying the same config twice must not produce a diff, so the reverse
//! direction restores the prior ordering and filters vars down to the keys
//! the user specified.
//!
//! # Example
//!
//! ```
//! use fleet_core::{
//!     to_config_model, to_remote_request, ConfigInput, ConfigPolicy, ConfigStream,
//!     PackageRef, RemotePolicy, TranslateOptions,
//! };
//!
//! let cfg = ConfigPolicy::new("Windows Security log", PackageRef::new("winlog", "1.10.0"), "agent-1")
//!     .with_input(
//!         ConfigInput::new("winlogs", "winlog")
//!             .with_stream(ConfigStream::new("winlog").with_vars(r#"{"channel":"Security"}"#)),
//!     );
//!
//! let opts = TranslateOptions::default();
//! let request = to_remote_request(&cfg, &opts).unwrap();
//! assert!(request.inputs.contains_key("winlogs-winlog"));
//!
//! let remote = RemotePolicy::from_request("pp-1", &request);
//! let stored = to_config_model(&remote, Some(&cfg), &opts).unwrap();
//! assert_eq!(stored.inputs[0].streams[0].vars_json, r#"{"channel":"Security"}"#);
//! ```

pub mod data_model;
pub mod error;
pub mod forward;
pub mod keys;
pub mod merge_filter;
pub mod options;
pub mod remote;
pub mod reverse;
pub mod vars;

pub use data_model::{ConfigInput, ConfigPolicy, ConfigStream, PackageRef, DEFAULT_NAMESPACE};
pub use error::CoreError;
pub use forward::to_remote_request;
pub use keys::{data_stream_from_dataset, input_key, stream_key};
pub use merge_filter::{canonicalize, filter_unspecified_keys, filter_unspecified_map};
pub use options::{CompiledStreamSource, DuplicateKeyPolicy, TranslateOptions};
pub use remote::{
    PackagePolicyRequest, RemoteDataStream, RemoteInput, RemotePolicy, RemoteStream,
    RequestInput, RequestStream,
};
pub use reverse::to_config_model;
pub use vars::Vars;
