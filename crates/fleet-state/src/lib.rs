//! Fleet State: package policies stored in a configuration tree
//!
//! The translation core in `fleet_core` is pure. This crate is the layer
//! around it that reads user input from a [`ConfigTree`], persists the
//! reconciled result, and logs what happened.
//!
//! # Example
//!
//! ```
//! use fleet_core::{RemotePolicy, TranslateOptions};
//! use fleet_state::{plan_create, refresh, ConfigTree, JsonTree, Refresh};
//! use serde_json::json;
//!
//! let mut tree = JsonTree::from_value(json!({
//!     "name": "Windows Security log",
//!     "package": [{"name": "winlog", "version": "1.10.0"}],
//!     "agent_policy_id": "agent-1",
//!     "input": [{
//!         "policy_template": "winlogs",
//!         "type": "winlog",
//!         "stream": [{"data_stream": "winlog", "vars_json": "{\"channel\":\"Security\"}"}]
//!     }]
//! }));
//!
//! let opts = TranslateOptions::default();
//! let request = plan_create(&tree, &opts).unwrap();
//! let created = RemotePolicy::from_request("pp-1", &request);
//!
//! let outcome = refresh(&mut tree, Some(&created), &opts).unwrap();
//! assert!(matches!(outcome, Refresh::Updated(_)));
//! assert_eq!(tree.get_string("id").unwrap().as_deref(), Some("pp-1"));
//! ```

pub mod error;
pub mod state;
pub mod tree;

pub use error::StateError;
pub use state::{load_policy, plan_create, refresh, store_policy, Refresh};
pub use tree::{ConfigTree, JsonTree};
