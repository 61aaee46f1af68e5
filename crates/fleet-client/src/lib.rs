//! Fleet Client: the API seam for package policies
//!
//! [`FleetApi`] is what the reconciliation layer talks to. Real transports
//! implement it on top of [`FleetEndpoint`] URLs and the [`wire`] decoders;
//! [`InMemoryFleet`] implements it without a network for tests.

pub mod api;
pub mod endpoint;
pub mod error;
pub mod memory;
pub mod wire;

pub use api::FleetApi;
pub use endpoint::FleetEndpoint;
pub use error::ClientError;
pub use memory::{InMemoryFleet, PackageDefaults};
pub use wire::{decode_create, decode_delete, decode_read, ItemResponse, Response};
