//! FleetApi trait: the package policy operations a Fleet client provides
use crate::error::ClientError;
use fleet_core::{PackagePolicyRequest, RemotePolicy};

/// Synchronous request/response access to Fleet package policies.
///
/// Transport, authentication and retries belong to the implementation.
pub trait FleetApi {
    /// Create a package policy. The returned policy carries the new `id`.
    fn create_package_policy(
        &mut self,
        request: &PackagePolicyRequest,
    ) -> Result<RemotePolicy, ClientError>;

    /// Read a package policy. `Ok(None)` means Fleet does not know `id`.
    fn read_package_policy(&self, id: &str) -> Result<Option<RemotePolicy>, ClientError>;

    fn delete_package_policy(&mut self, id: &str) -> Result<(), ClientError>;
}
