//! Collaborator interfaces consumed by the orchestrator.
//!
//! Both traits report failures in-band: implementations answer every
//! call with a response whose status describes the outcome, so transport
//! errors surface as non-ok statuses rather than as `Err` values.

use async_trait::async_trait;
use tamarack_types::GroupId;
use tamarack_types::GroupReadRequest;
use tamarack_types::GroupReadResponse;
use tamarack_types::ResolveResponse;

/// Transport to the storage groups.
#[async_trait]
pub trait GroupClient: Send + Sync {
    /// Execute one batch of sub-reads against `group`.
    ///
    /// The response answers each requested item, in request order, unless
    /// its group-level status is non-ok.
    async fn read_group(&self, group: GroupId, request: GroupReadRequest) -> GroupReadResponse;
}

/// Authoritative metadata lookup used by the repair sub-protocol.
#[async_trait]
pub trait Resolver: Send + Sync {
    /// Return the current value-chain mapping for `key`.
    async fn resolve(&self, key: &str) -> ResolveResponse;
}
