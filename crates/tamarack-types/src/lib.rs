//! Boundary types for the tamarack blob access layer.
//!
//! This crate defines the vocabulary shared between the read orchestrator
//! and its collaborators (group storage backends and the metadata resolver):
//!
//! - [`GroupId`] / [`BlobId`]: identifiers for storage groups and the
//!   physical blobs they hold
//! - [`ChainLink`] / [`ValueChain`]: where a logical key's bytes physically
//!   live, as an ordered sequence of blob sub-ranges
//! - [`ReadRequest`]: a caller's logical read over a value chain
//! - [`GroupReadRequest`] / [`GroupReadResponse`]: the per-group physical
//!   read exchange
//! - [`ResolveResponse`] / [`ResolvedValue`]: the authoritative metadata
//!   lookup used by the repair protocol
//!
//! Everything here is plain data with `serde` derives; no wire format is
//! imposed. The orchestrator in `tamarack-agent` treats these as opaque
//! typed messages and collaborators serialize them however the surrounding
//! transport chooses.

pub mod chain;
pub mod id;
pub mod message;
pub mod request;
pub mod status;

pub use chain::ChainLink;
pub use chain::ResolvedValue;
pub use chain::ValueChain;
pub use id::BlobId;
pub use id::GroupId;
pub use message::FragmentResult;
pub use message::GroupReadItem;
pub use message::GroupReadRequest;
pub use message::GroupReadResponse;
pub use message::ResolveResponse;
pub use request::ReadRequest;
pub use status::ReadPriority;
pub use status::ReplyStatus;
