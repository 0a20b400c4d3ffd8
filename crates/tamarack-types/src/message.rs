//! Wire shapes exchanged with group backends and the metadata resolver.
//!
//! Transport failures are reported in-band: collaborators answer every
//! request with a response whose status describes the outcome, rather than
//! failing the call itself. The orchestrator forwards non-ok statuses to
//! the caller unchanged.

use bytes::Bytes;
use serde::Deserialize;
use serde::Serialize;

use crate::chain::ResolvedValue;
use crate::id::BlobId;
use crate::status::ReadPriority;
use crate::status::ReplyStatus;

/// One physical sub-read within a group request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupReadItem {
    /// Blob to read from.
    pub blob: BlobId,
    /// Byte offset within the blob.
    pub offset: u32,
    /// Number of bytes to read.
    pub len: u32,
}

/// The batch of sub-reads sent to one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupReadRequest {
    /// Sub-reads in dispatch order; the response must answer each one, in
    /// the same order.
    pub items: Vec<GroupReadItem>,
    /// Priority class for the group's scheduler.
    pub priority: ReadPriority,
    /// Whether the group should restore degraded blobs before reading.
    pub restore_first: bool,
}

/// Outcome of one sub-read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FragmentResult {
    /// The blob the sub-read addressed.
    pub blob: BlobId,
    /// Per-fragment status; `NoData` means the blob no longer holds the
    /// requested bytes.
    pub status: ReplyStatus,
    /// The bytes read; empty unless `status` is ok.
    pub data: Bytes,
}

impl FragmentResult {
    /// A successful fragment carrying `data`.
    pub fn ok(blob: BlobId, data: Bytes) -> Self {
        Self {
            blob,
            status: ReplyStatus::Ok,
            data,
        }
    }

    /// A fragment whose blob no longer holds the requested bytes.
    pub fn no_data(blob: BlobId) -> Self {
        Self {
            blob,
            status: ReplyStatus::NoData,
            data: Bytes::new(),
        }
    }

    /// A fragment that failed with `status`.
    pub fn failed(blob: BlobId, status: ReplyStatus) -> Self {
        Self {
            blob,
            status,
            data: Bytes::new(),
        }
    }
}

/// A group's answer to a [`GroupReadRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupReadResponse {
    /// Group-level status. When not ok, `fragments` is empty and `error`
    /// carries the backend's message.
    pub status: ReplyStatus,
    /// Backend error message accompanying a non-ok status.
    pub error: Option<String>,
    /// One result per requested item, in request order.
    pub fragments: Vec<FragmentResult>,
}

impl GroupReadResponse {
    /// A successful response answering each item in order.
    pub fn ok(fragments: Vec<FragmentResult>) -> Self {
        Self {
            status: ReplyStatus::Ok,
            error: None,
            fragments,
        }
    }

    /// A group-level failure.
    pub fn failed(status: ReplyStatus, error: impl Into<String>) -> Self {
        Self {
            status,
            error: Some(error.into()),
            fragments: Vec::new(),
        }
    }
}

/// The metadata resolver's answer for one key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveResponse {
    /// Lookup status. When not ok, `values` is empty and `error` carries
    /// the backend's message.
    pub status: ReplyStatus,
    /// Backend error message accompanying a non-ok status.
    pub error: Option<String>,
    /// Mappings found for the key: empty when the key does not exist, and
    /// exactly one entry when it does. More than one entry violates the
    /// metadata layer's contract.
    pub values: Vec<ResolvedValue>,
}

impl ResolveResponse {
    /// A successful lookup that found `value`.
    pub fn found(value: ResolvedValue) -> Self {
        Self {
            status: ReplyStatus::Ok,
            error: None,
            values: vec![value],
        }
    }

    /// A successful lookup that found no mapping for the key.
    pub fn missing() -> Self {
        Self {
            status: ReplyStatus::Ok,
            error: None,
            values: Vec::new(),
        }
    }

    /// A failed lookup.
    pub fn failed(status: ReplyStatus, error: impl Into<String>) -> Self {
        Self {
            status,
            error: Some(error.into()),
            values: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::ChainLink;
    use crate::chain::ValueChain;
    use crate::id::GroupId;

    #[test]
    fn fragment_constructors_set_status_and_data() {
        let ok = FragmentResult::ok(BlobId(1), Bytes::from_static(b"abc"));
        assert_eq!(ok.status, ReplyStatus::Ok);
        assert_eq!(ok.data.as_ref(), b"abc");

        let missing = FragmentResult::no_data(BlobId(2));
        assert_eq!(missing.status, ReplyStatus::NoData);
        assert!(missing.data.is_empty());

        let failed = FragmentResult::failed(BlobId(3), ReplyStatus::Deadline);
        assert_eq!(failed.status, ReplyStatus::Deadline);
        assert!(failed.data.is_empty());
    }

    #[test]
    fn group_response_failed_carries_message() {
        let resp = GroupReadResponse::failed(ReplyStatus::Unavailable, "group offline");
        assert_eq!(resp.status, ReplyStatus::Unavailable);
        assert_eq!(resp.error.as_deref(), Some("group offline"));
        assert!(resp.fragments.is_empty());
    }

    #[test]
    fn resolve_response_constructors() {
        let chain = ValueChain::new(vec![ChainLink::whole(GroupId(1), BlobId(1), 10)]);
        let found = ResolveResponse::found(ResolvedValue::new(chain, true));
        assert_eq!(found.status, ReplyStatus::Ok);
        assert_eq!(found.values.len(), 1);

        let missing = ResolveResponse::missing();
        assert_eq!(missing.status, ReplyStatus::Ok);
        assert!(missing.values.is_empty());

        let failed = ResolveResponse::failed(ReplyStatus::Error, "metadata down");
        assert_eq!(failed.status, ReplyStatus::Error);
        assert_eq!(failed.error.as_deref(), Some("metadata down"));
    }

    #[test]
    fn group_request_serialization_roundtrip() {
        let req = GroupReadRequest {
            items: vec![GroupReadItem {
                blob: BlobId(5),
                offset: 16,
                len: 64,
            }],
            priority: ReadPriority::Background,
            restore_first: true,
        };
        let json = serde_json::to_string(&req).unwrap();
        let back: GroupReadRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(req, back);
    }
}
