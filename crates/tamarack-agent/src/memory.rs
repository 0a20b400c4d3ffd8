//! In-memory collaborators for testing.
//!
//! Deterministic stand-ins for the storage groups and the metadata
//! resolver. They answer immediately, record what they were asked, and
//! can be scripted to fail, lose blobs, or hand back superseding chains,
//! which covers every path of the repair sub-protocol without a cluster.

use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;
use tamarack_types::BlobId;
use tamarack_types::FragmentResult;
use tamarack_types::GroupId;
use tamarack_types::GroupReadRequest;
use tamarack_types::GroupReadResponse;
use tamarack_types::ReplyStatus;
use tamarack_types::ResolveResponse;

use crate::traits::GroupClient;
use crate::traits::Resolver;

/// In-memory cluster of storage groups for testing.
///
/// This type is Clone-able - clones share the same underlying storage.
///
/// Uses `parking_lot::RwLock` instead of `std::sync::RwLock` for:
/// - No lock poisoning (panics in critical section don't poison the lock)
/// - Better performance (faster lock acquisition)
#[derive(Clone, Default)]
pub struct InMemoryCluster {
    inner: Arc<RwLock<ClusterInner>>,
}

#[derive(Default)]
struct ClusterInner {
    groups: HashMap<GroupId, HashMap<BlobId, Bytes>>,
    failures: HashMap<GroupId, (ReplyStatus, String)>,
    requests: Vec<(GroupId, GroupReadRequest)>,
}

impl InMemoryCluster {
    /// Create a new in-memory cluster with no groups.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a blob's bytes in a group, creating the group as needed.
    pub fn put_blob(&self, group: GroupId, blob: BlobId, data: impl Into<Bytes>) {
        self.inner
            .write()
            .groups
            .entry(group)
            .or_default()
            .insert(blob, data.into());
    }

    /// Remove a blob so reads against it answer no-data.
    pub fn remove_blob(&self, group: GroupId, blob: BlobId) {
        if let Some(blobs) = self.inner.write().groups.get_mut(&group) {
            blobs.remove(&blob);
        }
    }

    /// Script a group-level failure for every subsequent read of `group`.
    pub fn fail_group(&self, group: GroupId, status: ReplyStatus, message: impl Into<String>) {
        self.inner
            .write()
            .failures
            .insert(group, (status, message.into()));
    }

    /// Clear a previously scripted failure.
    pub fn heal_group(&self, group: GroupId) {
        self.inner.write().failures.remove(&group);
    }

    /// Requests this cluster has served, in arrival order.
    pub fn requests(&self) -> Vec<(GroupId, GroupReadRequest)> {
        self.inner.read().requests.clone()
    }
}

#[async_trait]
impl GroupClient for InMemoryCluster {
    async fn read_group(&self, group: GroupId, request: GroupReadRequest) -> GroupReadResponse {
        let mut inner = self.inner.write();
        inner.requests.push((group, request.clone()));

        if let Some((status, message)) = inner.failures.get(&group) {
            return GroupReadResponse::failed(*status, message.clone());
        }

        let blobs = inner.groups.get(&group);
        let fragments = request
            .items
            .iter()
            .map(|item| match blobs.and_then(|blobs| blobs.get(&item.blob)) {
                Some(data) => {
                    let start = item.offset as usize;
                    let end = start + item.len as usize;
                    if end <= data.len() {
                        FragmentResult::ok(item.blob, data.slice(start..end))
                    } else {
                        FragmentResult::failed(item.blob, ReplyStatus::Error)
                    }
                }
                None => FragmentResult::no_data(item.blob),
            })
            .collect();

        GroupReadResponse::ok(fragments)
    }
}

/// Scripted metadata resolver for testing.
///
/// Responses are served in the order they were queued; once the queue
/// empties, the last served response repeats. With nothing queued it
/// reports a missing mapping.
///
/// This type is Clone-able - clones share the same script and counters.
#[derive(Clone, Default)]
pub struct StaticResolver {
    inner: Arc<RwLock<ResolverInner>>,
}

#[derive(Default)]
struct ResolverInner {
    queue: VecDeque<ResolveResponse>,
    last: Option<ResolveResponse>,
    lookups: u64,
}

impl StaticResolver {
    /// Create a resolver that reports every key as missing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the next response to serve.
    pub fn push_response(&self, response: ResolveResponse) {
        self.inner.write().queue.push_back(response);
    }

    /// Number of lookups served so far.
    pub fn lookups(&self) -> u64 {
        self.inner.read().lookups
    }
}

#[async_trait]
impl Resolver for StaticResolver {
    async fn resolve(&self, _key: &str) -> ResolveResponse {
        let mut inner = self.inner.write();
        inner.lookups += 1;
        match inner.queue.pop_front() {
            Some(response) => {
                inner.last = Some(response.clone());
                response
            }
            None => inner.last.clone().unwrap_or_else(ResolveResponse::missing),
        }
    }
}

#[cfg(test)]
mod tests {
    use tamarack_types::ChainLink;
    use tamarack_types::GroupReadItem;
    use tamarack_types::ReadPriority;
    use tamarack_types::ResolvedValue;
    use tamarack_types::ValueChain;

    use super::*;

    fn request(blob: BlobId, offset: u32, len: u32) -> GroupReadRequest {
        GroupReadRequest {
            items: vec![GroupReadItem { blob, offset, len }],
            priority: ReadPriority::Normal,
            restore_first: false,
        }
    }

    #[tokio::test]
    async fn serves_stored_blob_slices() {
        let cluster = InMemoryCluster::new();
        cluster.put_blob(GroupId(1), BlobId(1), Bytes::from_static(b"hello world"));

        let response = cluster.read_group(GroupId(1), request(BlobId(1), 6, 5)).await;
        assert_eq!(response.status, ReplyStatus::Ok);
        assert_eq!(response.fragments[0].data.as_ref(), b"world");
    }

    #[tokio::test]
    async fn missing_blob_answers_no_data() {
        let cluster = InMemoryCluster::new();
        cluster.put_blob(GroupId(1), BlobId(1), Bytes::from_static(b"x"));
        cluster.remove_blob(GroupId(1), BlobId(1));

        let response = cluster.read_group(GroupId(1), request(BlobId(1), 0, 1)).await;
        assert_eq!(response.status, ReplyStatus::Ok);
        assert_eq!(response.fragments[0].status, ReplyStatus::NoData);
    }

    #[tokio::test]
    async fn read_past_blob_end_is_an_error_fragment() {
        let cluster = InMemoryCluster::new();
        cluster.put_blob(GroupId(1), BlobId(1), Bytes::from_static(b"abc"));

        let response = cluster.read_group(GroupId(1), request(BlobId(1), 2, 5)).await;
        assert_eq!(response.fragments[0].status, ReplyStatus::Error);
    }

    #[tokio::test]
    async fn scripted_failure_answers_group_level_error() {
        let cluster = InMemoryCluster::new();
        cluster.put_blob(GroupId(1), BlobId(1), Bytes::from_static(b"x"));
        cluster.fail_group(GroupId(1), ReplyStatus::Unavailable, "maintenance");

        let response = cluster.read_group(GroupId(1), request(BlobId(1), 0, 1)).await;
        assert_eq!(response.status, ReplyStatus::Unavailable);
        assert_eq!(response.error.as_deref(), Some("maintenance"));

        cluster.heal_group(GroupId(1));
        let response = cluster.read_group(GroupId(1), request(BlobId(1), 0, 1)).await;
        assert_eq!(response.status, ReplyStatus::Ok);
    }

    #[tokio::test]
    async fn requests_are_recorded_in_order() {
        let cluster = InMemoryCluster::new();
        cluster.put_blob(GroupId(2), BlobId(9), Bytes::from_static(b"abcd"));

        cluster.read_group(GroupId(2), request(BlobId(9), 0, 2)).await;
        cluster.read_group(GroupId(2), request(BlobId(9), 2, 2)).await;

        let requests = cluster.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].1.items[0].offset, 0);
        assert_eq!(requests[1].1.items[0].offset, 2);
    }

    #[tokio::test]
    async fn resolver_serves_queue_then_repeats_last() {
        let resolver = StaticResolver::new();
        let chain = ValueChain::new(vec![ChainLink::whole(GroupId(1), BlobId(1), 4)]);
        resolver.push_response(ResolveResponse::found(ResolvedValue::new(chain.clone(), true)));

        let first = resolver.resolve("k").await;
        assert_eq!(first.values.len(), 1);

        let repeated = resolver.resolve("k").await;
        assert_eq!(repeated, first);
        assert_eq!(resolver.lookups(), 2);
    }

    #[tokio::test]
    async fn empty_resolver_reports_missing() {
        let resolver = StaticResolver::new();
        let response = resolver.resolve("k").await;
        assert_eq!(response.status, ReplyStatus::Ok);
        assert!(response.values.is_empty());
    }
}
