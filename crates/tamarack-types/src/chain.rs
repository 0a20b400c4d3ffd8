//! The value chain: where a logical key's bytes physically live.
//!
//! A value chain is an ordered sequence of [`ChainLink`]s. Concatenating
//! each link's sub-range `[begin, end)` of its blob, in order, yields the
//! key's logical byte string. Chains are immutable descriptions; when the
//! metadata layer rewrites a key's placement it publishes a *different*
//! chain, and equality between chains is the staleness test used by the
//! repair protocol (see [`ResolvedValue::supersedes`]).

use serde::Deserialize;
use serde::Serialize;

use crate::id::BlobId;
use crate::id::GroupId;

/// One fragment of a value chain.
///
/// Addresses the half-open sub-range `[begin, end)` of a physical blob
/// stored in one group. A well-formed link satisfies
/// `begin < end <= blob_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainLink {
    /// Group holding the blob.
    pub group: GroupId,
    /// Physical blob within the group.
    pub blob: BlobId,
    /// First byte of the sub-range within the blob (inclusive).
    pub begin: u32,
    /// End of the sub-range within the blob (exclusive).
    pub end: u32,
    /// Total declared size of the blob in bytes.
    pub blob_size: u32,
}

impl ChainLink {
    /// Create a link covering `[begin, end)` of the given blob.
    pub fn new(group: GroupId, blob: BlobId, begin: u32, end: u32, blob_size: u32) -> Self {
        Self {
            group,
            blob,
            begin,
            end,
            blob_size,
        }
    }

    /// Create a link covering a whole blob of `blob_size` bytes.
    pub fn whole(group: GroupId, blob: BlobId, blob_size: u32) -> Self {
        Self::new(group, blob, 0, blob_size, blob_size)
    }

    /// Number of logical bytes this link contributes to the chain.
    pub fn logical_len(&self) -> u64 {
        u64::from(self.end.saturating_sub(self.begin))
    }

    /// True when the sub-range is non-empty and inside the declared blob.
    pub fn is_well_formed(&self) -> bool {
        self.begin < self.end && self.end <= self.blob_size
    }
}

/// Ordered description of where a key's bytes currently reside.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueChain {
    /// Links in logical byte order.
    pub links: Vec<ChainLink>,
}

impl ValueChain {
    /// Create a chain from links in logical byte order.
    pub fn new(links: Vec<ChainLink>) -> Self {
        Self { links }
    }

    /// A chain describing a value with no bytes.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of links.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// True when the chain has no links.
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Total logical byte length described by the chain.
    pub fn total_len(&self) -> u64 {
        self.links.iter().map(ChainLink::logical_len).sum()
    }
}

/// One mapping returned by the metadata resolver for a key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedValue {
    /// The authoritative value chain for the key.
    pub chain: ValueChain,
    /// Whether the mapping was durably committed. A mapping that is not
    /// reliably written makes a no-data read a legitimate absence rather
    /// than data loss.
    pub reliably_written: bool,
}

impl ResolvedValue {
    /// Create a resolved mapping.
    pub fn new(chain: ValueChain, reliably_written: bool) -> Self {
        Self {
            chain,
            reliably_written,
        }
    }

    /// True when this mapping invalidates `current`: the chains differ, so
    /// a read planned over `current` was working from stale metadata and
    /// must be restarted over `self.chain`.
    pub fn supersedes(&self, current: &ValueChain) -> bool {
        self.chain != *current
    }
}
