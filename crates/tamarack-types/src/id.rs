//! Identifiers for storage groups and physical blobs.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// Identifier of an independent storage group (backend shard).
///
/// Groups are addressed individually by the fan-out dispatcher; one
/// concurrent request is issued per distinct group of a decomposed read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupId(pub u32);

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a physical blob within a storage group.
///
/// Opaque to this layer; the pair (group, blob id) is the address the
/// group backend resolves to stored bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlobId(pub u64);

impl fmt::Display for BlobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}
