//! The caller-facing logical read request.

use serde::Deserialize;
use serde::Serialize;

use crate::chain::ValueChain;
use crate::status::ReadPriority;

/// A logical read over a value chain.
///
/// Immutable once accepted by the orchestrator, which owns it for the
/// lifetime of the read including any repair restarts. The window is
/// expressed in logical chain bytes: `offset` skips into the concatenated
/// chain, `len` bounds the read, and `len == 0` means "to the end of the
/// chain".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadRequest {
    /// Opaque correlation tag echoed on every log line for this read.
    pub tag: u64,
    /// The key whose bytes are being read; used by the repair protocol to
    /// re-resolve the authoritative chain.
    pub key: String,
    /// Byte offset into the logical value.
    pub offset: u64,
    /// Byte length to read; 0 reads to the end of the chain.
    pub len: u64,
    /// Where the key's bytes live, as known to the caller. May be stale;
    /// the orchestrator repairs stale chains transparently.
    pub chain: ValueChain,
    /// Priority class forwarded to every group backend touched.
    pub priority: ReadPriority,
    /// Ask groups to restore degraded blobs before reading. Cleared at
    /// dispatch for a group under decommission, where restoration would be
    /// guaranteed to fail.
    pub restore_first: bool,
}

impl ReadRequest {
    /// Read the whole value of `key` as described by `chain`.
    pub fn new(key: impl Into<String>, chain: ValueChain) -> Self {
        Self {
            tag: 0,
            key: key.into(),
            offset: 0,
            len: 0,
            chain,
            priority: ReadPriority::default(),
            restore_first: false,
        }
    }

    /// Set the correlation tag.
    pub fn with_tag(mut self, tag: u64) -> Self {
        self.tag = tag;
        self
    }

    /// Restrict the read to `len` bytes starting at `offset`; `len == 0`
    /// reads from `offset` to the end of the chain.
    pub fn with_window(mut self, offset: u64, len: u64) -> Self {
        self.offset = offset;
        self.len = len;
        self
    }

    /// Set the priority class.
    pub fn with_priority(mut self, priority: ReadPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Request restore-before-read consistency from the groups.
    pub fn with_restore_first(mut self) -> Self {
        self.restore_first = true;
        self
    }
}
