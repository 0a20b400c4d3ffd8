//! Scatter-gather read orchestration over chained blob values.
//!
//! A key's bytes can live scattered across several storage groups, each
//! holding a sub-range of one physical blob. The chain reader takes a
//! logical read (key, byte window, value chain), splits it into physical
//! sub-reads, fans those out concurrently, and reassembles one contiguous
//! buffer. When a blob turns out to no longer hold the expected bytes, a
//! repair pass re-resolves the key and distinguishes stale metadata
//! (restart with the fresh chain) from legitimate absence and from real
//! data loss. Key properties:
//!
//! - **Validated decomposition**: malformed chains and impossible windows
//!   are rejected before anything is dispatched
//! - **One request per group**: sub-reads are batched by storage group and
//!   issued concurrently
//! - **Exactly-once outcome**: every read resolves once, for all
//!   interleavings of group responses and repair restarts
//! - **Zero-copy single-fragment reads**: a sole fragment's payload is
//!   adopted as the output buffer instead of being copied
//!
//! ## Architecture
//!
//! ```text
//! ReadRequest (key, window, value chain)
//!        |
//!        v
//! decompose() --> ReadPlan --> one GroupBatch per storage group
//!        |                           |
//!        |                           v
//!        |                  GroupClient::read_group (concurrent)
//!        |                           |
//!        v                           v
//!   ReadState  <---- attempt completion channel
//!        |
//!        +--> no-data: Resolver::resolve + RepairVerdict
//!        |
//!        v
//! Result<Option<Bytes>, ReadError>
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use tamarack_agent::{ChainReader, InMemoryCluster, StaticResolver};
//! use tamarack_types::{ChainLink, GroupId, BlobId, ReadRequest, ValueChain};
//!
//! let cluster = Arc::new(InMemoryCluster::new());
//! cluster.put_blob(GroupId(1), BlobId(1), &b"hello world"[..]);
//!
//! let reader = ChainReader::new(cluster, Arc::new(StaticResolver::new()));
//! let chain = ValueChain::new(vec![ChainLink::whole(GroupId(1), BlobId(1), 11)]);
//! let request = ReadRequest::new("greeting", chain).with_window(6, 5);
//!
//! let bytes = reader.read(request).await?;
//! assert_eq!(bytes.as_deref(), Some(&b"world"[..]));
//! ```

pub mod constants;
pub mod decompose;
pub mod error;
pub mod memory;
pub mod reader;
pub mod repair;
pub mod state;
pub mod traits;

pub use constants::DEFAULT_READ_TIMEOUT;
pub use constants::MAX_CHAIN_LINKS;
pub use decompose::ReadItem;
pub use decompose::ReadPlan;
pub use decompose::decompose;
pub use error::ChainError;
pub use error::ReadError;
pub use error::Result;
// In-memory collaborators for tests and examples
pub use memory::InMemoryCluster;
pub use memory::StaticResolver;
pub use reader::ChainReader;
pub use reader::ReadStats;
pub use reader::ReaderConfig;
pub use repair::RepairVerdict;
pub use repair::evaluate_resolution;
pub use state::GroupBatch;
pub use state::GroupCompletion;
pub use state::Progress;
pub use state::ReadState;
pub use traits::GroupClient;
pub use traits::Resolver;
