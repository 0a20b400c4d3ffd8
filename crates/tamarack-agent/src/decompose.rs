//! Read decomposition: turning a byte window over a value chain into
//! physical sub-reads.
//!
//! The walk validates links as it visits them; links past the point where
//! the window is satisfied are never inspected. Nothing is dispatched
//! unless the whole window decomposes cleanly.

use std::collections::BTreeMap;

use tamarack_types::BlobId;
use tamarack_types::GroupId;
use tamarack_types::ValueChain;

use crate::constants::MAX_CHAIN_LINKS;
use crate::error::ChainError;

/// One physical sub-read derived from a chain link, together with where
/// its bytes belong in the output buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadItem {
    /// Group that stores the blob.
    pub group: GroupId,
    /// Blob to read from.
    pub blob: BlobId,
    /// Byte offset within the blob.
    pub offset: u32,
    /// Number of bytes to read.
    pub len: u32,
    /// Offset within the output buffer where these bytes land.
    pub output_offset: u64,
}

/// A validated decomposition of one read window.
///
/// The items' output windows tile `[0, output_len)` exactly, in order,
/// with no gaps or overlaps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadPlan {
    /// Total number of bytes the read will produce.
    pub output_len: u64,
    /// Physical sub-reads in output order.
    pub items: Vec<ReadItem>,
}

impl ReadPlan {
    /// True when the window resolved to zero bytes; such reads succeed
    /// without dispatching anything.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Group the plan's items by their storage group, preserving output
    /// order within each group. The map is ordered so dispatch order is
    /// deterministic.
    pub fn into_batches(self) -> BTreeMap<GroupId, Vec<ReadItem>> {
        let mut batches: BTreeMap<GroupId, Vec<ReadItem>> = BTreeMap::new();
        for item in self.items {
            batches.entry(item.group).or_default().push(item);
        }
        batches
    }
}

/// Decompose the window `[offset, offset + len)` over `chain` into
/// physical sub-reads. A `len` of zero means "to the end of the chain".
///
/// Fails without partial output when a visited link is malformed, the
/// chain exceeds [`MAX_CHAIN_LINKS`], or a bounded window asks for bytes
/// the chain cannot provide.
pub fn decompose(chain: &ValueChain, offset: u64, len: u64) -> Result<ReadPlan, ChainError> {
    if chain.len() > MAX_CHAIN_LINKS {
        return Err(ChainError::ChainTooLong {
            links: chain.len(),
            max: MAX_CHAIN_LINKS,
        });
    }

    let mut skip = offset;
    // 0 means unbounded from here on, mirroring the request encoding.
    let mut remaining = len;
    let mut output_offset: u64 = 0;
    let mut items = Vec::new();

    for (index, link) in chain.links.iter().enumerate() {
        if !link.is_well_formed() {
            return Err(ChainError::BadSubrange {
                link: index,
                begin: link.begin,
                end: link.end,
                blob_size: link.blob_size,
            });
        }

        let link_len = link.logical_len();
        if skip >= link_len {
            skip -= link_len;
            continue;
        }

        let take = match remaining {
            0 => link_len - skip,
            bounded => bounded.min(link_len - skip),
        };

        // skip < link_len <= u32::MAX and take <= link_len - skip, so the
        // casts and the begin + skip sum stay in range.
        items.push(ReadItem {
            group: link.group,
            blob: link.blob,
            offset: link.begin + skip as u32,
            len: take as u32,
            output_offset,
        });
        output_offset += take;
        skip = 0;

        if remaining != 0 {
            remaining -= take;
            if remaining == 0 {
                break;
            }
        }
    }

    if remaining != 0 {
        return Err(ChainError::WindowOutOfBounds { offset, len });
    }

    Ok(ReadPlan {
        output_len: output_offset,
        items,
    })
}

#[cfg(test)]
mod tests {
    use tamarack_types::ChainLink;

    use super::*;

    fn two_link_chain() -> ValueChain {
        ValueChain::new(vec![
            ChainLink::new(GroupId(1), BlobId(0xA), 0, 100, 100),
            ChainLink::new(GroupId(2), BlobId(0xB), 0, 50, 50),
        ])
    }

    #[test]
    fn window_spanning_two_links_clips_both() {
        let plan = decompose(&two_link_chain(), 80, 40).unwrap();
        assert_eq!(plan.output_len, 40);
        assert_eq!(
            plan.items,
            vec![
                ReadItem {
                    group: GroupId(1),
                    blob: BlobId(0xA),
                    offset: 80,
                    len: 20,
                    output_offset: 0,
                },
                ReadItem {
                    group: GroupId(2),
                    blob: BlobId(0xB),
                    offset: 0,
                    len: 20,
                    output_offset: 20,
                },
            ]
        );
    }

    #[test]
    fn window_past_chain_end_is_rejected() {
        let err = decompose(&two_link_chain(), 200, 10).unwrap_err();
        assert_eq!(err, ChainError::WindowOutOfBounds { offset: 200, len: 10 });
    }

    #[test]
    fn zero_len_reads_to_chain_end() {
        let plan = decompose(&two_link_chain(), 30, 0).unwrap();
        assert_eq!(plan.output_len, 120);
        assert_eq!(plan.items.len(), 2);
        assert_eq!(plan.items[0].offset, 30);
        assert_eq!(plan.items[0].len, 70);
        assert_eq!(plan.items[1].len, 50);
        assert_eq!(plan.items[1].output_offset, 70);
    }

    #[test]
    fn offset_skips_whole_links() {
        let plan = decompose(&two_link_chain(), 100, 10).unwrap();
        assert_eq!(plan.items.len(), 1);
        assert_eq!(plan.items[0].blob, BlobId(0xB));
        assert_eq!(plan.items[0].offset, 0);
        assert_eq!(plan.items[0].len, 10);
        assert_eq!(plan.items[0].output_offset, 0);
    }

    #[test]
    fn subrange_begin_is_honored() {
        let chain = ValueChain::new(vec![ChainLink::new(GroupId(3), BlobId(0xC), 40, 90, 128)]);
        let plan = decompose(&chain, 5, 10).unwrap();
        assert_eq!(plan.items[0].offset, 45);
        assert_eq!(plan.items[0].len, 10);
    }

    #[test]
    fn empty_subrange_is_malformed() {
        let chain = ValueChain::new(vec![ChainLink::new(GroupId(1), BlobId(1), 50, 50, 100)]);
        let err = decompose(&chain, 0, 1).unwrap_err();
        assert!(matches!(err, ChainError::BadSubrange { link: 0, .. }));
    }

    #[test]
    fn subrange_past_blob_size_is_malformed() {
        let chain = ValueChain::new(vec![ChainLink::new(GroupId(1), BlobId(1), 0, 101, 100)]);
        let err = decompose(&chain, 0, 1).unwrap_err();
        assert!(matches!(err, ChainError::BadSubrange { link: 0, .. }));
    }

    #[test]
    fn links_past_satisfaction_are_never_inspected() {
        // The second link is malformed, but the window is satisfied by the
        // first link, so the walk stops before seeing it.
        let chain = ValueChain::new(vec![
            ChainLink::new(GroupId(1), BlobId(1), 0, 100, 100),
            ChainLink::new(GroupId(2), BlobId(2), 90, 10, 50),
        ]);
        let plan = decompose(&chain, 0, 100).unwrap();
        assert_eq!(plan.items.len(), 1);

        // A window reaching into the malformed link still fails.
        assert!(decompose(&chain, 0, 101).is_err());
    }

    #[test]
    fn zero_output_window_is_empty_plan() {
        // Unbounded read starting exactly at the chain end.
        let plan = decompose(&two_link_chain(), 150, 0).unwrap();
        assert_eq!(plan.output_len, 0);
        assert!(plan.is_empty());
    }

    #[test]
    fn over_long_chain_is_rejected() {
        let links = vec![ChainLink::new(GroupId(1), BlobId(1), 0, 1, 1); MAX_CHAIN_LINKS + 1];
        let err = decompose(&ValueChain::new(links), 0, 1).unwrap_err();
        assert!(matches!(err, ChainError::ChainTooLong { .. }));
    }

    #[test]
    fn items_tile_the_output_exactly() {
        let chain = ValueChain::new(vec![
            ChainLink::new(GroupId(1), BlobId(1), 10, 20, 32),
            ChainLink::new(GroupId(2), BlobId(2), 0, 7, 7),
            ChainLink::new(GroupId(1), BlobId(3), 3, 100, 100),
        ]);
        let plan = decompose(&chain, 4, 0).unwrap();
        let mut cursor = 0u64;
        for item in &plan.items {
            assert_eq!(item.output_offset, cursor);
            cursor += u64::from(item.len);
        }
        assert_eq!(cursor, plan.output_len);
    }

    #[test]
    fn batches_group_items_preserving_output_order() {
        let chain = ValueChain::new(vec![
            ChainLink::new(GroupId(2), BlobId(1), 0, 10, 10),
            ChainLink::new(GroupId(1), BlobId(2), 0, 10, 10),
            ChainLink::new(GroupId(2), BlobId(3), 0, 10, 10),
        ]);
        let plan = decompose(&chain, 0, 0).unwrap();
        let batches = plan.into_batches();
        assert_eq!(batches.len(), 2);

        let g2 = &batches[&GroupId(2)];
        assert_eq!(g2.len(), 2);
        assert!(g2[0].output_offset < g2[1].output_offset);
        assert_eq!(batches[&GroupId(1)].len(), 1);
    }
}
