//! Repair decisions for reads that hit missing data.
//!
//! When a fragment comes back no-data, the orchestrator looks the key up
//! again and compares the authoritative answer against the chain the read
//! was using. The comparison distinguishes three very different worlds:
//! the chain was stale (retry with the fresh one), the value never made
//! it to durable storage (legitimate absence), or durably written bytes
//! are gone (data loss).

use tamarack_types::BlobId;
use tamarack_types::ReplyStatus;
use tamarack_types::ResolveResponse;
use tamarack_types::ValueChain;
use tracing::error;

/// Outcome of evaluating a resolve lookup against the chain a read used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepairVerdict {
    /// The chain was stale; re-run the read with this one.
    Restart(ValueChain),
    /// The value is legitimately absent; the caller sees "no data".
    Absent,
    /// The value was reliably written but its bytes are unreachable.
    DataLoss,
    /// The lookup itself failed.
    Failed {
        /// Status the resolver reported.
        status: ReplyStatus,
        /// Error message accompanying the status.
        message: String,
    },
}

/// Decide what a no-data fault means, given the resolver's answer.
///
/// `missing_blob` is the blob whose read faulted; it only feeds the data
/// loss log line. A resolver answering with more than one mapping for a
/// single key violates the metadata contract and is treated as absence.
pub fn evaluate_resolution(
    key: &str,
    current: &ValueChain,
    missing_blob: BlobId,
    response: ResolveResponse,
) -> RepairVerdict {
    if !response.status.is_ok() {
        return RepairVerdict::Failed {
            status: response.status,
            message: response.error.unwrap_or_default(),
        };
    }

    let mut values = response.values;
    match values.len() {
        0 => RepairVerdict::Absent,
        1 => {
            let value = values.remove(0);
            if value.supersedes(current) {
                RepairVerdict::Restart(value.chain)
            } else if !value.reliably_written {
                // The write that produced this chain never committed, so
                // the missing bytes were never promised to anyone.
                RepairVerdict::Absent
            } else {
                error!(
                    key = %key,
                    blob = %missing_blob,
                    "value chain resolves but its data is unreachable"
                );
                RepairVerdict::DataLoss
            }
        }
        mappings => {
            error!(
                key = %key,
                mappings,
                "resolver returned multiple mappings for a single key"
            );
            RepairVerdict::Absent
        }
    }
}
