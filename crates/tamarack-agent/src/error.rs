//! Error types for the read orchestrator.
//!
//! Uses snafu for structured error handling with context. Validation
//! errors ([`ChainError`]) are detected before any dispatch; terminal
//! read outcomes ([`ReadError`]) cover everything a caller can observe.

use snafu::Snafu;
use tamarack_types::BlobId;
use tamarack_types::GroupId;
use tamarack_types::ReplyStatus;

/// Result type for read operations.
pub type Result<T, E = ReadError> = std::result::Result<T, E>;

/// Errors detected while decomposing a read against a value chain.
///
/// All variants are produced synchronously, before any group request is
/// dispatched.
#[derive(Debug, Snafu, Clone, PartialEq, Eq)]
#[snafu(visibility(pub))]
pub enum ChainError {
    /// A chain link carries an impossible sub-range.
    #[snafu(display(
        "incorrect subrange [{}, {}) at link {} (blob size {})",
        begin,
        end,
        link,
        blob_size
    ))]
    BadSubrange {
        /// Index of the offending link within the chain.
        link: usize,
        /// Declared start of the sub-range.
        begin: u32,
        /// Declared end of the sub-range.
        end: u32,
        /// Declared total size of the link's blob.
        blob_size: u32,
    },

    /// The chain has more links than the orchestrator accepts.
    #[snafu(display("value chain too long: {} links (max {})", links, max))]
    ChainTooLong {
        /// Number of links in the rejected chain.
        links: usize,
        /// Maximum number of links accepted.
        max: usize,
    },

    /// The requested window asks for bytes the chain cannot provide.
    #[snafu(display(
        "incorrect offset/size provided: window at offset {} with len {} exceeds the value chain",
        offset,
        len
    ))]
    WindowOutOfBounds {
        /// Requested byte offset into the value.
        offset: u64,
        /// Requested byte length.
        len: u64,
    },
}

/// Terminal outcomes of a read request.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ReadError {
    /// The request failed validation before dispatch.
    #[snafu(display("{source}"))]
    Chain {
        /// The validation failure.
        source: ChainError,
    },

    /// A group answered the whole batch with a non-ok status.
    #[snafu(display("group {} read failed with status {}: {}", group, status, message))]
    Group {
        /// The group that failed.
        group: GroupId,
        /// Status the group reported.
        status: ReplyStatus,
        /// Error message accompanying the status.
        message: String,
    },

    /// A single fragment failed with an error status.
    #[snafu(display("failed to read blob {}: status {}", blob, status))]
    Fragment {
        /// The blob whose read failed.
        blob: BlobId,
        /// Status the backend reported for this fragment.
        status: ReplyStatus,
    },

    /// A group answered with the wrong number of fragments.
    #[snafu(display("group {} answered {} fragments (expected {})", group, got, expected))]
    ResponseMismatch {
        /// The misbehaving group.
        group: GroupId,
        /// Number of fragments dispatched to the group.
        expected: usize,
        /// Number of fragments the group returned.
        got: usize,
    },

    /// A dispatched group request ended without an answer.
    #[snafu(display("group {} read ended without an answer", group))]
    Unanswered {
        /// The group whose task died before responding.
        group: GroupId,
    },

    /// A fragment carried a payload of the wrong length.
    #[snafu(display("blob {} returned {} bytes (expected {})", blob, got, expected))]
    LengthMismatch {
        /// The blob whose payload is mis-sized.
        blob: BlobId,
        /// Byte length requested for this fragment.
        expected: u32,
        /// Byte length the backend returned.
        got: usize,
    },

    /// The metadata lookup issued during repair failed.
    #[snafu(display("key resolution failed with status {}: {}", status, message))]
    Resolve {
        /// Status the resolver reported.
        status: ReplyStatus,
        /// Error message accompanying the status.
        message: String,
    },

    /// A reliably written value is unreachable.
    #[snafu(display(
        "data loss: blob {} is unreachable but its value was reliably written",
        blob
    ))]
    DataLoss {
        /// The blob whose bytes are gone.
        blob: BlobId,
    },

    /// The configured whole-read deadline elapsed.
    #[snafu(display("read deadline of {} ms elapsed", timeout_ms))]
    Timeout {
        /// The configured deadline in milliseconds.
        timeout_ms: u64,
    },
}

impl From<ChainError> for ReadError {
    fn from(source: ChainError) -> Self {
        ReadError::Chain { source }
    }
}

impl ReadError {
    /// True when the outcome is the unrecoverable data-loss case, as
    /// opposed to an ordinary backend or validation failure.
    pub fn is_data_loss(&self) -> bool {
        matches!(self, ReadError::DataLoss { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_error_display() {
        let err = ChainError::BadSubrange {
            link: 2,
            begin: 40,
            end: 30,
            blob_size: 100,
        };
        assert!(err.to_string().contains("incorrect subrange"));
        assert!(err.to_string().contains("link 2"));

        let err = ChainError::WindowOutOfBounds { offset: 200, len: 10 };
        assert!(err.to_string().contains("incorrect offset/size provided"));
    }

    #[test]
    fn test_read_error_display() {
        let err = ReadError::Group {
            group: GroupId(7),
            status: ReplyStatus::Unavailable,
            message: "group offline".to_string(),
        };
        assert!(err.to_string().contains("group 7"));
        assert!(err.to_string().contains("unavailable"));
        assert!(err.to_string().contains("group offline"));

        let err = ReadError::LengthMismatch {
            blob: BlobId(0x1234),
            expected: 64,
            got: 12,
        };
        assert!(err.to_string().contains("12 bytes"));
        assert!(err.to_string().contains("expected 64"));

        let err = ReadError::Unanswered { group: GroupId(3) };
        assert!(err.to_string().contains("group 3"));
        assert!(err.to_string().contains("without an answer"));
    }

    #[test]
    fn test_data_loss_is_distinguishable() {
        let loss = ReadError::DataLoss { blob: BlobId(9) };
        assert!(loss.is_data_loss());
        assert!(loss.to_string().contains("data loss"));

        let plain = ReadError::Fragment {
            blob: BlobId(9),
            status: ReplyStatus::Error,
        };
        assert!(!plain.is_data_loss());
    }

    #[test]
    fn test_chain_error_converts_to_read_error() {
        fn fails() -> Result<()> {
            Err(ChainError::ChainTooLong { links: 9000, max: 4096 })?;
            Ok(())
        }
        let err = fails().unwrap_err();
        assert!(err.to_string().contains("value chain too long"));
    }
}
