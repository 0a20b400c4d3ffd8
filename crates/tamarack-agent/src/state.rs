//! Per-attempt read state: the output buffer, the outstanding-group
//! count, and fragment reassembly.
//!
//! A [`ReadState`] is owned by the task driving the read. Group tasks
//! never touch it; their results travel back through the attempt's
//! completion channel and are applied here one at a time, so the buffer
//! needs no locking.

use bytes::Bytes;
use bytes::BytesMut;
use tamarack_types::BlobId;
use tamarack_types::GroupId;
use tamarack_types::GroupReadResponse;
use tamarack_types::ReplyStatus;

use crate::decompose::ReadItem;
use crate::error::ReadError;

/// The sub-reads dispatched to one group, kept so the group's response
/// fragments can be mapped back into the output buffer.
///
/// Read-only after creation; travels to the spawned group task and comes
/// back inside its [`GroupCompletion`].
#[derive(Debug, Clone)]
pub struct GroupBatch {
    /// The group the batch was dispatched to.
    pub group: GroupId,
    /// Items in dispatch order; the response answers them in the same
    /// order.
    pub items: Vec<ReadItem>,
}

impl GroupBatch {
    pub fn new(group: GroupId, items: Vec<ReadItem>) -> Self {
        debug_assert!(!items.is_empty(), "a dispatched batch carries at least one item");
        Self { group, items }
    }
}

/// One group's completed batch, delivered through the attempt channel.
#[derive(Debug)]
pub struct GroupCompletion {
    /// The batch that was dispatched.
    pub batch: GroupBatch,
    /// The group's answer.
    pub response: GroupReadResponse,
}

/// What applying one group response means for the attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// Other groups are still outstanding.
    Pending,
    /// Every dispatched group has answered and the buffer is complete.
    Complete,
    /// A fragment reported no-data; the repair sub-protocol decides what
    /// happens to the request.
    Fault {
        /// The blob that no longer holds the requested bytes.
        blob: BlobId,
    },
}

/// State for one dispatched read attempt.
///
/// Created when decomposition yields at least one byte; abandoned
/// wholesale (buffer included) when the attempt is superseded by a
/// repair restart.
pub struct ReadState {
    output_len: u64,
    buffer: Option<BytesMut>,
    pending_groups: usize,
}

impl ReadState {
    pub fn new(output_len: u64, pending_groups: usize) -> Self {
        debug_assert!(output_len > 0, "zero-length reads never reach dispatch");
        debug_assert!(pending_groups > 0, "dispatch always involves at least one group");
        Self {
            output_len,
            buffer: None,
            pending_groups,
        }
    }

    /// Number of groups that have not answered yet.
    pub fn pending_groups(&self) -> usize {
        self.pending_groups
    }

    /// Apply one group's response to the attempt.
    ///
    /// Fragments are processed in dispatch order. A group-level failure,
    /// a fragment error, or a malformed response terminates the attempt
    /// with an error; a no-data fragment yields [`Progress::Fault`] and
    /// leaves the outcome to repair. Otherwise the fragments are written
    /// into the output buffer and the outstanding count drops by one.
    pub fn on_group_response(&mut self, completion: GroupCompletion) -> Result<Progress, ReadError> {
        let GroupCompletion { batch, response } = completion;

        if !response.status.is_ok() {
            return Err(ReadError::Group {
                group: batch.group,
                status: response.status,
                message: response.error.unwrap_or_default(),
            });
        }
        if response.fragments.len() != batch.items.len() {
            return Err(ReadError::ResponseMismatch {
                group: batch.group,
                expected: batch.items.len(),
                got: response.fragments.len(),
            });
        }

        for (item, fragment) in batch.items.iter().zip(response.fragments) {
            match fragment.status {
                ReplyStatus::Ok => {}
                ReplyStatus::NoData => {
                    return Ok(Progress::Fault { blob: item.blob });
                }
                status => {
                    return Err(ReadError::Fragment { blob: item.blob, status });
                }
            }
            if fragment.data.len() != item.len as usize {
                return Err(ReadError::LengthMismatch {
                    blob: item.blob,
                    expected: item.len,
                    got: fragment.data.len(),
                });
            }
            self.write_fragment(item.output_offset, fragment.data);
        }

        self.pending_groups -= 1;
        if self.pending_groups == 0 {
            Ok(Progress::Complete)
        } else {
            Ok(Progress::Pending)
        }
    }

    /// Consume the completed attempt, yielding the assembled bytes.
    pub fn into_bytes(self) -> Bytes {
        self.buffer.map(BytesMut::freeze).unwrap_or_default()
    }

    fn write_fragment(&mut self, output_offset: u64, data: Bytes) {
        debug_assert!(
            output_offset + data.len() as u64 <= self.output_len,
            "fragment must fit inside the output window"
        );
        let start = output_offset as usize;
        match &mut self.buffer {
            Some(buffer) => {
                buffer[start..start + data.len()].copy_from_slice(&data);
            }
            None if output_offset == 0 => {
                // The first fragment landing at offset 0 becomes the
                // backing storage when it is uniquely owned, skipping one
                // copy for single-fragment reads.
                let mut buffer = data
                    .try_into_mut()
                    .unwrap_or_else(|shared| BytesMut::from(&shared[..]));
                buffer.resize(self.output_len as usize, 0);
                self.buffer = Some(buffer);
            }
            None => {
                let mut buffer = BytesMut::zeroed(self.output_len as usize);
                buffer[start..start + data.len()].copy_from_slice(&data);
                self.buffer = Some(buffer);
            }
        }
    }
}
