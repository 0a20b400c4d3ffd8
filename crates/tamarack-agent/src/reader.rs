//! The chain reader: scatter-gather orchestration of one read request.
//!
//! # Architecture
//!
//! ```text
//! ReadRequest (key, window, value chain)
//!        |
//!        v
//! decompose()          validates the chain, plans physical sub-reads
//!        |
//!        v
//! one task per group   GroupClient::read_group
//!        |
//!        v  attempt completion channel
//! ReadState            reassembles fragments into the output buffer
//!        |
//!        +--> no-data fragment: Resolver::resolve + repair verdict
//!        |        |
//!        |        +--> stale chain: restart with the fresh chain
//!        |        +--> absent / data loss / lookup failure: terminal
//!        v
//! Result<Option<Bytes>, ReadError>
//! ```
//!
//! Each attempt owns a fresh [`ReadState`] and completion channel. The
//! channel receiver doubles as the attempt's liveness: once the driving
//! task drops it, in-flight group tasks find the channel closed and their
//! responses are discarded, so a restarted read can never be corrupted by
//! leftovers of an abandoned attempt.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use parking_lot::Mutex;
use tamarack_types::BlobId;
use tamarack_types::GroupId;
use tamarack_types::GroupReadItem;
use tamarack_types::GroupReadRequest;
use tamarack_types::ReadRequest;
use tamarack_types::ValueChain;
use tokio::sync::mpsc;
use tracing::debug;
use tracing::instrument;
use tracing::warn;

use crate::constants::DEFAULT_READ_TIMEOUT;
use crate::decompose::decompose;
use crate::error::ReadError;
use crate::repair::RepairVerdict;
use crate::repair::evaluate_resolution;
use crate::state::GroupBatch;
use crate::state::GroupCompletion;
use crate::state::Progress;
use crate::state::ReadState;
use crate::traits::GroupClient;
use crate::traits::Resolver;

/// Configuration for a [`ChainReader`].
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Deadline for a whole read, including repair restarts. `None`
    /// disables the deadline.
    pub read_timeout: Option<Duration>,
    /// Group currently being decommissioned, if any. Reads against it
    /// never ask for restore-before-read, which cannot succeed while the
    /// group's data is being moved away.
    pub decommissioning_group: Option<GroupId>,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            read_timeout: Some(DEFAULT_READ_TIMEOUT),
            decommissioning_group: None,
        }
    }
}

impl ReaderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or disable the whole-read deadline.
    pub fn with_read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Mark a group as being decommissioned.
    pub fn with_decommissioning_group(mut self, group: GroupId) -> Self {
        self.decommissioning_group = Some(group);
        self
    }
}

/// Statistics about read operations.
#[derive(Debug, Clone, Default)]
pub struct ReadStats {
    /// Reads accepted.
    pub started: u64,
    /// Reads that finished with bytes.
    pub succeeded: u64,
    /// Reads that finished with a legitimate absence.
    pub no_data: u64,
    /// Reads that finished with an error.
    pub failed: u64,
    /// No-data faults that triggered a resolve lookup.
    pub repairs: u64,
    /// Attempts restarted with a superseding chain.
    pub restarts: u64,
    /// Group responses that arrived after their attempt terminated.
    pub late_responses: u64,
}

/// Terminal state of one dispatched attempt.
enum Attempt {
    /// The attempt produced the assembled bytes.
    Done(Bytes),
    /// A fragment faulted with no-data; repair decides what happens.
    Fault { blob: BlobId },
}

/// Scatter-gather reader over chained blob values.
///
/// Cheap to share behind an `Arc`; every [`read`](Self::read) call drives
/// its own attempt state and the reader itself only carries configuration
/// and counters.
pub struct ChainReader {
    groups: Arc<dyn GroupClient>,
    resolver: Arc<dyn Resolver>,
    config: ReaderConfig,
    stats: Arc<Mutex<ReadStats>>,
}

impl ChainReader {
    pub fn new(groups: Arc<dyn GroupClient>, resolver: Arc<dyn Resolver>) -> Self {
        Self {
            groups,
            resolver,
            config: ReaderConfig::default(),
            stats: Arc::new(Mutex::new(ReadStats::default())),
        }
    }

    /// Replace the default configuration.
    pub fn with_config(mut self, config: ReaderConfig) -> Self {
        self.config = config;
        self
    }

    /// Snapshot of the reader's counters.
    pub fn stats(&self) -> ReadStats {
        self.stats.lock().clone()
    }

    /// Execute one read request to its terminal outcome.
    ///
    /// Resolves exactly once: `Ok(Some(bytes))` on success (a zero-length
    /// window yields an empty buffer), `Ok(None)` when the value is
    /// legitimately absent, `Err` for every terminal failure.
    #[instrument(skip(self, request), fields(tag = request.tag, key = %request.key, offset = request.offset, len = request.len))]
    pub async fn read(&self, request: ReadRequest) -> Result<Option<Bytes>, ReadError> {
        self.stats.lock().started += 1;

        let outcome = match self.config.read_timeout {
            Some(deadline) => match tokio::time::timeout(deadline, self.drive(&request)).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    let timeout_ms = deadline.as_millis() as u64;
                    warn!(timeout_ms, "read deadline elapsed");
                    Err(ReadError::Timeout { timeout_ms })
                }
            },
            None => self.drive(&request).await,
        };

        let mut stats = self.stats.lock();
        match &outcome {
            Ok(Some(_)) => stats.succeeded += 1,
            Ok(None) => stats.no_data += 1,
            Err(_) => stats.failed += 1,
        }
        outcome
    }

    /// Run attempts until one reaches a terminal outcome, restarting with
    /// a fresh chain whenever repair finds the one in hand was stale.
    async fn drive(&self, request: &ReadRequest) -> Result<Option<Bytes>, ReadError> {
        let mut chain = request.chain.clone();
        loop {
            match self.run_attempt(request, &chain).await? {
                Attempt::Done(bytes) => return Ok(Some(bytes)),
                Attempt::Fault { blob } => {
                    self.stats.lock().repairs += 1;
                    debug!(blob = %blob, "fragment without data, resolving key");
                    let response = self.resolver.resolve(&request.key).await;
                    match evaluate_resolution(&request.key, &chain, blob, response) {
                        RepairVerdict::Restart(fresh) => {
                            self.stats.lock().restarts += 1;
                            debug!("value chain superseded, restarting read");
                            chain = fresh;
                        }
                        RepairVerdict::Absent => return Ok(None),
                        RepairVerdict::DataLoss => return Err(ReadError::DataLoss { blob }),
                        RepairVerdict::Failed { status, message } => {
                            return Err(ReadError::Resolve { status, message });
                        }
                    }
                }
            }
        }
    }

    /// Dispatch one attempt over `chain` and drain its completions.
    async fn run_attempt(&self, request: &ReadRequest, chain: &ValueChain) -> Result<Attempt, ReadError> {
        let plan = decompose(chain, request.offset, request.len).map_err(|source| {
            warn!(error = %source, "rejecting read request");
            ReadError::Chain { source }
        })?;
        if plan.is_empty() {
            debug!("window resolves to zero bytes, completing immediately");
            return Ok(Attempt::Done(Bytes::new()));
        }

        let output_len = plan.output_len;
        let batches = plan.into_batches();
        let mut state = ReadState::new(output_len, batches.len());
        let mut outstanding: BTreeSet<GroupId> = batches.keys().copied().collect();

        // Sized so every group task can deliver without waiting. Dropping
        // the receiver is what terminates the attempt.
        let (completion_tx, mut completions) = mpsc::channel::<GroupCompletion>(batches.len());

        for (group, items) in batches {
            // Restoring into a group that is being emptied out cannot
            // succeed, so the flag is dropped for that group.
            let restore_first =
                request.restore_first && self.config.decommissioning_group != Some(group);
            let batch = GroupBatch::new(group, items);
            let group_request = GroupReadRequest {
                items: batch
                    .items
                    .iter()
                    .map(|item| GroupReadItem {
                        blob: item.blob,
                        offset: item.offset,
                        len: item.len,
                    })
                    .collect(),
                priority: request.priority,
                restore_first,
            };
            debug!(group = %group, items = batch.items.len(), "dispatching group read");

            let client = Arc::clone(&self.groups);
            let stats = Arc::clone(&self.stats);
            let completion_tx = completion_tx.clone();
            let tag = request.tag;
            tokio::spawn(async move {
                let response = client.read_group(group, group_request).await;
                let completion = GroupCompletion { batch, response };
                if completion_tx.send(completion).await.is_err() {
                    debug!(tag, group = %group, "discarding late group response");
                    stats.lock().late_responses += 1;
                }
            });
        }
        drop(completion_tx);

        while let Some(completion) = completions.recv().await {
            let group = completion.batch.group;
            outstanding.remove(&group);
            match state.on_group_response(completion)? {
                Progress::Pending => {
                    debug!(group = %group, pending = state.pending_groups(), "group read complete");
                }
                Progress::Complete => return Ok(Attempt::Done(state.into_bytes())),
                Progress::Fault { blob } => return Ok(Attempt::Fault { blob }),
            }
        }

        // The channel only drains with groups still outstanding when a
        // group task died without sending its completion.
        match outstanding.pop_first() {
            Some(group) => {
                warn!(group = %group, "group read ended without an answer");
                Err(ReadError::Unanswered { group })
            }
            None => unreachable!("attempt completion is decided before the channel drains"),
        }
    }
}
