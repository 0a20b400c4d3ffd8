//! Reply statuses and read priority classes.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// Status carried on group and resolve replies.
///
/// Backends report their outcome in-band through this enum; the
/// orchestrator forwards non-ok statuses to the caller unchanged. `NoData`
/// is special: it is not an error but the trigger for the resolve-repair
/// protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplyStatus {
    /// The operation succeeded.
    Ok,
    /// The addressed blob no longer holds the expected bytes.
    NoData,
    /// The backend failed the operation.
    Error,
    /// The backend gave up on the operation's deadline.
    Deadline,
    /// The backend is temporarily unable to serve the operation.
    Unavailable,
}

impl ReplyStatus {
    /// True for the success status.
    pub fn is_ok(self) -> bool {
        self == ReplyStatus::Ok
    }
}

impl fmt::Display for ReplyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReplyStatus::Ok => "ok",
            ReplyStatus::NoData => "no data",
            ReplyStatus::Error => "error",
            ReplyStatus::Deadline => "deadline",
            ReplyStatus::Unavailable => "unavailable",
        };
        write!(f, "{}", name)
    }
}

/// Priority class a read carries to the group backend.
///
/// Opaque to the orchestrator; groups may use it to schedule disk and
/// network work. Carried unchanged on every physical sub-read of a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadPriority {
    /// Latency-sensitive foreground read.
    Urgent,
    /// Ordinary read.
    #[default]
    Normal,
    /// Bulk or maintenance read; may be starved by higher classes.
    Background,
}
