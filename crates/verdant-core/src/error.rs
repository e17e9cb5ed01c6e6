use std::fmt;

use crate::model::{EventType, Timestamp, UnknownEventType};

/// Machine-readable error codes for hosts and scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    NoteNotFound,
    DuplicateTimestamp,
    InvalidTimestamp,
    InvalidEventType,
    PhotoNotFound,
    CorruptStateFile,
    StateFileWriteFailed,
    LockContention,
    InconsistentTimeline,
    DuplicateEvent,
    DuplicatePhotoKey,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1002",
            Self::NoteNotFound => "E2001",
            Self::DuplicateTimestamp => "E2002",
            Self::InvalidTimestamp => "E2003",
            Self::InvalidEventType => "E2004",
            Self::PhotoNotFound => "E2005",
            Self::DuplicateEvent => "E2006",
            Self::DuplicatePhotoKey => "E2007",
            Self::CorruptStateFile => "E3001",
            Self::InconsistentTimeline => "E3002",
            Self::StateFileWriteFailed => "E5001",
            Self::LockContention => "E5002",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::NoteNotFound => "Note not found",
            Self::DuplicateTimestamp => "Duplicate timestamp",
            Self::InvalidTimestamp => "Invalid timestamp",
            Self::InvalidEventType => "Invalid event type",
            Self::PhotoNotFound => "Photo not found",
            Self::DuplicateEvent => "Duplicate event",
            Self::DuplicatePhotoKey => "Duplicate photo key",
            Self::CorruptStateFile => "Corrupt state file",
            Self::InconsistentTimeline => "Timeline views out of sync",
            Self::StateFileWriteFailed => "State file write failed",
            Self::LockContention => "Lock contention",
        }
    }

    /// Optional remediation hint.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in .verdant/config.toml and retry."),
            Self::NoteNotFound => Some("Local state may be stale; reload the plant and retry."),
            Self::DuplicateTimestamp => {
                Some("A note already exists at that time; edit it instead.")
            }
            Self::InvalidTimestamp => {
                Some("Use RFC 3339, e.g. 2024-03-01T20:00:00Z.")
            }
            Self::InvalidEventType => Some("Use one of: water, fertilize, prune, repot."),
            Self::PhotoNotFound => None,
            Self::DuplicateEvent => Some("That event is already recorded; nothing to add."),
            Self::DuplicatePhotoKey => Some("Photo keys are unique; delete the old photo first."),
            Self::CorruptStateFile => Some("Restore the state file from the server copy."),
            Self::InconsistentTimeline => Some("Run `vd rebuild` to re-derive all views."),
            Self::StateFileWriteFailed => Some("Check disk space and write permissions."),
            Self::LockContention => Some("Retry after the other `vd` process releases its lock."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors raised by timeline mutators and timestamp parsing.
///
/// All of these are local and synchronous. None is worth retrying; the host
/// either fixes its input or re-syncs with a full snapshot.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimelineError {
    #[error("no note exists at {timestamp}")]
    NotFound { timestamp: Timestamp },

    #[error("a note already exists at {timestamp}")]
    DuplicateTimestamp { timestamp: Timestamp },

    #[error("invalid timestamp '{raw}': {reason}")]
    InvalidTimestamp { raw: String, reason: String },

    #[error(transparent)]
    UnknownEventType(#[from] UnknownEventType),

    #[error("no photo with key '{key}'")]
    PhotoNotFound { key: String },

    /// Raised by hosts that own the event store; the engine itself accepts repeats.
    #[error("{event_type} is already recorded at {timestamp}")]
    DuplicateEvent {
        event_type: EventType,
        timestamp: Timestamp,
    },

    #[error("a photo with key '{key}' already exists")]
    DuplicatePhotoKey { key: String },
}

impl TimelineError {
    /// Machine-readable code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound { .. } => ErrorCode::NoteNotFound,
            Self::DuplicateTimestamp { .. } => ErrorCode::DuplicateTimestamp,
            Self::InvalidTimestamp { .. } => ErrorCode::InvalidTimestamp,
            Self::UnknownEventType(_) => ErrorCode::InvalidEventType,
            Self::PhotoNotFound { .. } => ErrorCode::PhotoNotFound,
            Self::DuplicateEvent { .. } => ErrorCode::DuplicateEvent,
            Self::DuplicatePhotoKey { .. } => ErrorCode::DuplicatePhotoKey,
        }
    }

    /// Whether the host should treat this as drift and re-sync via snapshot.
    #[must_use]
    pub const fn suggests_resync(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::PhotoNotFound { .. })
    }
}
