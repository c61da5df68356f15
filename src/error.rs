//! Unified error handling for the motion engine.
//!
//! No error here is fatal. Each one is either absorbed silently (the caller
//! was never entitled to the command) or turned into a single channel notice,
//! and the operation is otherwise a no-op.

use thiserror::Error;

// ============================================================================
// Engine Errors (meeting/motion operations)
// ============================================================================

/// Which piece of state an operation needed but didn't find.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// A meeting must be running.
    Meeting,
    /// A motion must be running.
    Motion,
    /// `stop motion` with nothing to stop.
    MotionToStop,
}

/// Whether a failed lookup was adding to or removing from the roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterChange {
    Add,
    Remove,
}

/// Errors returned by engine operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MotionError {
    /// The actor lacks the required privilege. Never announced.
    #[error("permission denied")]
    PermissionDenied,

    #[error("not started: {0:?}")]
    NotStarted(Requirement),

    /// A numeric argument didn't parse as a non-negative integer.
    #[error("invalid {field}: {value:?}")]
    InvalidArgument { field: &'static str, value: String },

    /// The nick's fingerprint could not be resolved; roster untouched.
    #[error("lookup failed for {nick}")]
    LookupFailed { nick: String, change: RosterChange },

    /// Not a channel target, or a channel we aren't tracking. Never announced.
    #[error("unknown channel: {0}")]
    UnknownChannel(String),
}

impl MotionError {
    pub fn invalid(field: &'static str, value: &str) -> Self {
        Self::InvalidArgument {
            field,
            value: value.to_string(),
        }
    }

    /// Get a static error code string for log labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::PermissionDenied => "permission_denied",
            Self::NotStarted(_) => "not_started",
            Self::InvalidArgument { .. } => "invalid_argument",
            Self::LookupFailed { .. } => "lookup_failed",
            Self::UnknownChannel(_) => "unknown_channel",
        }
    }

    /// The channel notice announcing this failure.
    ///
    /// Returns `None` for errors that fail silently.
    pub fn notice(&self) -> Option<String> {
        let text = match self {
            Self::PermissionDenied | Self::UnknownChannel(_) => return None,
            Self::NotStarted(Requirement::Meeting) => "*** No meeting started.".to_string(),
            Self::NotStarted(Requirement::Motion) => "*** No motion started.".to_string(),
            Self::NotStarted(Requirement::MotionToStop) => {
                "*** There is no motion to stop.".to_string()
            }
            Self::InvalidArgument { field, .. } => {
                format!("*** {field} must be a non-negative integer")
            }
            Self::LookupFailed {
                change: RosterChange::Add,
                ..
            } => "*** Could not add user to recognised list.".to_string(),
            Self::LookupFailed {
                change: RosterChange::Remove,
                ..
            } => "*** Could not remove user from recognised list.".to_string(),
        };
        Some(text)
    }
}

/// Result type for engine operations.
pub type MotionResult<T = ()> = Result<T, MotionError>;
