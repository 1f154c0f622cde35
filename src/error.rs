//! Core error types for taskpad.
//!
//! This module defines the error hierarchy using thiserror. Failure kinds are
//! explicit so callers can tell "nothing there" apart from "storage failed"
//! while the non-fatal propagation policy is preserved: no operation in this
//! crate panics across its public boundary.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Core error type for taskpad.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Operation targeted a task id that does not exist
    #[error("No task with id '{id}'")]
    NotFound { id: String },

    /// Scheduling-related errors
    #[error("Scheduling error: {0}")]
    Schedule(#[from] ScheduleError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Record-store-specific errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open the underlying store
    #[error("Failed to open record store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Read of a key failed
    #[error("Read of '{key}' failed: {message}")]
    ReadFailed { key: String, message: String },

    /// Write of a key failed
    #[error("Write of '{key}' failed: {message}")]
    WriteFailed { key: String, message: String },

    /// A stored blob could not be decoded
    #[error("Stored value under '{key}' is corrupt: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Data directory could not be determined or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Reminder-scheduling errors.
///
/// `PastTrigger` and `NothingToSchedule` are refusals rather than faults; the
/// facade treats them as "no notification scheduled" without surfacing a
/// failure. `PermissionDenied` and `Backend` are reportable faults.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// Notification permission was denied for this session
    #[error("Notification permission denied")]
    PermissionDenied,

    /// Trigger instant is at or before now
    #[error("Trigger {trigger} is not in the future")]
    PastTrigger { trigger: DateTime<Utc> },

    /// No reminder time and no fallback delay
    #[error("No reminder time and no fallback delay; nothing to schedule")]
    NothingToSchedule,

    /// Daily reminder time string could not be parsed
    #[error("Invalid daily reminder time '{0}': expected HH:MM")]
    InvalidDailyTime(String),

    /// The platform notification call failed
    #[error("Notification backend error: {0}")]
    Backend(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
