//! Task records, partial updates, and derived statistics.
//!
//! Tasks are persisted as a JSON array under a single record-store key, with
//! all timestamps serialized as RFC 3339 strings at full precision. The
//! `notification_id` field is handle bookkeeping owned by the service layer:
//! it is `Some` exactly while a live scheduled notification exists for the
//! task's current reminder time.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Task priority.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum TaskPriority {
    High,
    Medium,
    Low,
}

impl Default for TaskPriority {
    fn default() -> Self {
        TaskPriority::Medium
    }
}

/// Task completion status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum TaskStatus {
    /// Task is open (initial state)
    Pending,
    /// Task is completed
    Completed,
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Pending
    }
}

/// A user-created to-do item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier, immutable after creation
    pub id: String,
    /// Task title, non-empty
    pub title: String,
    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
    /// Priority for list ordering and statistics
    pub priority: TaskPriority,
    /// Completion status
    pub status: TaskStatus,
    /// Creation timestamp, immutable
    pub created_at: DateTime<Utc>,
    /// Refreshed on every mutation
    pub updated_at: DateTime<Utc>,
    /// Advisory due date, not enforced
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    /// When a local reminder should fire
    #[serde(default)]
    pub reminder_time: Option<DateTime<Utc>>,
    /// Handle of the live scheduled notification, if any
    #[serde(default)]
    pub notification_id: Option<String>,
}

impl Task {
    pub fn is_pending(&self) -> bool {
        self.status == TaskStatus::Pending
    }
}

/// Parameters for creating a task.
///
/// Id, status, and timestamps are assigned by the service at creation.
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub priority: TaskPriority,
    pub due_date: Option<DateTime<Utc>>,
    pub reminder_time: Option<DateTime<Utc>>,
}

/// Shallow partial update of a task.
///
/// Each field is replaced wholesale when present. Optional task fields use a
/// double option: the outer `Some` means "touch this field", the inner value
/// is what it becomes (so `Some(None)` clears it).
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub priority: Option<TaskPriority>,
    pub status: Option<TaskStatus>,
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub reminder_time: Option<Option<DateTime<Utc>>>,
}

impl TaskPatch {
    /// Patch that marks a task completed.
    pub fn complete() -> Self {
        Self {
            status: Some(TaskStatus::Completed),
            ..Self::default()
        }
    }

    /// Patch that replaces the reminder time.
    pub fn reminder(at: Option<DateTime<Utc>>) -> Self {
        Self {
            reminder_time: Some(at),
            ..Self::default()
        }
    }

    /// Whether applying this patch requires re-syncing the scheduled
    /// notification (reminder changed or status flipped).
    pub fn touches_scheduling(&self) -> bool {
        self.reminder_time.is_some() || self.status.is_some()
    }

    /// Merge into `task`, refreshing `updated_at`. `id` and `created_at` are
    /// never touched.
    pub fn apply_to(&self, task: &mut Task, now: DateTime<Utc>) {
        if let Some(ref title) = self.title {
            task.title = title.clone();
        }
        if let Some(ref description) = self.description {
            task.description = description.clone();
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        if let Some(reminder_time) = self.reminder_time {
            task.reminder_time = reminder_time;
        }
        task.updated_at = now;
    }
}

/// Derived statistics over the task collection.
///
/// Never stored; computed on demand at a given wall-clock instant, so two
/// calls around a due-date boundary may legitimately disagree.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    /// High-priority and still pending
    pub high_priority: usize,
    /// Pending with a due date within the next 24 hours
    pub due_soon: usize,
}

impl TaskStats {
    /// Fold over a task collection at instant `now`.
    pub fn collect<'a, I>(tasks: I, now: DateTime<Utc>) -> Self
    where
        I: IntoIterator<Item = &'a Task>,
    {
        let horizon = now + Duration::hours(24);
        let mut stats = TaskStats::default();
        for task in tasks {
            stats.total += 1;
            match task.status {
                TaskStatus::Completed => stats.completed += 1,
                TaskStatus::Pending => {
                    stats.pending += 1;
                    if task.priority == TaskPriority::High {
                        stats.high_priority += 1;
                    }
                    if let Some(due) = task.due_date {
                        if due > now && due <= horizon {
                            stats.due_soon += 1;
                        }
                    }
                }
            }
        }
        stats
    }
}
