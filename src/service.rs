//! Application facade coordinating the repository and the scheduler.
//!
//! Every task mutation that can affect scheduling is a single operation here:
//! durable write first, then cancel the stale notification, then schedule a
//! replacement when warranted, then persist the new handle. Task data
//! durability takes precedence over notification delivery: a scheduling
//! failure never rolls back or blocks the storage write, it is reported in
//! the returned [`NotificationOutcome`] instead. The same holds for failures
//! after the commit (settings lookup, handle persistence): an `Err` from a
//! mutation always means the user-visible durable write itself did not
//! happen, so callers may safely retry on `Err`.
//!
//! The facade is explicitly constructed and injected (no globals), so tests
//! substitute a fault-injecting store and a recording backend.

use chrono::{DateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use crate::error::{CoreError, Result, ScheduleError};
use crate::notify::{NotificationBackend, ReminderScheduler};
use crate::repository::TaskRepository;
use crate::settings::{Settings, SettingsPatch};
use crate::storage::RecordStore;
use crate::task::{NewTask, Task, TaskPatch, TaskStats, TaskStatus};

/// What happened to the task's notification during a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationOutcome {
    /// A notification was scheduled; the handle is stored on the task.
    Scheduled(String),
    /// The previous notification was cancelled and nothing replaced it.
    Cancelled,
    /// The mutation did not touch scheduling state.
    Unchanged,
    /// Scheduling was warranted but failed; the task write still stands.
    Failed(ScheduleError),
    /// The task write committed, but scheduling state could not be brought
    /// in line with it: the settings record was unreadable or the handle
    /// write failed. Any freshly scheduled notification has been cancelled
    /// again so no live alert outlives a missing handle.
    NotSynced(String),
}

/// Combined result of one task mutation: the durable half and the
/// notification half.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationOutcome {
    pub task: Task,
    pub notification: NotificationOutcome,
}

/// Task-management facade.
pub struct TaskService<S: RecordStore, N: NotificationBackend> {
    repo: TaskRepository<S>,
    scheduler: ReminderScheduler<N>,
}

impl<S: RecordStore, N: NotificationBackend> TaskService<S, N> {
    pub fn new(repository: TaskRepository<S>, scheduler: ReminderScheduler<N>) -> Self {
        Self {
            repo: repository,
            scheduler,
        }
    }

    /// Create a task with a fresh id, PENDING status, and now-timestamps,
    /// then schedule its reminder (explicit time, or the settings fallback
    /// delay when none is set).
    ///
    /// # Errors
    /// `Validation` for an empty title; `Storage` when the durable write
    /// fails (in which case nothing was scheduled). Failures after the
    /// append has committed are reported through the notification half of
    /// the outcome, never as `Err`.
    pub fn create_task(&mut self, new: NewTask) -> Result<MutationOutcome> {
        let title = new.title.trim();
        if title.is_empty() {
            return Err(CoreError::Validation(
                "task title must not be empty".to_string(),
            ));
        }
        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            description: new.description,
            priority: new.priority,
            status: TaskStatus::Pending,
            created_at: now,
            updated_at: now,
            due_date: new.due_date,
            reminder_time: new.reminder_time,
            notification_id: None,
        };
        self.repo.add_task(task.clone())?;
        let (settings, settings_err) = self.settings_for_sync();
        let mut outcome = self.resync_notification(
            task,
            settings.notification_delay,
            settings.enable_notifications,
        );
        if let Some(err) = settings_err {
            outcome.notification = NotificationOutcome::NotSynced(err.to_string());
        }
        Ok(outcome)
    }

    /// Shallow-merge `patch` into the task, then re-establish the
    /// notification invariant if the patch touched `reminder_time` or
    /// `status`.
    ///
    /// Edits never fall back to the settings delay: after an update a
    /// notification exists only for a pending task with an explicit future
    /// reminder time.
    pub fn update_task(&mut self, id: &str, patch: TaskPatch) -> Result<MutationOutcome> {
        if let Some(ref title) = patch.title {
            if title.trim().is_empty() {
                return Err(CoreError::Validation(
                    "task title must not be empty".to_string(),
                ));
            }
        }
        let touches_scheduling = patch.touches_scheduling();
        let task = self.repo.update_task(id, &patch)?;
        if !touches_scheduling {
            return Ok(MutationOutcome {
                task,
                notification: NotificationOutcome::Unchanged,
            });
        }
        let (settings, settings_err) = self.settings_for_sync();
        let mut outcome = self.resync_notification(task, 0, settings.enable_notifications);
        if let Some(err) = settings_err {
            outcome.notification = NotificationOutcome::NotSynced(err.to_string());
        }
        Ok(outcome)
    }

    /// Mark the task completed, cancelling its notification.
    pub fn complete_task(&mut self, id: &str) -> Result<MutationOutcome> {
        self.update_task(id, TaskPatch::complete())
    }

    /// Delete the task, releasing its scheduled notification first.
    /// Idempotent: deleting an unknown id is success.
    pub fn delete_task(&mut self, id: &str) -> Result<NotificationOutcome> {
        let existing = self.repo.get_task_by_id(id)?;
        let outcome = match existing.and_then(|t| t.notification_id) {
            Some(handle) => {
                self.scheduler.cancel(&handle);
                NotificationOutcome::Cancelled
            }
            None => NotificationOutcome::Unchanged,
        };
        self.repo.delete_task(id)?;
        Ok(outcome)
    }

    /// Full data reset: cancel every notification and remove the task
    /// collection and settings record. The first-launch marker survives.
    pub fn clear_all(&mut self) -> Result<()> {
        self.scheduler.cancel_all();
        self.repo.clear_all_data()
    }

    /// Schedule the recurring daily notification from the settings record.
    /// Returns `Ok(None)` when no daily time is configured or notifications
    /// are disabled.
    pub fn schedule_daily_reminder(&mut self) -> Result<Option<String>> {
        let settings = self.repo.get_settings()?;
        if !settings.enable_notifications {
            return Ok(None);
        }
        match settings.daily_reminder_time {
            None => Ok(None),
            Some(hhmm) => Ok(Some(self.scheduler.schedule_daily_recurring(&hhmm)?)),
        }
    }

    /// Settings for a post-commit notification sync. When the settings
    /// record is unreadable, scheduling is disabled for this sync and the
    /// error is handed back for the outcome instead of propagating.
    fn settings_for_sync(&self) -> (Settings, Option<CoreError>) {
        match self.repo.get_settings() {
            Ok(settings) => (settings, None),
            Err(err) => {
                warn!(error = %err, "settings unavailable; reminder not scheduled");
                let settings = Settings {
                    enable_notifications: false,
                    ..Settings::default()
                };
                (settings, Some(err))
            }
        }
    }

    /// Cancel the stale handle, schedule a replacement when warranted, and
    /// persist the resulting handle (or its absence) on the task.
    ///
    /// Runs after the user-visible write has committed, so it never fails:
    /// a handle write that cannot be persisted cancels the fresh
    /// notification again and reports `NotSynced`.
    fn resync_notification(
        &mut self,
        mut task: Task,
        fallback_delay_minutes: u32,
        allow_scheduling: bool,
    ) -> MutationOutcome {
        let previous = task.notification_id.take();
        if let Some(ref stale) = previous {
            self.scheduler.cancel(stale);
        }

        let attempt = if allow_scheduling && task.status == TaskStatus::Pending {
            Some(self.scheduler.schedule(&task, fallback_delay_minutes))
        } else {
            None
        };

        let (handle, notification) = match attempt {
            Some(Ok(id)) => (Some(id.clone()), NotificationOutcome::Scheduled(id)),
            Some(Err(ScheduleError::NothingToSchedule)) | None => {
                let outcome = if previous.is_some() {
                    NotificationOutcome::Cancelled
                } else {
                    NotificationOutcome::Unchanged
                };
                (None, outcome)
            }
            Some(Err(err)) => {
                warn!(task = %task.id, error = %err, "reminder not scheduled");
                (None, NotificationOutcome::Failed(err))
            }
        };

        if handle.is_some() || previous.is_some() {
            if let Err(err) = self.repo.set_notification_handle(&task.id, handle.clone()) {
                if let Some(ref fresh) = handle {
                    self.scheduler.cancel(fresh);
                }
                warn!(task = %task.id, error = %err, "notification handle not persisted");
                task.notification_id = previous;
                return MutationOutcome {
                    task,
                    notification: NotificationOutcome::NotSynced(err.to_string()),
                };
            }
        }
        task.notification_id = handle;
        MutationOutcome { task, notification }
    }

    // Read-side passthroughs for the UI layer.

    pub fn tasks(&self) -> Result<Vec<Task>> {
        self.repo.list_tasks()
    }

    pub fn task(&self, id: &str) -> Result<Option<Task>> {
        self.repo.get_task_by_id(id)
    }

    pub fn stats(&self) -> Result<TaskStats> {
        self.repo.stats()
    }

    pub fn next_reminder(&self) -> Result<Option<DateTime<Utc>>> {
        self.repo.next_reminder()
    }

    pub fn settings(&self) -> Result<Settings> {
        self.repo.get_settings()
    }

    pub fn update_settings(&mut self, patch: SettingsPatch) -> Result<Settings> {
        self.repo.update_settings(&patch)
    }

    pub fn is_first_launch(&self) -> Result<bool> {
        self.repo.is_first_launch()
    }

    pub fn mark_launched(&mut self) -> Result<()> {
        self.repo.mark_launched()
    }
}
