//! Task and settings repository over a record store.
//!
//! The repository is the only component that touches the `tasks`, `settings`,
//! and `first_launch` keys. Every task mutation is a whole-collection
//! read-modify-write: the stored array is read fresh, edited, and written
//! back, which bounds this design to collections small enough that full
//! round trips stay cheap.
//!
//! Failure semantics: any `Err` means no durable change occurred; callers may
//! retry or surface the error. Error kinds are explicit (storage fault,
//! not-found, corrupt blob) so "nothing there" and "storage failed" are
//! distinguishable.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::{CoreError, Result, StorageError};
use crate::settings::{Settings, SettingsPatch};
use crate::storage::{RecordStore, FIRST_LAUNCH_KEY, SETTINGS_KEY, TASKS_KEY};
use crate::task::{Task, TaskPatch, TaskStats};

/// Owns the durable task collection and settings record.
pub struct TaskRepository<S: RecordStore> {
    store: S,
}

impl<S: RecordStore> TaskRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    fn load_tasks(&self) -> Result<Vec<Task>> {
        match self.store.read(TASKS_KEY)? {
            None => Ok(Vec::new()),
            Some(raw) => serde_json::from_str(&raw).map_err(|source| {
                StorageError::Corrupt {
                    key: TASKS_KEY.to_string(),
                    source,
                }
                .into()
            }),
        }
    }

    fn store_tasks(&mut self, tasks: &[Task]) -> Result<()> {
        let raw = serde_json::to_string(tasks).map_err(|source| StorageError::Corrupt {
            key: TASKS_KEY.to_string(),
            source,
        })?;
        self.store.write(TASKS_KEY, &raw)?;
        Ok(())
    }

    /// All tasks in insertion order. An absent key is an empty collection.
    pub fn list_tasks(&self) -> Result<Vec<Task>> {
        self.load_tasks()
    }

    /// Replace the entire stored collection.
    pub fn save_all(&mut self, tasks: &[Task]) -> Result<()> {
        self.store_tasks(tasks)
    }

    /// Append a task. Ids are not deduplicated; the caller guarantees
    /// uniqueness.
    pub fn add_task(&mut self, task: Task) -> Result<()> {
        let mut tasks = self.load_tasks()?;
        tasks.push(task);
        self.store_tasks(&tasks)
    }

    /// Shallow-merge `patch` into the task with `id`, refreshing
    /// `updated_at`, and return the merged record.
    ///
    /// # Errors
    /// `CoreError::NotFound` if no task with `id` exists.
    pub fn update_task(&mut self, id: &str, patch: &TaskPatch) -> Result<Task> {
        let mut tasks = self.load_tasks()?;
        let task = tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| CoreError::NotFound { id: id.to_string() })?;
        patch.apply_to(task, Utc::now());
        let updated = task.clone();
        self.store_tasks(&tasks)?;
        Ok(updated)
    }

    /// Persist the scheduler handle for a task without touching
    /// `updated_at` (handle bookkeeping is not a user-visible edit).
    ///
    /// # Errors
    /// `CoreError::NotFound` if no task with `id` exists.
    pub fn set_notification_handle(&mut self, id: &str, handle: Option<String>) -> Result<()> {
        let mut tasks = self.load_tasks()?;
        let task = tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| CoreError::NotFound { id: id.to_string() })?;
        task.notification_id = handle;
        self.store_tasks(&tasks)
    }

    /// Remove the task with `id`. Idempotent: deleting an unknown id is
    /// success, since the resulting collection matches intent.
    pub fn delete_task(&mut self, id: &str) -> Result<()> {
        let mut tasks = self.load_tasks()?;
        let before = tasks.len();
        tasks.retain(|t| t.id != id);
        if tasks.len() == before {
            debug!(id, "delete of unknown task id");
            return Ok(());
        }
        self.store_tasks(&tasks)
    }

    pub fn get_task_by_id(&self, id: &str) -> Result<Option<Task>> {
        Ok(self.load_tasks()?.into_iter().find(|t| t.id == id))
    }

    /// Statistics snapshot evaluated at `now`.
    pub fn stats_at(&self, now: DateTime<Utc>) -> Result<TaskStats> {
        Ok(TaskStats::collect(&self.load_tasks()?, now))
    }

    /// Statistics snapshot at the current wall-clock time.
    pub fn stats(&self) -> Result<TaskStats> {
        self.stats_at(Utc::now())
    }

    /// Nearest strictly-future reminder among pending tasks. Ties are broken
    /// by stored order (first wins).
    pub fn next_reminder_after(&self, now: DateTime<Utc>) -> Result<Option<DateTime<Utc>>> {
        let tasks = self.load_tasks()?;
        let mut nearest: Option<DateTime<Utc>> = None;
        for task in tasks.iter().filter(|t| t.is_pending()) {
            if let Some(at) = task.reminder_time {
                if at > now && nearest.map_or(true, |best| at < best) {
                    nearest = Some(at);
                }
            }
        }
        Ok(nearest)
    }

    pub fn next_reminder(&self) -> Result<Option<DateTime<Utc>>> {
        self.next_reminder_after(Utc::now())
    }

    /// Stored settings, or the documented defaults when no settings record
    /// exists.
    pub fn get_settings(&self) -> Result<Settings> {
        match self.store.read(SETTINGS_KEY)? {
            None => Ok(Settings::default()),
            Some(raw) => serde_json::from_str(&raw).map_err(|source| {
                StorageError::Corrupt {
                    key: SETTINGS_KEY.to_string(),
                    source,
                }
                .into()
            }),
        }
    }

    pub fn save_settings(&mut self, settings: &Settings) -> Result<()> {
        let raw = serde_json::to_string(settings).map_err(|source| StorageError::Corrupt {
            key: SETTINGS_KEY.to_string(),
            source,
        })?;
        self.store.write(SETTINGS_KEY, &raw)?;
        Ok(())
    }

    /// Shallow-merge `patch` into the stored settings and return the result.
    pub fn update_settings(&mut self, patch: &SettingsPatch) -> Result<Settings> {
        let mut settings = self.get_settings()?;
        patch.apply_to(&mut settings);
        self.save_settings(&settings)?;
        Ok(settings)
    }

    /// Remove the task collection and settings record. The first-launch
    /// marker is left untouched.
    pub fn clear_all_data(&mut self) -> Result<()> {
        self.store.remove_many(&[TASKS_KEY, SETTINGS_KEY])?;
        Ok(())
    }

    /// Whether this is the first launch (marker key absent).
    pub fn is_first_launch(&self) -> Result<bool> {
        Ok(self.store.read(FIRST_LAUNCH_KEY)?.is_none())
    }

    /// Clear the first-launch marker.
    pub fn mark_launched(&mut self) -> Result<()> {
        self.store.write(FIRST_LAUNCH_KEY, "false")?;
        Ok(())
    }
}
