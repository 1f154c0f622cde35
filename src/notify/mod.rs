//! Reminder scheduling over a platform notification primitive.
//!
//! `NotificationBackend` is the seam to the device notification subsystem;
//! `ReminderScheduler` adds permission gating and the trigger-resolution
//! rules. Scheduled notifications live inside the backend and are referenced
//! only by the opaque handles it returns; the scheduler itself holds no
//! persistent state.
//!
//! State machine per handle: unscheduled → `schedule()` → scheduled →
//! (fires | `cancel()`) → unscheduled. There is no in-place reschedule;
//! rescheduling is cancel-then-schedule.

#[cfg(test)]
pub mod recording;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

use crate::error::ScheduleError;
use crate::task::Task;

/// Content of a notification to present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRequest {
    pub title: String,
    pub body: Option<String>,
}

impl NotificationRequest {
    /// Reminder content for a task.
    pub fn for_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            body: task.description.clone(),
        }
    }

    /// Content for the recurring daily check-in.
    pub fn daily() -> Self {
        Self {
            title: "Daily reminder".to_string(),
            body: Some("Review your tasks for today".to_string()),
        }
    }
}

/// Device notification primitive.
///
/// Handles returned by the scheduling calls are opaque; cancelling an
/// already-fired or unknown handle must succeed.
pub trait NotificationBackend {
    /// Current permission state; `None` when not yet determined.
    fn permission_status(&self) -> Option<bool>;

    /// Prompt the user for permission; returns whether it was granted.
    fn request_permission(&mut self) -> bool;

    /// Schedule a one-shot notification at an instant.
    fn schedule_at(
        &mut self,
        request: &NotificationRequest,
        at: DateTime<Utc>,
    ) -> Result<String, ScheduleError>;

    /// Schedule a repeating daily notification at a wall-clock time.
    fn schedule_daily(
        &mut self,
        request: &NotificationRequest,
        hour: u32,
        minute: u32,
    ) -> Result<String, ScheduleError>;

    /// Cancel a scheduled notification by handle.
    fn cancel(&mut self, id: &str) -> Result<(), ScheduleError>;

    /// Cancel every scheduled notification.
    fn cancel_all(&mut self) -> Result<(), ScheduleError>;

    /// Handles of currently live scheduled notifications.
    fn list_scheduled(&self) -> Vec<String>;
}

/// Bridges task reminder times to the notification backend.
pub struct ReminderScheduler<N: NotificationBackend> {
    backend: N,
    /// Permission outcome for this process lifetime. Re-checked, not
    /// persisted, across restarts.
    permission: Option<bool>,
}

impl<N: NotificationBackend> ReminderScheduler<N> {
    pub fn new(backend: N) -> Self {
        Self {
            backend,
            permission: None,
        }
    }

    pub fn backend(&self) -> &N {
        &self.backend
    }

    /// Resolve notification permission, prompting at most once per process
    /// lifetime. A denial is terminal for the session.
    pub fn ensure_permission(&mut self) -> bool {
        if let Some(granted) = self.permission {
            return granted;
        }
        let granted = match self.backend.permission_status() {
            Some(determined) => determined,
            None => self.backend.request_permission(),
        };
        self.permission = Some(granted);
        granted
    }

    /// Schedule the reminder for `task`.
    ///
    /// The trigger is `task.reminder_time` if set, otherwise now plus
    /// `fallback_delay_minutes`. Refuses without touching the backend when
    /// there is nothing to schedule or the trigger is not in the future.
    ///
    /// # Errors
    /// `NothingToSchedule` when no reminder time is set and the fallback is
    /// zero; `PastTrigger` when the trigger is at or before now;
    /// `PermissionDenied` when the session is denied; `Backend` when the
    /// platform call fails.
    pub fn schedule(
        &mut self,
        task: &Task,
        fallback_delay_minutes: u32,
    ) -> Result<String, ScheduleError> {
        let now = Utc::now();
        let trigger = match task.reminder_time {
            Some(at) => at,
            None if fallback_delay_minutes == 0 => return Err(ScheduleError::NothingToSchedule),
            None => now + Duration::minutes(i64::from(fallback_delay_minutes)),
        };
        if trigger <= now {
            debug!(task = %task.id, %trigger, "refusing to schedule past trigger");
            return Err(ScheduleError::PastTrigger { trigger });
        }
        if !self.ensure_permission() {
            return Err(ScheduleError::PermissionDenied);
        }
        self.backend
            .schedule_at(&NotificationRequest::for_task(task), trigger)
    }

    /// Cancel a notification by handle. Best-effort: unknown or
    /// already-fired handles are success, and backend faults are logged and
    /// swallowed.
    pub fn cancel(&mut self, id: &str) {
        if let Err(err) = self.backend.cancel(id) {
            warn!(id, error = %err, "failed to cancel notification");
        }
    }

    /// Cancel every scheduled notification. Used only by the full data
    /// reset.
    pub fn cancel_all(&mut self) {
        if let Err(err) = self.backend.cancel_all() {
            warn!(error = %err, "failed to cancel all notifications");
        }
    }

    /// Schedule the recurring daily notification at `HH:MM`.
    ///
    /// # Errors
    /// `InvalidDailyTime` for a malformed time string, `PermissionDenied`
    /// when the session is denied, `Backend` when the platform call fails.
    pub fn schedule_daily_recurring(&mut self, hhmm: &str) -> Result<String, ScheduleError> {
        let (hour, minute) = parse_hhmm(hhmm)?;
        if !self.ensure_permission() {
            return Err(ScheduleError::PermissionDenied);
        }
        self.backend
            .schedule_daily(&NotificationRequest::daily(), hour, minute)
    }
}

/// Parse a `HH:MM` wall-clock time.
fn parse_hhmm(s: &str) -> Result<(u32, u32), ScheduleError> {
    let invalid = || ScheduleError::InvalidDailyTime(s.to_string());
    let (h, m) = s.split_once(':').ok_or_else(invalid)?;
    let hour: u32 = h.parse().map_err(|_| invalid())?;
    let minute: u32 = m.parse().map_err(|_| invalid())?;
    if hour > 23 || minute > 59 {
        return Err(invalid());
    }
    Ok((hour, minute))
}

#[cfg(test)]
mod tests {
    use super::recording::{RecordingBackend, Trigger};
    use super::*;
    use crate::task::{TaskPriority, TaskStatus};

    fn reminder_task(at: Option<DateTime<Utc>>) -> Task {
        let now = Utc::now();
        Task {
            id: "t1".to_string(),
            title: "Pay rent".to_string(),
            description: None,
            priority: TaskPriority::High,
            status: TaskStatus::Pending,
            created_at: now,
            updated_at: now,
            due_date: None,
            reminder_time: at,
            notification_id: None,
        }
    }

    #[test]
    fn schedules_at_explicit_reminder_time() {
        let at = Utc::now() + Duration::hours(1);
        let mut scheduler = ReminderScheduler::new(RecordingBackend::granted());
        let handle = scheduler.schedule(&reminder_task(Some(at)), 30).unwrap();
        let calls = &scheduler.backend().scheduled;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].id, handle);
        assert_eq!(calls[0].trigger, Trigger::At(at));
        assert_eq!(calls[0].request.title, "Pay rent");
    }

    #[test]
    fn falls_back_to_delay_when_no_reminder_time() {
        let before = Utc::now();
        let mut scheduler = ReminderScheduler::new(RecordingBackend::granted());
        scheduler.schedule(&reminder_task(None), 30).unwrap();
        let Trigger::At(at) = scheduler.backend().scheduled[0].trigger else {
            panic!("expected one-shot trigger");
        };
        assert!(at >= before + Duration::minutes(30));
        assert!(at <= Utc::now() + Duration::minutes(30));
    }

    #[test]
    fn refuses_past_trigger_without_touching_backend() {
        let past = Utc::now() - Duration::minutes(5);
        let mut scheduler = ReminderScheduler::new(RecordingBackend::granted());
        let err = scheduler.schedule(&reminder_task(Some(past)), 30).unwrap_err();
        assert_eq!(err, ScheduleError::PastTrigger { trigger: past });
        assert!(scheduler.backend().scheduled.is_empty());
    }

    #[test]
    fn refuses_zero_fallback_without_reminder() {
        let mut scheduler = ReminderScheduler::new(RecordingBackend::granted());
        let err = scheduler.schedule(&reminder_task(None), 0).unwrap_err();
        assert_eq!(err, ScheduleError::NothingToSchedule);
        assert!(scheduler.backend().scheduled.is_empty());
    }

    #[test]
    fn prompts_for_permission_at_most_once() {
        let mut scheduler = ReminderScheduler::new(RecordingBackend::undetermined(false));
        let at = Some(Utc::now() + Duration::hours(1));
        assert_eq!(
            scheduler.schedule(&reminder_task(at), 0).unwrap_err(),
            ScheduleError::PermissionDenied
        );
        assert_eq!(
            scheduler.schedule(&reminder_task(at), 0).unwrap_err(),
            ScheduleError::PermissionDenied
        );
        assert_eq!(scheduler.backend().prompts, 1);
        assert!(scheduler.backend().scheduled.is_empty());
    }

    #[test]
    fn determined_permission_is_not_reprompted() {
        let mut scheduler = ReminderScheduler::new(RecordingBackend::granted());
        assert!(scheduler.ensure_permission());
        assert!(scheduler.ensure_permission());
        assert_eq!(scheduler.backend().prompts, 0);
    }

    #[test]
    fn cancel_unknown_handle_is_success() {
        let mut scheduler = ReminderScheduler::new(RecordingBackend::granted());
        scheduler.cancel("never-scheduled");
        assert_eq!(scheduler.backend().cancelled, vec!["never-scheduled"]);
    }

    #[test]
    fn daily_recurring_schedules_at_wall_clock_time() {
        let mut scheduler = ReminderScheduler::new(RecordingBackend::granted());
        let handle = scheduler.schedule_daily_recurring("09:00").unwrap();
        let calls = &scheduler.backend().scheduled;
        assert_eq!(calls[0].id, handle);
        assert_eq!(calls[0].trigger, Trigger::Daily { hour: 9, minute: 0 });
    }

    #[test]
    fn daily_recurring_rejects_malformed_times() {
        let mut scheduler = ReminderScheduler::new(RecordingBackend::granted());
        for bad in ["", "9", "24:00", "09:60", "ab:cd", "09-00"] {
            assert!(matches!(
                scheduler.schedule_daily_recurring(bad),
                Err(ScheduleError::InvalidDailyTime(_))
            ));
        }
        assert!(scheduler.backend().scheduled.is_empty());
    }

    #[test]
    fn parse_hhmm_accepts_bounds() {
        assert_eq!(parse_hhmm("00:00").unwrap(), (0, 0));
        assert_eq!(parse_hhmm("23:59").unwrap(), (23, 59));
    }

    #[test]
    fn backend_fault_propagates_as_schedule_error() {
        let mut backend = RecordingBackend::granted();
        backend.fail_schedule = true;
        let mut scheduler = ReminderScheduler::new(backend);
        let at = Some(Utc::now() + Duration::hours(1));
        assert!(matches!(
            scheduler.schedule(&reminder_task(at), 0),
            Err(ScheduleError::Backend(_))
        ));
    }
}
