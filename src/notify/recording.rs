//! Recording notification backend for tests.
//!
//! Keeps every schedule and cancel call so tests can assert on the live set
//! of notifications and on call counts.

use chrono::{DateTime, Utc};

use super::{NotificationBackend, NotificationRequest};
use crate::error::ScheduleError;

/// Trigger recorded for a scheduled notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    At(DateTime<Utc>),
    Daily { hour: u32, minute: u32 },
}

/// A live scheduled notification inside the fake backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledCall {
    pub id: String,
    pub request: NotificationRequest,
    pub trigger: Trigger,
}

/// Test double recording all backend traffic.
#[derive(Debug)]
pub struct RecordingBackend {
    /// Determined permission state reported by `permission_status`.
    pub permission: Option<bool>,
    /// What `request_permission` answers when prompted.
    pub grant_on_request: bool,
    /// Make the next schedule calls fail.
    pub fail_schedule: bool,
    /// Number of permission prompts issued.
    pub prompts: u32,
    /// Currently live notifications.
    pub scheduled: Vec<ScheduledCall>,
    /// Every cancelled handle, in call order (including unknown ones).
    pub cancelled: Vec<String>,
    next_id: u32,
}

impl RecordingBackend {
    /// Backend with permission already granted.
    pub fn granted() -> Self {
        Self::with_permission(Some(true), false)
    }

    /// Backend with permission already denied.
    pub fn denied() -> Self {
        Self::with_permission(Some(false), false)
    }

    /// Backend that must be prompted; `grant` is the prompt's answer.
    pub fn undetermined(grant: bool) -> Self {
        Self::with_permission(None, grant)
    }

    fn with_permission(permission: Option<bool>, grant_on_request: bool) -> Self {
        Self {
            permission,
            grant_on_request,
            fail_schedule: false,
            prompts: 0,
            scheduled: Vec::new(),
            cancelled: Vec::new(),
            next_id: 0,
        }
    }

    fn next_handle(&mut self) -> String {
        self.next_id += 1;
        format!("ntf-{}", self.next_id)
    }

    /// How many times `handle` was cancelled.
    pub fn cancel_count(&self, handle: &str) -> usize {
        self.cancelled.iter().filter(|c| *c == handle).count()
    }
}

impl NotificationBackend for RecordingBackend {
    fn permission_status(&self) -> Option<bool> {
        self.permission
    }

    fn request_permission(&mut self) -> bool {
        self.prompts += 1;
        self.permission = Some(self.grant_on_request);
        self.grant_on_request
    }

    fn schedule_at(
        &mut self,
        request: &NotificationRequest,
        at: DateTime<Utc>,
    ) -> Result<String, ScheduleError> {
        if self.fail_schedule {
            return Err(ScheduleError::Backend("injected schedule failure".to_string()));
        }
        let id = self.next_handle();
        self.scheduled.push(ScheduledCall {
            id: id.clone(),
            request: request.clone(),
            trigger: Trigger::At(at),
        });
        Ok(id)
    }

    fn schedule_daily(
        &mut self,
        request: &NotificationRequest,
        hour: u32,
        minute: u32,
    ) -> Result<String, ScheduleError> {
        if self.fail_schedule {
            return Err(ScheduleError::Backend("injected schedule failure".to_string()));
        }
        let id = self.next_handle();
        self.scheduled.push(ScheduledCall {
            id: id.clone(),
            request: request.clone(),
            trigger: Trigger::Daily { hour, minute },
        });
        Ok(id)
    }

    fn cancel(&mut self, id: &str) -> Result<(), ScheduleError> {
        self.cancelled.push(id.to_string());
        self.scheduled.retain(|c| c.id != id);
        Ok(())
    }

    fn cancel_all(&mut self) -> Result<(), ScheduleError> {
        self.scheduled.clear();
        Ok(())
    }

    fn list_scheduled(&self) -> Vec<String> {
        self.scheduled.iter().map(|c| c.id.clone()).collect()
    }
}
