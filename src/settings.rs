//! User settings record.
//!
//! A singleton stored as one JSON object under the `settings` record key.
//! Every field carries a serde default so a missing key or a partially
//! written blob yields the documented defaults:
//! `notificationDelay = 30`, `themeMode = dark`, `enableNotifications = true`,
//! `dailyReminderTime = "09:00"`.

use serde::{Deserialize, Serialize};

/// UI theme mode.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Light,
    Dark,
}

impl Default for ThemeMode {
    fn default() -> Self {
        ThemeMode::Dark
    }
}

/// User preferences.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Default reminder offset in minutes when a task has no explicit
    /// reminder time.
    #[serde(default = "default_notification_delay")]
    pub notification_delay: u32,
    #[serde(default)]
    pub theme_mode: ThemeMode,
    /// Master switch for scheduling new notifications. Advisory: turning it
    /// off does not cancel notifications that are already scheduled.
    #[serde(default = "default_true")]
    pub enable_notifications: bool,
    /// Wall-clock time (`HH:MM`) for a recurring daily notification.
    #[serde(default = "default_daily_reminder_time")]
    pub daily_reminder_time: Option<String>,
}

// Default functions
fn default_notification_delay() -> u32 {
    30
}
fn default_true() -> bool {
    true
}
fn default_daily_reminder_time() -> Option<String> {
    Some("09:00".to_string())
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            notification_delay: default_notification_delay(),
            theme_mode: ThemeMode::default(),
            enable_notifications: true,
            daily_reminder_time: default_daily_reminder_time(),
        }
    }
}

/// Shallow partial update of the settings record.
///
/// `daily_reminder_time` uses a double option so `Some(None)` disables the
/// daily reminder.
#[derive(Debug, Clone, Default)]
pub struct SettingsPatch {
    pub notification_delay: Option<u32>,
    pub theme_mode: Option<ThemeMode>,
    pub enable_notifications: Option<bool>,
    pub daily_reminder_time: Option<Option<String>>,
}

impl SettingsPatch {
    /// Merge into `settings`, replacing each present field wholesale.
    pub fn apply_to(&self, settings: &mut Settings) {
        if let Some(delay) = self.notification_delay {
            settings.notification_delay = delay;
        }
        if let Some(mode) = self.theme_mode {
            settings.theme_mode = mode;
        }
        if let Some(enabled) = self.enable_notifications {
            settings.enable_notifications = enabled;
        }
        if let Some(ref daily) = self.daily_reminder_time {
            settings.daily_reminder_time = daily.clone();
        }
    }
}
