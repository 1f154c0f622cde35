//! # Taskpad Core Library
//!
//! This library provides the persistence and reminder logic for the Taskpad
//! task manager. The UI layer on top of it is a thin shell: screens call into
//! the facade here and render whatever state comes back.
//!
//! ## Architecture
//!
//! - **Record Store**: durable, schemaless key→JSON-blob storage behind the
//!   [`RecordStore`] trait (SQLite-backed in production, in-memory for tests)
//! - **Task Repository**: owns the task collection and settings record with
//!   whole-collection read-modify-write semantics and derived statistics
//! - **Reminder Scheduler**: permission-gated bridge from task reminder times
//!   to a platform notification primitive
//! - **Task Service**: the facade that keeps storage and scheduling in sync
//!   for every mutation, with an explicit asymmetric-failure contract (task
//!   durability over notification delivery)
//!
//! ## Key Components
//!
//! - [`TaskService`]: apply-style mutations returning [`MutationOutcome`]
//! - [`TaskRepository`]: CRUD, settings, statistics, next-reminder lookup
//! - [`ReminderScheduler`]: schedule/cancel over a [`NotificationBackend`]
//! - [`SqliteStore`]: the durable record store

pub mod error;
pub mod notify;
pub mod repository;
pub mod service;
pub mod settings;
pub mod storage;
pub mod task;

pub use error::{CoreError, Result, ScheduleError, StorageError};
pub use notify::{NotificationBackend, NotificationRequest, ReminderScheduler};
pub use repository::TaskRepository;
pub use service::{MutationOutcome, NotificationOutcome, TaskService};
pub use settings::{Settings, SettingsPatch, ThemeMode};
pub use storage::{MemoryStore, RecordStore, SqliteStore};
pub use task::{NewTask, Task, TaskPatch, TaskPriority, TaskStats, TaskStatus};
