//! Core domain logic for the co-parenting app.
//! This crate is the single source of truth for business invariants.

pub mod capability;
pub mod db;
pub mod logging;
pub mod model;
pub mod recurrence;
pub mod repo;
pub mod service;

pub use capability::{
    AuthProvider, Capability, CapabilityError, FileStore, NotificationPermission, Notifier,
    PushEndpoint, StaticAuthProvider,
};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LogSettings, LoggingError};
pub use model::calendar_event::{
    CalendarEvent, EventCategory, EventId, NewCalendarEvent, RecurrenceRule,
};
pub use model::{UserId, ValidationError};
pub use recurrence::{expand, occurrence_dates, InstanceDraft};
pub use repo::event_repo::{EventListQuery, EventRepository, SqliteEventRepository};
pub use repo::{RepoError, RepoResult};
pub use service::calendar_service::{
    preview_occurrences, CalendarService, EventFilter, EventSeries,
};
pub use service::{ServiceError, ServiceResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
