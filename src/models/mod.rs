//! Data models module
//!
//! This module contains all data structures used throughout the application

pub mod user;
pub mod event;
pub mod hosting;
pub mod notification;

// Re-export commonly used models
pub use user::{User, UserSummary, CreateUserRequest};
pub use event::{
    Event, EventDetail, EventDetailResponse, EventHistoryEntry, EventParticipantRow, EventStatus,
    CreateEventRequest, UpdateEventRequest, GeoPoint, UserScheduledEventDetail, UserScheduledEventsResponse,
};
pub use hosting::{HostingCounters, HostingConfigInfo, HostingStatus, HostingTransition};
pub use notification::{NotificationKind, PushPayload};
