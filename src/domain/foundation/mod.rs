//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, timestamps, pagination and error types that form the
//! vocabulary of the chat domain.

mod auth;
mod errors;
mod ids;
mod pagination;
mod timestamp;

pub use auth::{AuthError, AuthenticatedUser};
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{
    ConnectionId, EventId, HireId, MessageId, QueueEntryId, RoomId, ScheduleId, UserId, VacancyId,
};
pub use pagination::{Page, PageRequest, SortDirection};
pub use timestamp::Timestamp;
