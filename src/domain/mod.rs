//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, pagination, errors)
//! - `chat` - Rooms, memberships, messages, the matching queue and notifications

pub mod chat;
pub mod foundation;
