//! Strongly-typed identifier value objects.
//!
//! Persistent records (users, rooms, messages, queue entries, hires) use the
//! database's serial integer keys. Live realtime connections are identified by
//! an opaque server-generated string.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::ValidationError;

/// Declares a positive integer identifier backed by a database serial key.
macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident, $field:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Creates an id, rejecting zero and negative values.
            pub fn new(value: i64) -> Result<Self, ValidationError> {
                if value < 1 {
                    return Err(ValidationError::out_of_range($field, 1, i32::MAX, value as i32));
                }
                Ok(Self(value))
            }

            /// Wraps a value already known to be a valid key (e.g. read from storage).
            pub fn from_raw(value: i64) -> Self {
                Self(value)
            }

            /// Returns the inner integer.
            pub fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let value = s
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| ValidationError::invalid_format($field, "expected a positive integer"))?;
                Self::new(value)
            }
        }
    };
}

numeric_id!(
    /// Identifier of a platform user (owned by the Users collaborator).
    UserId,
    "user_id"
);

numeric_id!(
    /// Identifier of a chat room.
    RoomId,
    "room_id"
);

numeric_id!(
    /// Identifier of a persisted message. Monotonically increasing with insertion.
    MessageId,
    "message_id"
);

numeric_id!(
    /// Identifier of a waiting queue entry.
    QueueEntryId,
    "queue_entry_id"
);

numeric_id!(
    /// Identifier of an external hiring record.
    HireId,
    "hire_id"
);

numeric_id!(
    /// Identifier of an external vacancy.
    VacancyId,
    "vacancy_id"
);

numeric_id!(
    /// Identifier of a calendar event attached to a meeting-date message.
    EventId,
    "event_id"
);

numeric_id!(
    /// Identifier of a scheduling slot offered in a meeting-date message.
    ScheduleId,
    "schedule_id"
);

/// Opaque identifier of one live realtime transport session.
///
/// Generated server-side when a socket connects. A user that reconnects gets
/// a fresh id; memberships are rebound to it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(String);

impl ConnectionId {
    /// Creates a new random connection id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wraps an existing connection id, returning error if empty.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ValidationError::empty_field("connection_id"));
        }
        Ok(Self(id))
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_id_rejects_non_positive_values() {
        assert!(RoomId::new(0).is_err());
        assert!(RoomId::new(-4).is_err());
        assert_eq!(RoomId::new(7).unwrap().as_i64(), 7);
    }

    #[test]
    fn numeric_id_parses_from_string() {
        let id: UserId = " 42 ".parse().unwrap();
        assert_eq!(id, UserId::from_raw(42));
        assert!("abc".parse::<UserId>().is_err());
        assert!("0".parse::<MessageId>().is_err());
    }

    #[test]
    fn numeric_id_serializes_transparently() {
        let json = serde_json::to_string(&MessageId::from_raw(9)).unwrap();
        assert_eq!(json, "9");
        let back: MessageId = serde_json::from_str("9").unwrap();
        assert_eq!(back.as_i64(), 9);
    }

    #[test]
    fn message_ids_order_numerically() {
        assert!(MessageId::from_raw(3) < MessageId::from_raw(10));
    }

    #[test]
    fn connection_id_generate_is_unique() {
        let a = ConnectionId::generate();
        let b = ConnectionId::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 36);
    }

    #[test]
    fn connection_id_rejects_blank() {
        assert!(ConnectionId::new("  ").is_err());
        assert_eq!(ConnectionId::new("abc").unwrap().to_string(), "abc");
    }
}
