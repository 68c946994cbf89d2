//! Room entity.
//!
//! Rooms are permanent: created once (directly, by the matcher, or for a
//! hire) and never deleted. Membership lives on [`super::Membership`].

use crate::domain::foundation::{HireId, RoomId, Timestamp, UserId, ValidationError};
use serde::{Deserialize, Serialize};

use super::Participant;

/// Maximum length for a room name.
pub const MAX_ROOM_NAME_LENGTH: usize = 255;

/// How a room came into existence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomOrigin {
    Direct,
    Matched,
    Hire,
}

/// Persisted chat room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    id: RoomId,
    name: Option<String>,
    host_id: Option<UserId>,
    hire_id: Option<HireId>,
    origin: RoomOrigin,
    created_at: Timestamp,
}

impl Room {
    /// Reconstitute a room from persistence.
    pub fn reconstitute(
        id: RoomId,
        name: Option<String>,
        host_id: Option<UserId>,
        hire_id: Option<HireId>,
        origin: RoomOrigin,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            name,
            host_id,
            hire_id,
            origin,
            created_at,
        }
    }

    pub fn id(&self) -> RoomId {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn host_id(&self) -> Option<UserId> {
        self.host_id
    }

    pub fn hire_id(&self) -> Option<HireId> {
        self.hire_id
    }

    pub fn origin(&self) -> RoomOrigin {
        self.origin
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    /// True if every whitespace-separated word of `query` occurs in the
    /// room name, ignoring case.
    pub fn name_matches(&self, query: &str) -> bool {
        let Some(name) = &self.name else {
            return false;
        };
        let name = name.to_lowercase();
        query
            .split_whitespace()
            .all(|word| name.contains(&word.to_lowercase()))
    }
}

/// Attributes of a room about to be created. Storage assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRoom {
    pub name: Option<String>,
    pub host_id: Option<UserId>,
    pub hire_id: Option<HireId>,
    pub origin: RoomOrigin,
}

impl NewRoom {
    /// Room between a host and one other user.
    pub fn direct(host_id: UserId) -> Self {
        Self {
            name: None,
            host_id: Some(host_id),
            hire_id: None,
            origin: RoomOrigin::Direct,
        }
    }

    /// Room formed by the queue matcher; hostless.
    pub fn matched(name: Option<String>) -> Result<Self, ValidationError> {
        Ok(Self {
            name: normalize_name(name)?,
            host_id: None,
            hire_id: None,
            origin: RoomOrigin::Matched,
        })
    }

    /// Room keyed by a hiring record and its host.
    pub fn hire(
        name: Option<String>,
        host_id: UserId,
        hire_id: Option<HireId>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            name: normalize_name(name)?,
            host_id: Some(host_id),
            hire_id,
            origin: RoomOrigin::Hire,
        })
    }
}

fn normalize_name(name: Option<String>) -> Result<Option<String>, ValidationError> {
    let Some(name) = name else {
        return Ok(None);
    };
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.chars().count() > MAX_ROOM_NAME_LENGTH {
        return Err(ValidationError::out_of_range(
            "name",
            1,
            MAX_ROOM_NAME_LENGTH as i32,
            trimmed.chars().count() as i32,
        ));
    }
    Ok(Some(trimmed.to_string()))
}

/// A room as seen by one of its members in a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    #[serde(flatten)]
    pub room: Room,
    pub unread_messages_count: u64,
    pub last_message_timestamp: Option<Timestamp>,
    /// Other members of the room, personal fields masked.
    pub companions: Vec<Participant>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room(name: Option<&str>) -> Room {
        Room::reconstitute(
            RoomId::from_raw(1),
            name.map(String::from),
            None,
            None,
            RoomOrigin::Matched,
            Timestamp::now(),
        )
    }

    #[test]
    fn name_matches_requires_every_word() {
        let r = room(Some("Backend Engineer interview"));
        assert!(r.name_matches("engineer"));
        assert!(r.name_matches("INTERVIEW backend"));
        assert!(!r.name_matches("backend designer"));
        assert!(!room(None).name_matches("x"));
    }

    #[test]
    fn blank_names_are_dropped() {
        let new = NewRoom::matched(Some("   ".to_string())).unwrap();
        assert_eq!(new.name, None);
        assert_eq!(new.origin, RoomOrigin::Matched);
        assert_eq!(new.host_id, None);
    }

    #[test]
    fn overlong_names_are_rejected() {
        let long = "x".repeat(MAX_ROOM_NAME_LENGTH + 1);
        assert!(NewRoom::hire(Some(long), UserId::from_raw(1), None).is_err());
    }

    #[test]
    fn hire_room_keeps_host_and_hire() {
        let new = NewRoom::hire(
            Some(" Senior role ".to_string()),
            UserId::from_raw(4),
            Some(HireId::from_raw(9)),
        )
        .unwrap();
        assert_eq!(new.name.as_deref(), Some("Senior role"));
        assert_eq!(new.host_id, Some(UserId::from_raw(4)));
        assert_eq!(new.hire_id, Some(HireId::from_raw(9)));
    }
}
