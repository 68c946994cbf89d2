//! Row types shared by the PostgreSQL adapters, with their domain conversions.

use chrono::{DateTime, Utc};
use sqlx::types::Json;

use crate::domain::chat::{
    Attachments, GroupSize, Membership, Message, MessageDisplay, Participant, QueueEntry, Room,
    RoomOrigin,
};
use crate::domain::foundation::{
    ConnectionId, DomainError, ErrorCode, HireId, MessageId, QueueEntryId, RoomId, Timestamp,
    UserId,
};

pub(super) const ROOM_COLUMNS: &str = "id, name, host_id, hire_id, origin, created_at";

pub(super) const MESSAGE_COLUMNS: &str =
    "id, room_id, user_id, text, display, image_name, document_name, created_at";

pub(super) const MEMBERSHIP_COLUMNS: &str =
    "user_id, room_id, last_read_message_id, connection_id";

pub(super) const QUEUE_COLUMNS: &str =
    "id, user_id, name, participants, connection_id, enqueued_at";

pub(super) const USER_COLUMNS: &str = "id, email, first_name, last_name, phone";

#[derive(Debug, sqlx::FromRow)]
pub(super) struct RoomRow {
    pub id: i64,
    pub name: Option<String>,
    pub host_id: Option<i64>,
    pub hire_id: Option<i64>,
    pub origin: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<RoomRow> for Room {
    type Error = DomainError;

    fn try_from(row: RoomRow) -> Result<Self, Self::Error> {
        Ok(Room::reconstitute(
            RoomId::from_raw(row.id),
            row.name,
            row.host_id.map(UserId::from_raw),
            row.hire_id.map(HireId::from_raw),
            parse_origin(&row.origin)?,
            Timestamp::from_datetime(row.created_at),
        ))
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(super) struct MessageRow {
    pub id: i64,
    pub room_id: i64,
    pub user_id: i64,
    pub text: Option<String>,
    pub display: Json<Vec<MessageDisplay>>,
    pub image_name: Option<String>,
    pub document_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<MessageRow> for Message {
    fn from(row: MessageRow) -> Self {
        Message::reconstitute(
            MessageId::from_raw(row.id),
            RoomId::from_raw(row.room_id),
            UserId::from_raw(row.user_id),
            row.text,
            row.display.0,
            Attachments {
                image_name: row.image_name,
                document_name: row.document_name,
            },
            Timestamp::from_datetime(row.created_at),
        )
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(super) struct MembershipRow {
    pub user_id: i64,
    pub room_id: i64,
    pub last_read_message_id: Option<i64>,
    pub connection_id: Option<String>,
}

impl TryFrom<MembershipRow> for Membership {
    type Error = DomainError;

    fn try_from(row: MembershipRow) -> Result<Self, Self::Error> {
        Ok(Membership::reconstitute(
            UserId::from_raw(row.user_id),
            RoomId::from_raw(row.room_id),
            row.last_read_message_id.map(MessageId::from_raw),
            parse_connection_id(row.connection_id)?,
        ))
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(super) struct QueueEntryRow {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub participants: i32,
    pub connection_id: Option<String>,
    pub enqueued_at: DateTime<Utc>,
}

impl TryFrom<QueueEntryRow> for QueueEntry {
    type Error = DomainError;

    fn try_from(row: QueueEntryRow) -> Result<Self, Self::Error> {
        let participants = u32::try_from(row.participants).map_err(|_| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid participants value: {}", row.participants),
            )
        })?;
        Ok(QueueEntry {
            id: QueueEntryId::from_raw(row.id),
            user_id: UserId::from_raw(row.user_id),
            name: row.name,
            participants: GroupSize::from_raw(participants),
            connection_id: parse_connection_id(row.connection_id)?,
            enqueued_at: Timestamp::from_datetime(row.enqueued_at),
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(super) struct UserRow {
    pub id: i64,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
}

impl From<UserRow> for Participant {
    fn from(row: UserRow) -> Self {
        Participant {
            id: UserId::from_raw(row.id),
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            phone: row.phone,
        }
    }
}

pub(super) fn parse_origin(s: &str) -> Result<RoomOrigin, DomainError> {
    match s {
        "direct" => Ok(RoomOrigin::Direct),
        "matched" => Ok(RoomOrigin::Matched),
        "hire" => Ok(RoomOrigin::Hire),
        _ => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid room origin: {}", s),
        )),
    }
}

pub(super) fn origin_to_str(origin: RoomOrigin) -> &'static str {
    match origin {
        RoomOrigin::Direct => "direct",
        RoomOrigin::Matched => "matched",
        RoomOrigin::Hire => "hire",
    }
}

fn parse_connection_id(value: Option<String>) -> Result<Option<ConnectionId>, DomainError> {
    value
        .map(|v| {
            ConnectionId::new(v).map_err(|e| {
                DomainError::new(ErrorCode::DatabaseError, format!("Invalid connection_id: {}", e))
            })
        })
        .transpose()
}

/// `ILIKE` pattern matching `word` anywhere, with wildcards in `word` escaped.
pub(super) fn contains_pattern(word: &str) -> String {
    let escaped = word
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_roundtrips() {
        for origin in [RoomOrigin::Direct, RoomOrigin::Matched, RoomOrigin::Hire] {
            assert_eq!(parse_origin(origin_to_str(origin)).unwrap(), origin);
        }
        assert!(parse_origin("lobby").is_err());
    }

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(contains_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(contains_pattern("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn blank_connection_id_in_storage_is_rejected() {
        assert!(parse_connection_id(Some("  ".into())).is_err());
        assert_eq!(parse_connection_id(None).unwrap(), None);
    }

    #[test]
    fn negative_participants_are_rejected() {
        let row = QueueEntryRow {
            id: 1,
            user_id: 1,
            name: "Ann".into(),
            participants: -2,
            connection_id: None,
            enqueued_at: Utc::now(),
        };
        assert!(QueueEntry::try_from(row).is_err());
    }
}
