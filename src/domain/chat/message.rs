//! Message entity and its structured display payloads.
//!
//! Messages are immutable once stored, except that background collaborators
//! may enrich `display` payloads (e.g. attach the calendar event created for
//! a picked meeting date).

use crate::domain::foundation::{
    EventId, MessageId, RoomId, ScheduleId, Timestamp, UserId, ValidationError,
};
use serde::{Deserialize, Serialize};

/// Maximum length of a message body, in characters.
pub const MAX_TEXT_LENGTH: usize = 10_000;

/// Payload of a "pick a meeting date" card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingDatePayload {
    pub schedule_id: ScheduleId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<EventId>,
}

/// Typed structured record rendered alongside (or instead of) message text.
///
/// Serialized as `{"type": "pick_meeting_date", "payload": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum MessageDisplay {
    PickMeetingDate(MeetingDatePayload),
}

impl MessageDisplay {
    pub fn pick_meeting_date(schedule_id: ScheduleId) -> Self {
        MessageDisplay::PickMeetingDate(MeetingDatePayload {
            schedule_id,
            event_id: None,
        })
    }
}

/// File references stored with a message. The files themselves live elsewhere.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachments {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_name: Option<String>,
}

impl Attachments {
    pub fn is_empty(&self) -> bool {
        self.image_name.is_none() && self.document_name.is_none()
    }
}

/// Persisted message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    id: MessageId,
    room_id: RoomId,
    user_id: UserId,
    text: Option<String>,
    display: Vec<MessageDisplay>,
    #[serde(flatten)]
    attachments: Attachments,
    created_at: Timestamp,
}

impl Message {
    /// Reconstitute a message from persistence.
    pub fn reconstitute(
        id: MessageId,
        room_id: RoomId,
        user_id: UserId,
        text: Option<String>,
        display: Vec<MessageDisplay>,
        attachments: Attachments,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            room_id,
            user_id,
            text,
            display,
            attachments,
            created_at,
        }
    }

    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn room_id(&self) -> RoomId {
        self.room_id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn display(&self) -> &[MessageDisplay] {
        &self.display
    }

    pub fn attachments(&self) -> &Attachments {
        &self.attachments
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    /// Records `event_id` on every meeting-date payload.
    ///
    /// Returns false when the message carries no display payload at all.
    pub fn attach_event(&mut self, event_id: EventId) -> bool {
        if self.display.is_empty() {
            return false;
        }
        for display in &mut self.display {
            match display {
                MessageDisplay::PickMeetingDate(payload) => payload.event_id = Some(event_id),
            }
        }
        true
    }

    /// True if every word of `query` occurs in the text, ignoring case.
    pub fn text_matches(&self, query: &str) -> bool {
        let Some(text) = &self.text else {
            return false;
        };
        let text = text.to_lowercase();
        query
            .split_whitespace()
            .all(|word| text.contains(&word.to_lowercase()))
    }

    /// Number of occurrences of the query words in the text.
    pub fn text_relevance(&self, query: &str) -> usize {
        let Some(text) = &self.text else {
            return 0;
        };
        let text = text.to_lowercase();
        query
            .split_whitespace()
            .map(|word| text.matches(&word.to_lowercase()).count())
            .sum()
    }
}

/// A message about to be stored. Storage assigns id and creation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub room_id: RoomId,
    pub user_id: UserId,
    pub text: Option<String>,
    pub display: Vec<MessageDisplay>,
    pub attachments: Attachments,
}

impl NewMessage {
    /// Validates and builds a message.
    ///
    /// Blank text is treated as absent. A message must carry text, a display
    /// payload, or an attachment.
    pub fn new(
        room_id: RoomId,
        user_id: UserId,
        text: Option<String>,
        display: Vec<MessageDisplay>,
        attachments: Attachments,
    ) -> Result<Self, ValidationError> {
        let text = text.filter(|t| !t.trim().is_empty());
        if let Some(t) = &text {
            let len = t.chars().count();
            if len > MAX_TEXT_LENGTH {
                return Err(ValidationError::out_of_range(
                    "text",
                    1,
                    MAX_TEXT_LENGTH as i32,
                    len as i32,
                ));
            }
        }
        if text.is_none() && display.is_empty() && attachments.is_empty() {
            return Err(ValidationError::empty_field("text"));
        }
        Ok(Self {
            room_id,
            user_id,
            text,
            display,
            attachments,
        })
    }

    /// Plain text message.
    pub fn text(room_id: RoomId, user_id: UserId, text: impl Into<String>) -> Result<Self, ValidationError> {
        Self::new(room_id, user_id, Some(text.into()), Vec::new(), Attachments::default())
    }
}
