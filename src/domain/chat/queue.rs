//! Matching queue: waiting entries and FIFO group selection.
//!
//! Entries wait per target group size ("bucket"). A match claims the oldest
//! `target` entries of a bucket, and only when the bucket holds at least that
//! many. Selection here is pure; the `MatchQueue` port runs it inside
//! whatever serialisation the store provides.

use crate::domain::foundation::{
    ConnectionId, QueueEntryId, RoomId, Timestamp, UserId, ValidationError,
};
use serde::{Deserialize, Serialize};

use super::room::MAX_ROOM_NAME_LENGTH;

/// Requested room size, validated against configured bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupSize(u32);

impl GroupSize {
    pub fn new(value: u32, min: u32, max: u32) -> Result<Self, ValidationError> {
        if value < min || value > max {
            return Err(ValidationError::out_of_range(
                "participants",
                min as i32,
                max as i32,
                value as i32,
            ));
        }
        Ok(Self(value))
    }

    /// Wraps a value read back from storage.
    pub fn from_raw(value: u32) -> Self {
        Self(value)
    }

    pub fn get(&self) -> u32 {
        self.0
    }

    pub fn as_usize(&self) -> usize {
        self.0 as usize
    }
}

/// A request to wait for a room of `participants` members.
///
/// Identity is already resolved, so a stored entry always belongs to a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinRequest {
    pub user_id: UserId,
    pub name: String,
    pub participants: GroupSize,
    pub connection_id: Option<ConnectionId>,
}

impl JoinRequest {
    pub fn new(
        user_id: UserId,
        name: impl Into<String>,
        participants: GroupSize,
        connection_id: Option<ConnectionId>,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::empty_field("name"));
        }
        Ok(Self {
            user_id,
            name: name.to_string(),
            participants,
            connection_id,
        })
    }
}

/// A stored waiting entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueEntry {
    pub id: QueueEntryId,
    pub user_id: UserId,
    pub name: String,
    pub participants: GroupSize,
    pub connection_id: Option<ConnectionId>,
    pub enqueued_at: Timestamp,
}

/// One member of a freshly formed room, with the connection to notify.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedMember {
    pub user_id: UserId,
    pub connection_id: Option<ConnectionId>,
}

/// Outcome of an enqueue that completed a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormedMatch {
    pub room_id: RoomId,
    pub members: Vec<MatchedMember>,
}

impl FormedMatch {
    pub fn user_ids(&self) -> Vec<UserId> {
        self.members.iter().map(|m| m.user_id).collect()
    }

    pub fn connection_ids(&self) -> impl Iterator<Item = &ConnectionId> {
        self.members.iter().filter_map(|m| m.connection_id.as_ref())
    }
}

/// Picks the oldest `target` entries waiting for `target`-sized rooms.
///
/// Entries of other buckets are ignored. Order is `(enqueued_at, id)`.
/// Returns `None` while the bucket is short.
pub fn select_match(entries: &[QueueEntry], target: GroupSize) -> Option<Vec<QueueEntry>> {
    let mut bucket: Vec<&QueueEntry> = entries
        .iter()
        .filter(|e| e.participants == target)
        .collect();
    if bucket.len() < target.as_usize() {
        return None;
    }
    bucket.sort_by(|a, b| {
        a.enqueued_at
            .cmp(&b.enqueued_at)
            .then_with(|| a.id.cmp(&b.id))
    });
    Some(
        bucket
            .into_iter()
            .take(target.as_usize())
            .cloned()
            .collect(),
    )
}

/// Derives a room name from the names of the matched entries, cut to the
/// maximum room name length.
pub fn matched_room_name(entries: &[QueueEntry]) -> Option<String> {
    let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
    if names.is_empty() {
        return None;
    }
    Some(names.join(", ").chars().take(MAX_ROOM_NAME_LENGTH).collect())
}
