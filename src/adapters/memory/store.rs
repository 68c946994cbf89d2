//! In-memory chat store implementing every storage port.
//!
//! One mutex guards all state, so every operation (match formation
//! included) is serialised. Used by tests and for running without a
//! database.

use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::domain::chat::{
    Membership, Message, MessageDisplay, NewMessage, NewRoom, QueueEntry, Room, RoomOrigin,
};
use crate::domain::foundation::{
    DomainError, ErrorCode, MessageId, Page, PageRequest, RoomId, SortDirection, Timestamp, UserId,
};
use crate::ports::{
    HireRoomCriteria, MessageQuery, MessageRepository, RoomListing, RoomQuery, RoomRepository,
    RoomSortField,
};

#[derive(Default)]
pub(super) struct State {
    next_room_id: i64,
    next_message_id: i64,
    pub(super) next_entry_id: i64,
    rooms: BTreeMap<RoomId, Room>,
    /// Keyed by `(room, user)`; the map key enforces membership uniqueness.
    pub(super) memberships: BTreeMap<(RoomId, UserId), Membership>,
    messages: BTreeMap<MessageId, Message>,
    pub(super) queue: Vec<QueueEntry>,
}

impl State {
    pub(super) fn insert_room(&mut self, new_room: NewRoom) -> Room {
        self.next_room_id += 1;
        let room = Room::reconstitute(
            RoomId::from_raw(self.next_room_id),
            new_room.name,
            new_room.host_id,
            new_room.hire_id,
            new_room.origin,
            Timestamp::now(),
        );
        self.rooms.insert(room.id(), room.clone());
        room
    }

    pub(super) fn upsert_membership(&mut self, user_id: UserId, room_id: RoomId) -> &mut Membership {
        self.memberships
            .entry((room_id, user_id))
            .or_insert_with(|| Membership::new(user_id, room_id))
    }

    fn insert_message(&mut self, new_message: NewMessage) -> Message {
        self.next_message_id += 1;
        let message = Message::reconstitute(
            MessageId::from_raw(self.next_message_id),
            new_message.room_id,
            new_message.user_id,
            new_message.text,
            new_message.display,
            new_message.attachments,
            Timestamp::now(),
        );
        self.messages.insert(message.id(), message.clone());
        message
    }

    fn room_messages(&self, room_id: RoomId) -> impl Iterator<Item = &Message> {
        self.messages.values().filter(move |m| m.room_id() == room_id)
    }

    fn member_ids(&self, room_id: RoomId) -> Vec<UserId> {
        self.memberships
            .range((room_id, UserId::from_raw(i64::MIN))..=(room_id, UserId::from_raw(i64::MAX)))
            .map(|(_, m)| m.user_id())
            .collect()
    }

    /// Messages of the membership's room after its read cursor, by `(created_at, id)`.
    fn unread_in(&self, membership: &Membership) -> u64 {
        let cursor = membership
            .last_read_message_id()
            .and_then(|id| self.messages.get(&id))
            .map(|m| (*m.created_at(), m.id()));
        self.room_messages(membership.room_id())
            .filter(|m| match cursor {
                None => true,
                Some(cursor) => (*m.created_at(), m.id()) > cursor,
            })
            .count() as u64
    }

    fn last_message_at(&self, room_id: RoomId) -> Option<Timestamp> {
        self.room_messages(room_id).map(|m| *m.created_at()).max()
    }
}

/// Shared in-memory store.
pub struct InMemoryChatStore {
    state: Mutex<State>,
}

impl InMemoryChatStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
        }
    }

    pub(super) fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for InMemoryChatStore {
    fn default() -> Self {
        Self::new()
    }
}

fn membership_not_found(user_id: UserId, room_id: RoomId) -> DomainError {
    DomainError::new(ErrorCode::MembershipNotFound, "Membership not found")
        .with_detail("user_id", user_id.to_string())
        .with_detail("room_id", room_id.to_string())
}

fn directed(ordering: Ordering, direction: SortDirection) -> Ordering {
    match direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}

#[async_trait]
impl RoomRepository for InMemoryChatStore {
    async fn create_with_opening_message(
        &self,
        room: NewRoom,
        members: &[UserId],
        author: UserId,
        text: String,
    ) -> Result<(Room, Message), DomainError> {
        let mut state = self.state();
        // Validate before mutating so nothing is left behind on failure.
        let placeholder = RoomId::from_raw(state.next_room_id + 1);
        let opening = NewMessage::text(placeholder, author, text)?;

        let room = state.insert_room(room);
        for user_id in members {
            state.upsert_membership(*user_id, room.id());
        }
        let message = state.insert_message(NewMessage {
            room_id: room.id(),
            ..opening
        });
        Ok((room, message))
    }

    async fn find_or_create_hire_room(
        &self,
        room: NewRoom,
        criteria: &HireRoomCriteria,
    ) -> Result<(Room, bool), DomainError> {
        let mut state = self.state();
        let existing = state.rooms.values().find(|r| {
            r.origin() == RoomOrigin::Hire
                && r.host_id() == Some(criteria.host_id)
                && r.hire_id() == criteria.hire_id
                && r.name() == criteria.name.as_deref()
        });
        if let Some(existing) = existing {
            return Ok((existing.clone(), false));
        }
        Ok((state.insert_room(room), true))
    }

    async fn find_by_id(&self, id: RoomId) -> Result<Option<Room>, DomainError> {
        Ok(self.state().rooms.get(&id).cloned())
    }

    async fn add_member(&self, user_id: UserId, room_id: RoomId) -> Result<(), DomainError> {
        let mut state = self.state();
        if !state.rooms.contains_key(&room_id) {
            return Err(DomainError::new(ErrorCode::RoomNotFound, "Room not found"));
        }
        state.upsert_membership(user_id, room_id);
        Ok(())
    }

    async fn find_membership(
        &self,
        user_id: UserId,
        room_id: RoomId,
    ) -> Result<Option<Membership>, DomainError> {
        Ok(self.state().memberships.get(&(room_id, user_id)).cloned())
    }

    async fn memberships_of_room(&self, room_id: RoomId) -> Result<Vec<Membership>, DomainError> {
        Ok(self
            .state()
            .memberships
            .values()
            .filter(|m| m.room_id() == room_id)
            .cloned()
            .collect())
    }

    async fn advance_read_cursor(
        &self,
        user_id: UserId,
        room_id: RoomId,
        message_id: MessageId,
    ) -> Result<bool, DomainError> {
        let mut state = self.state();
        let membership = state
            .memberships
            .get_mut(&(room_id, user_id))
            .ok_or_else(|| membership_not_found(user_id, room_id))?;
        Ok(membership.advance_read_cursor(message_id))
    }

    async fn list_for_member(
        &self,
        user_id: UserId,
        query: &RoomQuery,
        page: PageRequest,
    ) -> Result<Page<RoomListing>, DomainError> {
        let state = self.state();
        let mut listings: Vec<RoomListing> = state
            .memberships
            .values()
            .filter(|m| m.user_id() == user_id)
            .filter_map(|m| {
                let room = state.rooms.get(&m.room_id())?;
                if let Some(text) = &query.text {
                    if !room.name_matches(text) {
                        return None;
                    }
                }
                if let Some(hire_ids) = &query.hire_ids {
                    if !room.hire_id().is_some_and(|h| hire_ids.contains(&h)) {
                        return None;
                    }
                }
                let member_ids = state.member_ids(room.id());
                if let Some(companion) = query.companion_id {
                    if companion == user_id || !member_ids.contains(&companion) {
                        return None;
                    }
                }
                Some(RoomListing {
                    room: room.clone(),
                    unread_messages_count: state.unread_in(m),
                    last_message_timestamp: state.last_message_at(room.id()),
                    member_ids,
                })
            })
            .collect();

        let direction = query.sort.direction;
        match query.sort.field {
            RoomSortField::LastMessageAt => listings.sort_by(|a, b| {
                match (&a.last_message_timestamp, &b.last_message_timestamp) {
                    (Some(x), Some(y)) => directed(x.cmp(y), direction),
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => Ordering::Equal,
                }
                .then_with(|| directed(a.room.id().cmp(&b.room.id()), direction))
            }),
            RoomSortField::CreatedAt => listings.sort_by(|a, b| {
                directed(
                    a.room
                        .created_at()
                        .cmp(b.room.created_at())
                        .then_with(|| a.room.id().cmp(&b.room.id())),
                    direction,
                )
            }),
        }

        Ok(Page::from_all(listings, page))
    }
}

#[async_trait]
impl MessageRepository for InMemoryChatStore {
    async fn append(&self, message: NewMessage) -> Result<Message, DomainError> {
        let mut state = self.state();
        if !state.rooms.contains_key(&message.room_id) {
            return Err(DomainError::new(ErrorCode::RoomNotFound, "Room not found"));
        }
        Ok(state.insert_message(message))
    }

    async fn find_by_id(&self, id: MessageId) -> Result<Option<Message>, DomainError> {
        Ok(self.state().messages.get(&id).cloned())
    }

    async fn update_display(
        &self,
        id: MessageId,
        display: &[MessageDisplay],
    ) -> Result<(), DomainError> {
        let mut state = self.state();
        let message = state
            .messages
            .get_mut(&id)
            .ok_or_else(|| DomainError::new(ErrorCode::MessageNotFound, "Message not found"))?;
        *message = Message::reconstitute(
            message.id(),
            message.room_id(),
            message.user_id(),
            message.text().map(String::from),
            display.to_vec(),
            message.attachments().clone(),
            *message.created_at(),
        );
        Ok(())
    }

    async fn list_for_room(
        &self,
        room_id: RoomId,
        query: &MessageQuery,
        page: PageRequest,
    ) -> Result<Page<Message>, DomainError> {
        let state = self.state();
        let mut found: Vec<(usize, Message)> = state
            .room_messages(room_id)
            .filter(|m| query.author_id.map_or(true, |a| m.user_id() == a))
            .filter(|m| query.text.as_deref().map_or(true, |t| m.text_matches(t)))
            .map(|m| {
                let relevance = query.text.as_deref().map_or(0, |t| m.text_relevance(t));
                (relevance, m.clone())
            })
            .collect();

        found.sort_by(|(ra, a), (rb, b)| {
            directed(a.created_at().cmp(b.created_at()), query.direction)
                .then_with(|| rb.cmp(ra))
                .then_with(|| directed(a.id().cmp(&b.id()), query.direction))
        });

        let messages = found.into_iter().map(|(_, m)| m).collect();
        Ok(Page::from_all(messages, page))
    }

    async fn history(&self, room_id: RoomId) -> Result<Vec<Message>, DomainError> {
        let state = self.state();
        let mut messages: Vec<Message> = state.room_messages(room_id).cloned().collect();
        messages.sort_by(|a, b| (a.created_at(), a.id()).cmp(&(b.created_at(), b.id())));
        Ok(messages)
    }

    async fn unread_count(&self, user_id: UserId) -> Result<u64, DomainError> {
        let state = self.state();
        Ok(state
            .memberships
            .values()
            .filter(|m| m.user_id() == user_id)
            .map(|m| state.unread_in(m))
            .sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> [UserId; 2] {
        [UserId::from_raw(1), UserId::from_raw(2)]
    }

    #[tokio::test]
    async fn opening_message_validation_leaves_nothing_behind() {
        let store = InMemoryChatStore::new();
        let [a, b] = pair();

        let result = store
            .create_with_opening_message(NewRoom::direct(a), &[a, b], a, "   ".into())
            .await;

        assert!(result.is_err());
        assert!(store.state().rooms.is_empty());
        assert!(store.state().memberships.is_empty());
    }

    #[tokio::test]
    async fn add_member_is_idempotent() {
        let store = InMemoryChatStore::new();
        let [a, b] = pair();
        let (room, _) = store
            .create_with_opening_message(NewRoom::direct(a), &[a, b], a, "hi".into())
            .await
            .unwrap();
        store.advance_read_cursor(b, room.id(), MessageId::from_raw(1)).await.unwrap();

        store.add_member(b, room.id()).await.unwrap();
        store.add_member(b, room.id()).await.unwrap();

        let members = store.memberships_of_room(room.id()).await.unwrap();
        assert_eq!(members.len(), 2);
        let kept = store.find_membership(b, room.id()).await.unwrap().unwrap();
        assert_eq!(kept.last_read_message_id(), Some(MessageId::from_raw(1)));
    }

    #[tokio::test]
    async fn add_member_to_missing_room_fails() {
        let store = InMemoryChatStore::new();
        let err = store
            .add_member(UserId::from_raw(1), RoomId::from_raw(5))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::RoomNotFound);
    }

    #[tokio::test]
    async fn rooms_without_messages_sort_last_either_direction() {
        let store = InMemoryChatStore::new();
        let [a, b] = pair();
        let criteria = HireRoomCriteria {
            host_id: a,
            hire_id: None,
            name: Some("Quiet".into()),
        };
        let quiet = NewRoom::hire(Some("Quiet".into()), a, None).unwrap();
        let (quiet, _) = store.find_or_create_hire_room(quiet, &criteria).await.unwrap();
        store.add_member(a, quiet.id()).await.unwrap();
        let (busy, _) = store
            .create_with_opening_message(NewRoom::direct(a), &[a, b], a, "hi".into())
            .await
            .unwrap();

        for direction in [SortDirection::Asc, SortDirection::Desc] {
            let query = RoomQuery {
                sort: crate::ports::RoomSort {
                    field: RoomSortField::LastMessageAt,
                    direction,
                },
                ..RoomQuery::default()
            };
            let page = store
                .list_for_member(a, &query, PageRequest::default())
                .await
                .unwrap();
            let ids: Vec<RoomId> = page.items.iter().map(|l| l.room.id()).collect();
            assert_eq!(ids, vec![busy.id(), quiet.id()]);
        }
    }

    #[tokio::test]
    async fn cursor_on_deleted_message_counts_everything() {
        let store = InMemoryChatStore::new();
        let [a, b] = pair();
        let (room, _) = store
            .create_with_opening_message(NewRoom::direct(a), &[a, b], a, "hi".into())
            .await
            .unwrap();
        // A cursor pointing at an id the store never issued.
        store
            .advance_read_cursor(b, room.id(), MessageId::from_raw(50))
            .await
            .unwrap();

        assert_eq!(store.unread_count(b).await.unwrap(), 1);
    }
}
