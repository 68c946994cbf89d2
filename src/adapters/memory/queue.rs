//! `MatchQueue` over the in-memory store.
//!
//! Enqueue, selection and room formation all happen under the store's
//! single lock, so two concurrent joins can never claim the same entry.

use async_trait::async_trait;

use super::InMemoryChatStore;
use crate::domain::chat::{
    matched_room_name, select_match, FormedMatch, GroupSize, JoinRequest, MatchedMember, NewRoom,
    QueueEntry,
};
use crate::domain::foundation::{ConnectionId, DomainError, QueueEntryId, Timestamp};
use crate::ports::MatchQueue;

#[async_trait]
impl MatchQueue for InMemoryChatStore {
    async fn enqueue_and_match(
        &self,
        request: JoinRequest,
    ) -> Result<Option<FormedMatch>, DomainError> {
        let mut state = self.state();

        let existing = state
            .queue
            .iter()
            .position(|e| e.user_id == request.user_id && e.participants == request.participants);
        if let Some(index) = existing {
            let entry = &mut state.queue[index];
            entry.connection_id = request.connection_id;
            entry.name = request.name;
        } else {
            state.next_entry_id += 1;
            let entry = QueueEntry {
                id: QueueEntryId::from_raw(state.next_entry_id),
                user_id: request.user_id,
                name: request.name,
                participants: request.participants,
                connection_id: request.connection_id,
                enqueued_at: Timestamp::now(),
            };
            state.queue.push(entry);
        }

        let Some(claimed) = select_match(&state.queue, request.participants) else {
            return Ok(None);
        };

        let room = state.insert_room(NewRoom::matched(matched_room_name(&claimed))?);
        let mut members = Vec::with_capacity(claimed.len());
        for entry in &claimed {
            let membership = state.upsert_membership(entry.user_id, room.id());
            if let Some(connection_id) = &entry.connection_id {
                membership.bind(connection_id.clone());
            }
            members.push(MatchedMember {
                user_id: entry.user_id,
                connection_id: entry.connection_id.clone(),
            });
        }
        state
            .queue
            .retain(|e| !claimed.iter().any(|c| c.id == e.id));

        Ok(Some(FormedMatch {
            room_id: room.id(),
            members,
        }))
    }

    async fn dequeue_connection(&self, connection_id: &ConnectionId) -> Result<u64, DomainError> {
        let mut state = self.state();
        let before = state.queue.len();
        state
            .queue
            .retain(|e| e.connection_id.as_ref() != Some(connection_id));
        Ok((before - state.queue.len()) as u64)
    }

    async fn waiting(&self, participants: GroupSize) -> Result<Vec<QueueEntry>, DomainError> {
        let mut entries: Vec<QueueEntry> = self
            .state()
            .queue
            .iter()
            .filter(|e| e.participants == participants)
            .cloned()
            .collect();
        entries.sort_by(|a, b| (a.enqueued_at, a.id).cmp(&(b.enqueued_at, b.id)));
        Ok(entries)
    }
}
