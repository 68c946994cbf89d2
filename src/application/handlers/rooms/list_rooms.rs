//! ListRoomsHandler - the caller's rooms with unread counts and companions.

use std::collections::HashMap;
use std::sync::Arc;

use crate::application::ChatPolicy;
use crate::domain::chat::{ChatError, Participant, RoomSummary};
use crate::domain::foundation::{HireId, Page, UserId, VacancyId};
use crate::ports::{HireDirectory, IdentityProvider, RoomQuery, RoomRepository, RoomSort};

#[derive(Debug, Clone, Default)]
pub struct ListRoomsQuery {
    pub user_id: Option<UserId>,
    pub text: Option<String>,
    pub hire_id: Option<HireId>,
    pub vacancy_id: Option<VacancyId>,
    pub companion_id: Option<UserId>,
    pub sort: RoomSort,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

pub struct ListRoomsHandler {
    rooms: Arc<dyn RoomRepository>,
    identities: Arc<dyn IdentityProvider>,
    hires: Arc<dyn HireDirectory>,
    policy: ChatPolicy,
}

impl ListRoomsHandler {
    pub fn new(
        rooms: Arc<dyn RoomRepository>,
        identities: Arc<dyn IdentityProvider>,
        hires: Arc<dyn HireDirectory>,
        policy: ChatPolicy,
    ) -> Self {
        Self {
            rooms,
            identities,
            hires,
            policy,
        }
    }

    pub async fn handle(&self, query: ListRoomsQuery) -> Result<Page<RoomSummary>, ChatError> {
        let user_id = query.user_id.ok_or(ChatError::Unauthenticated)?;
        let page = self.policy.page(query.page, query.page_size)?;

        let hire_ids = self.hire_filter(query.hire_id, query.vacancy_id).await?;
        let room_query = RoomQuery {
            text: query.text.filter(|t| !t.trim().is_empty()),
            hire_ids,
            companion_id: query.companion_id,
            sort: query.sort,
        };

        let listings = self.rooms.list_for_member(user_id, &room_query, page).await?;

        let mut companion_ids: Vec<UserId> = listings
            .items
            .iter()
            .flat_map(|l| l.member_ids.iter().copied())
            .filter(|id| *id != user_id)
            .collect();
        companion_ids.sort();
        companion_ids.dedup();

        let profiles: HashMap<UserId, Participant> = self
            .identities
            .find_many(&companion_ids)
            .await?
            .into_iter()
            .map(|p| (p.id, self.identities.mask(p)))
            .collect();

        Ok(listings.map(|listing| {
            let companions = listing
                .member_ids
                .iter()
                .filter(|id| **id != user_id)
                .map(|id| {
                    profiles
                        .get(id)
                        .cloned()
                        .unwrap_or_else(|| Participant::new(*id))
                })
                .collect();
            RoomSummary {
                room: listing.room,
                unread_messages_count: listing.unread_messages_count,
                last_message_timestamp: listing.last_message_timestamp,
                companions,
            }
        }))
    }

    /// Combines an explicit hire with the hires of a vacancy. Both given
    /// means the hire must belong to the vacancy.
    async fn hire_filter(
        &self,
        hire_id: Option<HireId>,
        vacancy_id: Option<VacancyId>,
    ) -> Result<Option<Vec<HireId>>, ChatError> {
        let Some(vacancy_id) = vacancy_id else {
            return Ok(hire_id.map(|h| vec![h]));
        };
        let mut hires = self.hires.hires_for_vacancy(vacancy_id).await?;
        if let Some(hire_id) = hire_id {
            hires.retain(|h| *h == hire_id);
        }
        Ok(Some(hires))
    }
}
