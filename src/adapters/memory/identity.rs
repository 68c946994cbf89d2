//! In-memory user directory.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use crate::domain::chat::Participant;
use crate::domain::foundation::{DomainError, UserId};
use crate::ports::IdentityProvider;

/// Users keyed by id. New users get the next id after the largest known one.
#[derive(Default)]
pub struct InMemoryIdentityProvider {
    users: Mutex<BTreeMap<UserId, Participant>>,
}

impl InMemoryIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers or replaces a user.
    pub fn insert(&self, participant: Participant) {
        self.users
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(participant.id, participant);
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    async fn resolve_or_create(
        &self,
        email: Option<&str>,
        name: &str,
    ) -> Result<Participant, DomainError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("name", "Name is required"));
        }

        let mut users = self.users.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(email) = email {
            let known = users.values().find(|u| {
                u.email
                    .as_deref()
                    .is_some_and(|e| e.eq_ignore_ascii_case(email))
            });
            if let Some(known) = known {
                return Ok(known.clone());
            }
        }

        let next = users.keys().next_back().map_or(1, |id| id.as_i64() + 1);
        let mut participant = Participant::new(UserId::from_raw(next)).with_name(name);
        if let Some(email) = email {
            participant = participant.with_email(email);
        }
        users.insert(participant.id, participant.clone());
        tracing::debug!(user_id = %participant.id, "Created user");
        Ok(participant)
    }

    async fn find_many(&self, ids: &[UserId]) -> Result<Vec<Participant>, DomainError> {
        let users = self.users.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(ids.iter().filter_map(|id| users.get(id).cloned()).collect())
    }
}
