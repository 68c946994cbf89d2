//! Identity provider port - the Users collaborator as seen by chat.

use async_trait::async_trait;

use crate::domain::chat::Participant;
use crate::domain::foundation::{DomainError, UserId};

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Returns the user with `email`, creating one named `name` if absent.
    ///
    /// Without an email a fresh guest user is created every time.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` for an empty name
    /// - `DatabaseError` on persistence failure
    async fn resolve_or_create(
        &self,
        email: Option<&str>,
        name: &str,
    ) -> Result<Participant, DomainError>;

    /// Looks up users by id. Unknown ids are omitted.
    async fn find_many(&self, ids: &[UserId]) -> Result<Vec<Participant>, DomainError>;

    /// Strips fields other users must not see.
    fn mask(&self, participant: Participant) -> Participant {
        participant.masked()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_provider_is_object_safe() {
        fn _accepts_dyn(_provider: &dyn IdentityProvider) {}
    }
}
