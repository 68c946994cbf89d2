//! Hire directory port - read-only view of the hiring collaborator.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, HireId, VacancyId};

#[async_trait]
pub trait HireDirectory: Send + Sync {
    /// Hires opened for a vacancy. Empty for an unknown vacancy.
    async fn hires_for_vacancy(&self, vacancy_id: VacancyId) -> Result<Vec<HireId>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hire_directory_is_object_safe() {
        fn _accepts_dyn(_directory: &dyn HireDirectory) {}
    }
}
