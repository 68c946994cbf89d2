//! In-memory hire directory.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::domain::foundation::{DomainError, HireId, VacancyId};
use crate::ports::HireDirectory;

#[derive(Default)]
pub struct InMemoryHireDirectory {
    hires: Mutex<HashMap<VacancyId, Vec<HireId>>>,
}

impl InMemoryHireDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, vacancy_id: VacancyId, hire_id: HireId) {
        self.hires
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(vacancy_id)
            .or_default()
            .push(hire_id);
    }
}

#[async_trait]
impl HireDirectory for InMemoryHireDirectory {
    async fn hires_for_vacancy(&self, vacancy_id: VacancyId) -> Result<Vec<HireId>, DomainError> {
        Ok(self
            .hires
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&vacancy_id)
            .cloned()
            .unwrap_or_default())
    }
}
