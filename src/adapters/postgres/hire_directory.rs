//! PostgreSQL implementation of HireDirectory.

use async_trait::async_trait;
use sqlx::PgPool;

use super::errors::db_error;
use crate::domain::foundation::{DomainError, HireId, VacancyId};
use crate::ports::HireDirectory;

#[derive(Clone)]
pub struct PostgresHireDirectory {
    pool: PgPool,
}

impl PostgresHireDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HireDirectory for PostgresHireDirectory {
    async fn hires_for_vacancy(&self, vacancy_id: VacancyId) -> Result<Vec<HireId>, DomainError> {
        let ids: Vec<i64> = sqlx::query_scalar("SELECT id FROM hires WHERE vacancy_id = $1 ORDER BY id")
            .bind(vacancy_id.as_i64())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("Failed to load vacancy hires", e))?;

        Ok(ids.into_iter().map(HireId::from_raw).collect())
    }
}
