//! PostgreSQL implementation of IdentityProvider over the `users` table.

use async_trait::async_trait;
use sqlx::PgPool;

use super::errors::db_error;
use super::rows::{UserRow, USER_COLUMNS};
use crate::domain::chat::Participant;
use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::ports::IdentityProvider;

/// PostgreSQL implementation of the IdentityProvider port.
#[derive(Clone)]
pub struct PostgresIdentityProvider {
    pool: PgPool,
}

impl PostgresIdentityProvider {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Participant>, DomainError> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "SELECT {} FROM users WHERE lower(email) = lower($1)",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find user by email", e))?;

        Ok(row.map(Participant::from))
    }

    async fn insert(&self, email: Option<&str>, name: &str) -> Result<Participant, DomainError> {
        let row: UserRow = sqlx::query_as(&format!(
            "INSERT INTO users (email, first_name) VALUES ($1, $2) RETURNING {}",
            USER_COLUMNS
        ))
        .bind(email)
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Failed to create user", e))?;

        Ok(Participant::from(row))
    }
}

#[async_trait]
impl IdentityProvider for PostgresIdentityProvider {
    async fn resolve_or_create(
        &self,
        email: Option<&str>,
        name: &str,
    ) -> Result<Participant, DomainError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("name", "Name is required"));
        }

        let Some(email) = email else {
            return self.insert(None, name).await;
        };

        if let Some(found) = self.find_by_email(email).await? {
            return Ok(found);
        }

        match self.insert(Some(email), name).await {
            Ok(created) => {
                tracing::debug!(user_id = %created.id, "Created user");
                Ok(created)
            }
            // Lost a race with another join for the same email.
            Err(err) if err.code == ErrorCode::Conflict => {
                self.find_by_email(email).await?.ok_or(err)
            }
            Err(err) => Err(err),
        }
    }

    async fn find_many(&self, ids: &[UserId]) -> Result<Vec<Participant>, DomainError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<i64> = ids.iter().map(|id| id.as_i64()).collect();
        let rows: Vec<UserRow> = sqlx::query_as(&format!(
            "SELECT {} FROM users WHERE id = ANY($1) ORDER BY id",
            USER_COLUMNS
        ))
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to load users", e))?;

        Ok(rows.into_iter().map(Participant::from).collect())
    }
}
