//! PostgreSQL implementation of ConnectionRegistry.
//!
//! The live connection id is a column on `user_rooms`, so bindings survive
//! a process restart until the next unbind.

use async_trait::async_trait;
use sqlx::PgPool;

use super::errors::db_error;
use crate::domain::foundation::{ConnectionId, DomainError, ErrorCode, RoomId, UserId};
use crate::ports::{ConnectionRegistry, LiveMember};

/// PostgreSQL implementation of the ConnectionRegistry port.
#[derive(Clone)]
pub struct PostgresConnectionRegistry {
    pool: PgPool,
}

impl PostgresConnectionRegistry {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn stored_connection(value: String) -> Result<ConnectionId, DomainError> {
    ConnectionId::new(value).map_err(|e| {
        DomainError::new(ErrorCode::DatabaseError, format!("Invalid connection_id: {}", e))
    })
}

#[async_trait]
impl ConnectionRegistry for PostgresConnectionRegistry {
    async fn bind_all_memberships(
        &self,
        user_id: UserId,
        connection_id: &ConnectionId,
    ) -> Result<Vec<RoomId>, DomainError> {
        let rooms: Vec<i64> = sqlx::query_scalar(
            "UPDATE user_rooms SET connection_id = $2 WHERE user_id = $1 RETURNING room_id",
        )
        .bind(user_id.as_i64())
        .bind(connection_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to bind connection", e))?;

        Ok(rooms.into_iter().map(RoomId::from_raw).collect())
    }

    async fn bind_membership(
        &self,
        user_id: UserId,
        room_id: RoomId,
        connection_id: &ConnectionId,
    ) -> Result<(), DomainError> {
        let result = sqlx::query(
            "UPDATE user_rooms SET connection_id = $3 WHERE user_id = $1 AND room_id = $2",
        )
        .bind(user_id.as_i64())
        .bind(room_id.as_i64())
        .bind(connection_id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to bind membership", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::MembershipNotFound,
                "Membership not found",
            ));
        }
        Ok(())
    }

    async fn unbind_connection(&self, connection_id: &ConnectionId) -> Result<u64, DomainError> {
        let result =
            sqlx::query("UPDATE user_rooms SET connection_id = NULL WHERE connection_id = $1")
                .bind(connection_id.as_str())
                .execute(&self.pool)
                .await
                .map_err(|e| db_error("Failed to unbind connection", e))?;

        Ok(result.rows_affected())
    }

    async fn connection_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Option<ConnectionId>, DomainError> {
        let found: Option<String> = sqlx::query_scalar(
            r#"
            SELECT connection_id FROM user_rooms
            WHERE user_id = $1 AND connection_id IS NOT NULL
            LIMIT 1
            "#,
        )
        .bind(user_id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find user connection", e))?;

        found.map(stored_connection).transpose()
    }

    async fn live_connections_for_room(
        &self,
        room_id: RoomId,
    ) -> Result<Vec<ConnectionId>, DomainError> {
        Ok(self
            .live_members_for_room(room_id)
            .await?
            .into_iter()
            .map(|m| m.connection_id)
            .collect())
    }

    async fn live_members_for_room(&self, room_id: RoomId) -> Result<Vec<LiveMember>, DomainError> {
        let rows: Vec<(i64, String)> = sqlx::query_as(
            r#"
            SELECT user_id, connection_id FROM user_rooms
            WHERE room_id = $1 AND connection_id IS NOT NULL
            ORDER BY user_id
            "#,
        )
        .bind(room_id.as_i64())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list live members", e))?;

        rows.into_iter()
            .map(|(user_id, connection_id)| {
                Ok(LiveMember {
                    user_id: UserId::from_raw(user_id),
                    connection_id: stored_connection(connection_id)?,
                })
            })
            .collect()
    }
}
