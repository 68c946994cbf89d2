//! PostgreSQL implementation of MatchQueue.
//!
//! Each enqueue runs in one transaction holding a transaction-scoped
//! advisory lock keyed by the target size. Joins for the same bucket are
//! therefore serialised, while different buckets proceed in parallel.

use async_trait::async_trait;
use sqlx::PgPool;

use super::errors::db_error;
use super::rows::{origin_to_str, QueueEntryRow, RoomRow, QUEUE_COLUMNS, ROOM_COLUMNS};
use crate::domain::chat::{
    matched_room_name, select_match, FormedMatch, GroupSize, JoinRequest, MatchedMember, NewRoom,
    QueueEntry, Room,
};
use crate::domain::foundation::{ConnectionId, DomainError};
use crate::ports::MatchQueue;

/// First key of the two-key advisory lock; the bucket size is the second.
const MATCH_LOCK_NAMESPACE: i32 = 0x4d51;

/// PostgreSQL implementation of the MatchQueue port.
#[derive(Clone)]
pub struct PostgresMatchQueue {
    pool: PgPool,
}

impl PostgresMatchQueue {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn bucket_key(participants: GroupSize) -> i32 {
    i32::try_from(participants.get()).unwrap_or(i32::MAX)
}

#[async_trait]
impl MatchQueue for PostgresMatchQueue {
    async fn enqueue_and_match(
        &self,
        request: JoinRequest,
    ) -> Result<Option<FormedMatch>, DomainError> {
        let bucket = bucket_key(request.participants);
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        sqlx::query("SELECT pg_advisory_xact_lock($1, $2)")
            .bind(MATCH_LOCK_NAMESPACE)
            .bind(bucket)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to lock match bucket", e))?;

        // Re-joining keeps the original enqueued_at and therefore the FIFO slot.
        sqlx::query(
            r#"
            INSERT INTO queue_entries (user_id, name, participants, connection_id)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, participants)
            DO UPDATE SET connection_id = EXCLUDED.connection_id, name = EXCLUDED.name
            "#,
        )
        .bind(request.user_id.as_i64())
        .bind(&request.name)
        .bind(bucket)
        .bind(request.connection_id.as_ref().map(|c| c.as_str()))
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to enqueue", e))?;

        let rows: Vec<QueueEntryRow> = sqlx::query_as(&format!(
            r#"
            SELECT {}
            FROM queue_entries
            WHERE participants = $1
            ORDER BY enqueued_at, id
            LIMIT $1
            "#,
            QUEUE_COLUMNS
        ))
        .bind(bucket)
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to read match bucket", e))?;
        let waiting = rows
            .into_iter()
            .map(QueueEntry::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let Some(claimed) = select_match(&waiting, request.participants) else {
            tx.commit()
                .await
                .map_err(|e| db_error("Failed to commit enqueue", e))?;
            return Ok(None);
        };

        let new_room = NewRoom::matched(matched_room_name(&claimed))?;
        let row: RoomRow = sqlx::query_as(&format!(
            "INSERT INTO rooms (name, origin) VALUES ($1, $2) RETURNING {}",
            ROOM_COLUMNS
        ))
        .bind(&new_room.name)
        .bind(origin_to_str(new_room.origin))
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to create matched room", e))?;
        let room = Room::try_from(row)?;

        let mut members = Vec::with_capacity(claimed.len());
        for entry in &claimed {
            sqlx::query(
                r#"
                INSERT INTO user_rooms (user_id, room_id, connection_id) VALUES ($1, $2, $3)
                ON CONFLICT (user_id, room_id) DO UPDATE SET connection_id = EXCLUDED.connection_id
                "#,
            )
            .bind(entry.user_id.as_i64())
            .bind(room.id().as_i64())
            .bind(entry.connection_id.as_ref().map(|c| c.as_str()))
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to add matched member", e))?;

            members.push(MatchedMember {
                user_id: entry.user_id,
                connection_id: entry.connection_id.clone(),
            });
        }

        let claimed_ids: Vec<i64> = claimed.iter().map(|e| e.id.as_i64()).collect();
        sqlx::query("DELETE FROM queue_entries WHERE id = ANY($1)")
            .bind(&claimed_ids)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to remove matched entries", e))?;

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit match", e))?;

        tracing::info!(
            room_id = %room.id(),
            participants = request.participants.get(),
            "Match formed"
        );

        Ok(Some(FormedMatch {
            room_id: room.id(),
            members,
        }))
    }

    async fn dequeue_connection(&self, connection_id: &ConnectionId) -> Result<u64, DomainError> {
        let result = sqlx::query("DELETE FROM queue_entries WHERE connection_id = $1")
            .bind(connection_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to dequeue connection", e))?;

        Ok(result.rows_affected())
    }

    async fn waiting(&self, participants: GroupSize) -> Result<Vec<QueueEntry>, DomainError> {
        let rows: Vec<QueueEntryRow> = sqlx::query_as(&format!(
            "SELECT {} FROM queue_entries WHERE participants = $1 ORDER BY enqueued_at, id",
            QUEUE_COLUMNS
        ))
        .bind(bucket_key(participants))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list waiting entries", e))?;

        rows.into_iter().map(QueueEntry::try_from).collect()
    }
}
