//! PostgreSQL implementation of RoomRepository.
//!
//! Rooms live in `rooms`, memberships in `user_rooms`. Listing computes the
//! unread count and last message time per room in a single query.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::errors::{db_error, is_missing_reference};
use super::rows::{
    contains_pattern, origin_to_str, MembershipRow, MessageRow, RoomRow, MEMBERSHIP_COLUMNS,
    MESSAGE_COLUMNS, ROOM_COLUMNS,
};
use crate::domain::chat::{Membership, Message, NewMessage, NewRoom, Room, RoomOrigin};
use crate::domain::foundation::{
    DomainError, ErrorCode, MessageId, Page, PageRequest, RoomId, Timestamp, UserId,
};
use crate::ports::{HireRoomCriteria, RoomListing, RoomQuery, RoomRepository, RoomSortField};

/// PostgreSQL implementation of the RoomRepository port.
#[derive(Clone)]
pub struct PostgresRoomRepository {
    pool: PgPool,
}

impl PostgresRoomRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct RoomListingRow {
    #[sqlx(flatten)]
    room: RoomRow,
    unread_messages_count: i64,
    last_message_at: Option<DateTime<Utc>>,
    member_ids: Vec<i64>,
}

impl TryFrom<RoomListingRow> for RoomListing {
    type Error = DomainError;

    fn try_from(row: RoomListingRow) -> Result<Self, Self::Error> {
        Ok(RoomListing {
            room: Room::try_from(row.room)?,
            unread_messages_count: row.unread_messages_count.max(0) as u64,
            last_message_timestamp: row.last_message_at.map(Timestamp::from_datetime),
            member_ids: row.member_ids.into_iter().map(UserId::from_raw).collect(),
        })
    }
}

/// Appends the `FROM`/`WHERE` shared by the listing and its count.
fn push_listing_filters(builder: &mut QueryBuilder<'_, Postgres>, user_id: UserId, query: &RoomQuery) {
    builder.push(
        r#"
        FROM user_rooms ur
        JOIN rooms r ON r.id = ur.room_id
        WHERE ur.user_id = "#,
    );
    builder.push_bind(user_id.as_i64());

    if let Some(text) = &query.text {
        for word in text.split_whitespace() {
            builder.push(" AND r.name ILIKE ");
            builder.push_bind(contains_pattern(word));
        }
    }

    if let Some(hire_ids) = &query.hire_ids {
        let ids: Vec<i64> = hire_ids.iter().map(|h| h.as_i64()).collect();
        builder.push(" AND r.hire_id = ANY(");
        builder.push_bind(ids);
        builder.push(")");
    }

    if let Some(companion) = query.companion_id {
        builder.push(
            " AND EXISTS (SELECT 1 FROM user_rooms c WHERE c.room_id = r.id AND c.user_id = ",
        );
        builder.push_bind(companion.as_i64());
        builder.push(" AND c.user_id <> ");
        builder.push_bind(user_id.as_i64());
        builder.push(")");
    }
}

#[async_trait]
impl RoomRepository for PostgresRoomRepository {
    async fn create_with_opening_message(
        &self,
        room: NewRoom,
        members: &[UserId],
        author: UserId,
        text: String,
    ) -> Result<(Room, Message), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        let row: RoomRow = sqlx::query_as(&format!(
            "INSERT INTO rooms (name, host_id, hire_id, origin) VALUES ($1, $2, $3, $4) RETURNING {}",
            ROOM_COLUMNS
        ))
        .bind(&room.name)
        .bind(room.host_id.map(|u| u.as_i64()))
        .bind(room.hire_id.map(|h| h.as_i64()))
        .bind(origin_to_str(room.origin))
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to create room", e))?;
        let room = Room::try_from(row)?;

        // Dropping the transaction on error rolls the room back.
        let opening = NewMessage::text(room.id(), author, text)?;

        let member_ids: Vec<i64> = members.iter().map(|u| u.as_i64()).collect();
        sqlx::query(
            r#"
            INSERT INTO user_rooms (user_id, room_id)
            SELECT member_id, $2 FROM UNNEST($1::BIGINT[]) AS member_id
            ON CONFLICT (user_id, room_id) DO NOTHING
            "#,
        )
        .bind(&member_ids)
        .bind(room.id().as_i64())
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to add room members", e))?;

        let row: MessageRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO messages (room_id, user_id, text, display, image_name, document_name)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            MESSAGE_COLUMNS
        ))
        .bind(opening.room_id.as_i64())
        .bind(opening.user_id.as_i64())
        .bind(&opening.text)
        .bind(sqlx::types::Json(&opening.display))
        .bind(&opening.attachments.image_name)
        .bind(&opening.attachments.document_name)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to create opening message", e))?;

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit room creation", e))?;

        Ok((room, Message::from(row)))
    }

    async fn find_or_create_hire_room(
        &self,
        room: NewRoom,
        criteria: &HireRoomCriteria,
    ) -> Result<(Room, bool), DomainError> {
        let existing: Option<RoomRow> = sqlx::query_as(&format!(
            r#"
            SELECT {}
            FROM rooms
            WHERE origin = 'hire'
              AND host_id = $1
              AND hire_id IS NOT DISTINCT FROM $2
              AND name IS NOT DISTINCT FROM $3
            "#,
            ROOM_COLUMNS
        ))
        .bind(criteria.host_id.as_i64())
        .bind(criteria.hire_id.map(|h| h.as_i64()))
        .bind(&criteria.name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find hire room", e))?;

        if let Some(row) = existing {
            return Ok((Room::try_from(row)?, false));
        }

        // A concurrent creator trips `rooms_hire_key`, surfacing as Conflict.
        let row: RoomRow = sqlx::query_as(&format!(
            "INSERT INTO rooms (name, host_id, hire_id, origin) VALUES ($1, $2, $3, $4) RETURNING {}",
            ROOM_COLUMNS
        ))
        .bind(&room.name)
        .bind(room.host_id.map(|u| u.as_i64()))
        .bind(room.hire_id.map(|h| h.as_i64()))
        .bind(origin_to_str(RoomOrigin::Hire))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Failed to create hire room", e))?;

        Ok((Room::try_from(row)?, true))
    }

    async fn find_by_id(&self, id: RoomId) -> Result<Option<Room>, DomainError> {
        let row: Option<RoomRow> =
            sqlx::query_as(&format!("SELECT {} FROM rooms WHERE id = $1", ROOM_COLUMNS))
                .bind(id.as_i64())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| db_error("Failed to find room", e))?;

        row.map(Room::try_from).transpose()
    }

    async fn add_member(&self, user_id: UserId, room_id: RoomId) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO user_rooms (user_id, room_id) VALUES ($1, $2)
            ON CONFLICT (user_id, room_id) DO NOTHING
            "#,
        )
        .bind(user_id.as_i64())
        .bind(room_id.as_i64())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_missing_reference(&e) {
                return DomainError::new(ErrorCode::RoomNotFound, "Room not found");
            }
            db_error("Failed to add room member", e)
        })?;

        Ok(())
    }

    async fn find_membership(
        &self,
        user_id: UserId,
        room_id: RoomId,
    ) -> Result<Option<Membership>, DomainError> {
        let row: Option<MembershipRow> = sqlx::query_as(&format!(
            "SELECT {} FROM user_rooms WHERE user_id = $1 AND room_id = $2",
            MEMBERSHIP_COLUMNS
        ))
        .bind(user_id.as_i64())
        .bind(room_id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find membership", e))?;

        row.map(Membership::try_from).transpose()
    }

    async fn memberships_of_room(&self, room_id: RoomId) -> Result<Vec<Membership>, DomainError> {
        let rows: Vec<MembershipRow> = sqlx::query_as(&format!(
            "SELECT {} FROM user_rooms WHERE room_id = $1 ORDER BY user_id",
            MEMBERSHIP_COLUMNS
        ))
        .bind(room_id.as_i64())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list memberships", e))?;

        rows.into_iter().map(Membership::try_from).collect()
    }

    async fn advance_read_cursor(
        &self,
        user_id: UserId,
        room_id: RoomId,
        message_id: MessageId,
    ) -> Result<bool, DomainError> {
        // The guard keeps the cursor monotone under concurrent mark-read calls.
        let result = sqlx::query(
            r#"
            UPDATE user_rooms SET last_read_message_id = $3
            WHERE user_id = $1 AND room_id = $2
              AND (last_read_message_id IS NULL OR last_read_message_id < $3)
            "#,
        )
        .bind(user_id.as_i64())
        .bind(room_id.as_i64())
        .bind(message_id.as_i64())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to advance read cursor", e))?;

        if result.rows_affected() > 0 {
            return Ok(true);
        }
        if self.find_membership(user_id, room_id).await?.is_none() {
            return Err(DomainError::new(
                ErrorCode::MembershipNotFound,
                "Membership not found",
            ));
        }
        Ok(false)
    }

    async fn list_for_member(
        &self,
        user_id: UserId,
        query: &RoomQuery,
        page: PageRequest,
    ) -> Result<Page<RoomListing>, DomainError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*)");
        push_listing_filters(&mut count, user_id, query);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| db_error("Failed to count rooms", e))?;

        let mut select = QueryBuilder::<Postgres>::new(
            r#"
            SELECT r.id, r.name, r.host_id, r.hire_id, r.origin, r.created_at,
                   (SELECT MAX(m.created_at) FROM messages m WHERE m.room_id = r.id)
                       AS last_message_at,
                   (SELECT COUNT(*) FROM messages m
                     LEFT JOIN messages lr ON lr.id = ur.last_read_message_id
                     WHERE m.room_id = r.id
                       AND (lr.id IS NULL OR (m.created_at, m.id) > (lr.created_at, lr.id)))
                       AS unread_messages_count,
                   ARRAY(SELECT o.user_id FROM user_rooms o WHERE o.room_id = r.id ORDER BY o.user_id)
                       AS member_ids
            "#,
        );
        push_listing_filters(&mut select, user_id, query);

        let direction = query.sort.direction.as_sql();
        match query.sort.field {
            RoomSortField::LastMessageAt => select.push(format!(
                " ORDER BY last_message_at {} NULLS LAST, r.id {}",
                direction, direction
            )),
            RoomSortField::CreatedAt => select.push(format!(
                " ORDER BY r.created_at {}, r.id {}",
                direction, direction
            )),
        };
        select.push(" LIMIT ");
        select.push_bind(page.limit() as i64);
        select.push(" OFFSET ");
        select.push_bind(page.offset() as i64);

        let rows: Vec<RoomListingRow> = select
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("Failed to list rooms", e))?;

        let listings = rows
            .into_iter()
            .map(RoomListing::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page::new(listings, total.max(0) as u64, page))
    }
}
