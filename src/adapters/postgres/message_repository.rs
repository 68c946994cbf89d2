//! PostgreSQL implementation of MessageRepository.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::errors::{db_error, is_missing_reference};
use super::rows::{contains_pattern, MessageRow, MESSAGE_COLUMNS};
use crate::domain::chat::{Message, MessageDisplay, NewMessage};
use crate::domain::foundation::{
    DomainError, ErrorCode, MessageId, Page, PageRequest, RoomId, UserId,
};
use crate::ports::{MessageQuery, MessageRepository};

/// PostgreSQL implementation of the MessageRepository port.
#[derive(Clone)]
pub struct PostgresMessageRepository {
    pool: PgPool,
}

impl PostgresMessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn push_message_filters(
    builder: &mut QueryBuilder<'_, Postgres>,
    room_id: RoomId,
    query: &MessageQuery,
) {
    builder.push(" FROM messages WHERE room_id = ");
    builder.push_bind(room_id.as_i64());

    if let Some(author) = query.author_id {
        builder.push(" AND user_id = ");
        builder.push_bind(author.as_i64());
    }

    if let Some(text) = &query.text {
        for word in text.split_whitespace() {
            builder.push(" AND text ILIKE ");
            builder.push_bind(contains_pattern(word));
        }
    }
}

/// Appends an expression counting occurrences of the query words in `text`.
fn push_relevance(builder: &mut QueryBuilder<'_, Postgres>, text: Option<&str>) {
    let words: Vec<String> = text
        .map(|t| t.split_whitespace().map(str::to_lowercase).collect())
        .unwrap_or_default();
    if words.is_empty() {
        builder.push("0");
        return;
    }
    for (i, word) in words.into_iter().enumerate() {
        if i > 0 {
            builder.push(" + ");
        }
        let length = word.chars().count() as i32;
        builder.push("((CHAR_LENGTH(LOWER(COALESCE(text, ''))) - CHAR_LENGTH(REPLACE(LOWER(COALESCE(text, '')), ");
        builder.push_bind(word);
        builder.push(", ''))) / ");
        builder.push_bind(length);
        builder.push(")");
    }
}

#[async_trait]
impl MessageRepository for PostgresMessageRepository {
    async fn append(&self, message: NewMessage) -> Result<Message, DomainError> {
        let row: MessageRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO messages (room_id, user_id, text, display, image_name, document_name)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            MESSAGE_COLUMNS
        ))
        .bind(message.room_id.as_i64())
        .bind(message.user_id.as_i64())
        .bind(&message.text)
        .bind(sqlx::types::Json(&message.display))
        .bind(&message.attachments.image_name)
        .bind(&message.attachments.document_name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_missing_reference(&e) {
                return DomainError::new(ErrorCode::RoomNotFound, "Room not found");
            }
            db_error("Failed to save message", e)
        })?;

        Ok(Message::from(row))
    }

    async fn find_by_id(&self, id: MessageId) -> Result<Option<Message>, DomainError> {
        let row: Option<MessageRow> =
            sqlx::query_as(&format!("SELECT {} FROM messages WHERE id = $1", MESSAGE_COLUMNS))
                .bind(id.as_i64())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| db_error("Failed to find message", e))?;

        Ok(row.map(Message::from))
    }

    async fn update_display(
        &self,
        id: MessageId,
        display: &[MessageDisplay],
    ) -> Result<(), DomainError> {
        let result = sqlx::query("UPDATE messages SET display = $2 WHERE id = $1")
            .bind(id.as_i64())
            .bind(sqlx::types::Json(display))
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to update message display", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::MessageNotFound,
                "Message not found",
            ));
        }

        Ok(())
    }

    async fn list_for_room(
        &self,
        room_id: RoomId,
        query: &MessageQuery,
        page: PageRequest,
    ) -> Result<Page<Message>, DomainError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*)");
        push_message_filters(&mut count, room_id, query);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| db_error("Failed to count messages", e))?;

        let mut select = QueryBuilder::<Postgres>::new(format!("SELECT {}, ", MESSAGE_COLUMNS));
        push_relevance(&mut select, query.text.as_deref());
        select.push(" AS relevance");
        push_message_filters(&mut select, room_id, query);

        let direction = query.direction.as_sql();
        select.push(format!(
            " ORDER BY created_at {}, relevance DESC, id {}",
            direction, direction
        ));
        select.push(" LIMIT ");
        select.push_bind(page.limit() as i64);
        select.push(" OFFSET ");
        select.push_bind(page.offset() as i64);

        let rows: Vec<MessageRow> = select
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("Failed to list messages", e))?;

        let messages = rows.into_iter().map(Message::from).collect();
        Ok(Page::new(messages, total.max(0) as u64, page))
    }

    async fn history(&self, room_id: RoomId) -> Result<Vec<Message>, DomainError> {
        let rows: Vec<MessageRow> = sqlx::query_as(&format!(
            "SELECT {} FROM messages WHERE room_id = $1 ORDER BY created_at, id",
            MESSAGE_COLUMNS
        ))
        .bind(room_id.as_i64())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to load room history", e))?;

        Ok(rows.into_iter().map(Message::from).collect())
    }

    async fn unread_count(&self, user_id: UserId) -> Result<u64, DomainError> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM user_rooms ur
            JOIN messages m ON m.room_id = ur.room_id
            LEFT JOIN messages lr ON lr.id = ur.last_read_message_id
            WHERE ur.user_id = $1
              AND (lr.id IS NULL OR (m.created_at, m.id) > (lr.created_at, lr.id))
            "#,
        )
        .bind(user_id.as_i64())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Failed to count unread messages", e))?;

        Ok(count.max(0) as u64)
    }
}
