use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};
use typed_builder::TypedBuilder;

use crate::common::{EventId, NotificationId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, sqlx::Type)]
#[sqlx(type_name = "notification_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    #[default]
    Event,
    System,
    Other,
}

/// Notification model - SQL persistence layer
#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct Notification {
    pub id: NotificationId,
    pub event_id: Option<EventId>,
    pub sender_id: UserId,
    pub recipient_id: UserId,
    pub title: String,
    pub message: String,
    pub notification_type: NotificationType,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, TypedBuilder)]
pub struct NewNotification {
    #[builder(default, setter(strip_option))]
    pub event_id: Option<EventId>,
    pub sender_id: UserId,
    pub recipient_id: UserId,
    #[builder(setter(into))]
    pub title: String,
    #[builder(setter(into))]
    pub message: String,
    #[builder(default)]
    pub notification_type: NotificationType,
}

/// Inbox row: the notification plus display names for its event and sender.
#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct InboxEntry {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub notification: Notification,
    pub event_title: Option<String>,
    pub sender_name: String,
}

impl Notification {
    pub async fn insert<'e>(new: NewNotification, executor: impl PgExecutor<'e>) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO notifications (
                id, event_id, sender_id, recipient_id, title, message, notification_type
             )
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING *",
        )
        .bind(NotificationId::new())
        .bind(new.event_id)
        .bind(new.sender_id)
        .bind(new.recipient_id)
        .bind(&new.title)
        .bind(&new.message)
        .bind(new.notification_type)
        .fetch_one(executor)
        .await
        .map_err(Into::into)
    }

    /// Approved registrants of an event plus its organizer, deduplicated,
    /// read as one snapshot.
    pub async fn event_recipients(event_id: EventId, pool: &PgPool) -> Result<Vec<UserId>> {
        sqlx::query_scalar::<_, UserId>(
            "SELECT attendee_id FROM registrations
             WHERE event_id = $1 AND status = 'approved'
             UNION
             SELECT organizer_id FROM events WHERE id = $1",
        )
        .bind(event_id)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// A user's inbox, newest first. Never collapsed.
    pub async fn list_for_recipient(
        recipient_id: UserId,
        limit: i64,
        offset: i64,
        pool: &PgPool,
    ) -> Result<Vec<InboxEntry>> {
        sqlx::query_as::<_, InboxEntry>(
            "SELECT n.*, e.title AS event_title, u.username AS sender_name
             FROM notifications n
             LEFT JOIN events e ON e.id = n.event_id
             JOIN users u ON u.id = n.sender_id
             WHERE n.recipient_id = $1
             ORDER BY n.created_at DESC, n.id DESC
             LIMIT $2 OFFSET $3",
        )
        .bind(recipient_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn unread_count(recipient_id: UserId, pool: &PgPool) -> Result<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications WHERE recipient_id = $1 AND is_read = FALSE",
        )
        .bind(recipient_id)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    /// Mark read if the row belongs to `recipient_id`; `None` otherwise.
    pub async fn mark_read(
        id: NotificationId,
        recipient_id: UserId,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            "UPDATE notifications
             SET is_read = TRUE
             WHERE id = $1 AND recipient_id = $2
             RETURNING *",
        )
        .bind(id)
        .bind(recipient_id)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    /// Event history: one row per (title, message, sender), the most recent
    /// copy of each, newest first. A fan-out to N recipients shows once.
    pub async fn event_history(event_id: EventId, pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM (
                SELECT DISTINCT ON (title, message, sender_id) *
                FROM notifications
                WHERE event_id = $1
                ORDER BY title, message, sender_id, created_at DESC, id DESC
             ) latest
             ORDER BY created_at DESC, id DESC",
        )
        .bind(event_id)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }
}
