use anyhow::Result;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};
use std::fmt;
use typed_builder::TypedBuilder;

use crate::common::{EventId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, sqlx::Type)]
#[sqlx(type_name = "event_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    #[default]
    Upcoming,
    Ongoing,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, sqlx::Type)]
#[sqlx(type_name = "publication_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PublicationStatus {
    #[default]
    Draft,
    Published,
}

impl PublicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PublicationStatus::Draft => "draft",
            PublicationStatus::Published => "published",
        }
    }
}

impl fmt::Display for PublicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event model - SQL persistence layer
///
/// `seats_committed` is only ever written by the registration workflow while
/// it holds this row's lock; readers outside that workflow treat it as a
/// snapshot.
#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct Event {
    pub id: EventId,
    pub organizer_id: UserId,
    pub title: String,
    pub description: String,
    pub venue: String,
    pub address: String,
    pub event_date: NaiveDate,
    pub event_time: NaiveTime,
    pub ticket_price: Decimal,
    pub max_attendees: Option<i32>,
    pub seats_committed: i32,
    pub status: EventStatus,
    pub publication_status: PublicationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for an event.
#[derive(Debug, Clone, TypedBuilder)]
#[builder(field_defaults(setter(into)))]
pub struct NewEvent {
    pub organizer_id: UserId,
    pub title: String,
    #[builder(default)]
    pub description: String,
    #[builder(default)]
    pub venue: String,
    #[builder(default)]
    pub address: String,
    pub event_date: NaiveDate,
    pub event_time: NaiveTime,
    #[builder(default)]
    pub ticket_price: Decimal,
    #[builder(default, setter(strip_option))]
    pub max_attendees: Option<i32>,
    #[builder(default)]
    pub status: EventStatus,
    #[builder(default = PublicationStatus::Published)]
    pub publication_status: PublicationStatus,
}

impl Event {
    pub async fn find_by_id<'e>(id: EventId, executor: impl PgExecutor<'e>) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM events WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await
            .map_err(Into::into)
    }

    /// Load the event and hold its row lock until the surrounding
    /// transaction ends. Every writer of `seats_committed` goes through here,
    /// so concurrent registrations for one event are serialized.
    pub async fn lock_for_update<'e>(
        id: EventId,
        executor: impl PgExecutor<'e>,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT * FROM events WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Move the committed-seat counter by `delta` (negative to release).
    /// Caller must hold the lock from `lock_for_update`.
    pub async fn adjust_committed_seats<'e>(
        id: EventId,
        delta: i32,
        executor: impl PgExecutor<'e>,
    ) -> Result<i32, sqlx::Error> {
        sqlx::query_scalar::<_, i32>(
            "UPDATE events
             SET seats_committed = seats_committed + $2,
                 updated_at = NOW()
             WHERE id = $1
             RETURNING seats_committed",
        )
        .bind(id)
        .bind(delta)
        .fetch_one(executor)
        .await
    }

    pub async fn create(new: NewEvent, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO events (
                organizer_id, title, description, venue, address,
                event_date, event_time, ticket_price, max_attendees,
                status, publication_status
             )
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING *",
        )
        .bind(new.organizer_id)
        .bind(&new.title)
        .bind(&new.description)
        .bind(&new.venue)
        .bind(&new.address)
        .bind(new.event_date)
        .bind(new.event_time)
        .bind(new.ticket_price)
        .bind(new.max_attendees)
        .bind(new.status)
        .bind(new.publication_status)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    pub fn is_organized_by(&self, user_id: UserId) -> bool {
        self.organizer_id == user_id
    }
}
