use anyhow::Result;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};
use typed_builder::TypedBuilder;

use crate::common::{EventId, RegistrationId, TicketingError, TicketingResult, UserId};

/// Name of the one-registration-per-attendee constraint.
pub const EVENT_ATTENDEE_UNIQUE: &str = "registrations_event_attendee_key";

/// Width of the `t_shirt_size` column, in characters.
pub const T_SHIRT_SIZE_MAX_CHARS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "registration_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl RegistrationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationStatus::Pending => "pending",
            RegistrationStatus::Approved => "approved",
            RegistrationStatus::Rejected => "rejected",
            RegistrationStatus::Cancelled => "cancelled",
        }
    }

    /// Whether seats held by a registration in this state count against
    /// the event's capacity.
    pub fn holds_seats(&self) -> bool {
        match self {
            RegistrationStatus::Pending | RegistrationStatus::Approved => true,
            RegistrationStatus::Rejected | RegistrationStatus::Cancelled => false,
        }
    }
}

/// Optional attendee answers captured at registration and printed on the ticket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TypedBuilder)]
#[builder(field_defaults(default, setter(into, strip_option)))]
pub struct RegistrationExtras {
    pub dietary_requirements: Option<String>,
    pub t_shirt_size: Option<String>,
    pub additional_info: Option<String>,
}

impl RegistrationExtras {
    /// Blank answers are stored as NULL.
    pub fn normalized(self) -> Self {
        fn clean(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }

        Self {
            dietary_requirements: clean(self.dietary_requirements),
            t_shirt_size: clean(self.t_shirt_size),
            additional_info: clean(self.additional_info),
        }
    }

    /// Normalize, then reject answers the registrations table cannot hold.
    pub fn validated(self) -> TicketingResult<Self> {
        let extras = self.normalized();

        if let Some(size) = &extras.t_shirt_size {
            if size.chars().count() > T_SHIRT_SIZE_MAX_CHARS {
                return Err(TicketingError::validation(
                    "t_shirt_size",
                    format!("must be at most {T_SHIRT_SIZE_MAX_CHARS} characters"),
                ));
            }
        }

        Ok(extras)
    }
}

/// Registration model - SQL persistence layer
///
/// `check_in_status`/`check_in_time` are only written by the check-in
/// actions; `qr_code`/`ticket_document` only by ticket issuance.
#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct Registration {
    pub id: RegistrationId,
    pub event_id: EventId,
    pub attendee_id: UserId,
    pub number_of_seats: i32,
    pub total_amount: Decimal,
    pub status: RegistrationStatus,
    pub dietary_requirements: Option<String>,
    pub t_shirt_size: Option<String>,
    pub additional_info: Option<String>,
    /// PNG data URI of the QR code.
    pub qr_code: Option<String>,
    /// Ticket store reference for the PDF.
    pub ticket_document: Option<String>,
    pub check_in_status: bool,
    pub check_in_time: Option<DateTime<Utc>>,
    pub registration_date: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewRegistration {
    pub id: RegistrationId,
    pub event_id: EventId,
    pub attendee_id: UserId,
    pub number_of_seats: i32,
    pub total_amount: Decimal,
    pub status: RegistrationStatus,
    pub extras: RegistrationExtras,
}

/// A registration read under lock together with its event's organizer.
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct LockedRegistration {
    #[sqlx(flatten)]
    pub registration: Registration,
    pub organizer_id: UserId,
}

/// Registration joined with what a ticket holder or organizer sees about it.
#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct RegistrationDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub registration: Registration,
    pub event_title: String,
    pub event_date: NaiveDate,
    pub event_time: NaiveTime,
    pub venue: String,
    pub organizer_id: UserId,
    pub attendee_name: String,
    pub attendee_email: String,
}

/// One row of an event's participant list.
#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct Participant {
    pub registration_id: RegistrationId,
    pub attendee_id: UserId,
    pub username: String,
    pub email: String,
    pub number_of_seats: i32,
    pub total_amount: Decimal,
    pub status: RegistrationStatus,
    pub check_in_status: bool,
    pub check_in_time: Option<DateTime<Utc>>,
    pub registration_date: DateTime<Utc>,
    pub dietary_requirements: Option<String>,
    pub t_shirt_size: Option<String>,
}

const DETAIL_SELECT: &str = "SELECT r.*,
        e.title AS event_title, e.event_date, e.event_time, e.venue, e.organizer_id,
        u.username AS attendee_name, u.email AS attendee_email
     FROM registrations r
     JOIN events e ON e.id = r.event_id
     JOIN users u ON u.id = r.attendee_id";

impl Registration {
    pub async fn find_by_id<'e>(
        id: RegistrationId,
        executor: impl PgExecutor<'e>,
    ) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM registrations WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await
            .map_err(Into::into)
    }

    pub async fn exists_for<'e>(
        event_id: EventId,
        attendee_id: UserId,
        executor: impl PgExecutor<'e>,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(
                SELECT 1 FROM registrations WHERE event_id = $1 AND attendee_id = $2
             )",
        )
        .bind(event_id)
        .bind(attendee_id)
        .fetch_one(executor)
        .await
    }

    /// Insert a registration. A second row for the same (event, attendee)
    /// fails on `EVENT_ATTENDEE_UNIQUE`; see `is_duplicate_registration`.
    pub async fn insert<'e>(
        new: NewRegistration,
        executor: impl PgExecutor<'e>,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO registrations (
                id, event_id, attendee_id, number_of_seats, total_amount, status,
                dietary_requirements, t_shirt_size, additional_info, registration_date
             )
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NOW())
             RETURNING *",
        )
        .bind(new.id)
        .bind(new.event_id)
        .bind(new.attendee_id)
        .bind(new.number_of_seats)
        .bind(new.total_amount)
        .bind(new.status)
        .bind(new.extras.dietary_requirements)
        .bind(new.extras.t_shirt_size)
        .bind(new.extras.additional_info)
        .fetch_one(executor)
        .await
    }

    pub async fn attach_ticket<'e>(
        id: RegistrationId,
        qr_code: &str,
        ticket_document: Option<&str>,
        executor: impl PgExecutor<'e>,
    ) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            "UPDATE registrations
             SET qr_code = $2,
                 ticket_document = COALESCE($3, ticket_document)
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(qr_code)
        .bind(ticket_document)
        .fetch_one(executor)
        .await
        .map_err(Into::into)
    }

    pub async fn set_ticket_document<'e>(
        id: RegistrationId,
        ticket_document: &str,
        executor: impl PgExecutor<'e>,
    ) -> Result<()> {
        sqlx::query("UPDATE registrations SET ticket_document = $2 WHERE id = $1")
            .bind(id)
            .bind(ticket_document)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn lock_for_update<'e>(
        id: RegistrationId,
        executor: impl PgExecutor<'e>,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT * FROM registrations WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Lock the registration row (not the event) and read the organizer of
    /// its event in the same statement.
    pub async fn lock_with_organizer<'e>(
        id: RegistrationId,
        executor: impl PgExecutor<'e>,
    ) -> Result<Option<LockedRegistration>, sqlx::Error> {
        sqlx::query_as::<_, LockedRegistration>(
            "SELECT r.*, e.organizer_id
             FROM registrations r
             JOIN events e ON e.id = r.event_id
             WHERE r.id = $1
             FOR UPDATE OF r",
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    /// Set the check-in flag; the timestamp is stamped when turning on and
    /// cleared when turning off.
    pub async fn set_check_in<'e>(
        id: RegistrationId,
        checked_in: bool,
        executor: impl PgExecutor<'e>,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "UPDATE registrations
             SET check_in_status = $2,
                 check_in_time = CASE WHEN $2 THEN NOW() ELSE NULL END
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(checked_in)
        .fetch_one(executor)
        .await
    }

    pub async fn set_status<'e>(
        id: RegistrationId,
        status: RegistrationStatus,
        executor: impl PgExecutor<'e>,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "UPDATE registrations SET status = $2 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_one(executor)
        .await
    }

    pub async fn find_detail(id: RegistrationId, pool: &PgPool) -> Result<Option<RegistrationDetail>> {
        sqlx::query_as::<_, RegistrationDetail>(&format!("{} WHERE r.id = $1", DETAIL_SELECT))
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// Every registration of an attendee, newest first.
    pub async fn list_for_attendee(
        attendee_id: UserId,
        pool: &PgPool,
    ) -> Result<Vec<RegistrationDetail>> {
        sqlx::query_as::<_, RegistrationDetail>(&format!(
            "{} WHERE r.attendee_id = $1 ORDER BY r.registration_date DESC, r.id",
            DETAIL_SELECT
        ))
        .bind(attendee_id)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Participants of an event in registration order.
    pub async fn list_participants(event_id: EventId, pool: &PgPool) -> Result<Vec<Participant>> {
        sqlx::query_as::<_, Participant>(
            "SELECT r.id AS registration_id, r.attendee_id, u.username, u.email,
                    r.number_of_seats, r.total_amount, r.status,
                    r.check_in_status, r.check_in_time, r.registration_date,
                    r.dietary_requirements, r.t_shirt_size
             FROM registrations r
             JOIN users u ON u.id = r.attendee_id
             WHERE r.event_id = $1
             ORDER BY r.registration_date, r.id",
        )
        .bind(event_id)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Sum of seats held by approved registrations (test and audit helper).
    pub async fn approved_seats(event_id: EventId, pool: &PgPool) -> Result<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(number_of_seats), 0)::BIGINT
             FROM registrations
             WHERE event_id = $1 AND status = 'approved'",
        )
        .bind(event_id)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }
}

/// True when `err` is the unique violation on (event, attendee).
pub fn is_duplicate_registration(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db.constraint() == Some(EVENT_ATTENDEE_UNIQUE),
        _ => false,
    }
}
