//! Fixtures insert rows directly; every call creates fresh, uniquely named data.

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use sqlx::PgPool;
use ticketing_core::common::Role;
use ticketing_core::domains::events::{Event, NewEvent};
use ticketing_core::domains::users::User;
use uuid::Uuid;

pub async fn create_user(pool: &PgPool, role: Role) -> User {
    let tag = Uuid::new_v4().simple().to_string();
    User::create(
        &format!("{}-{}@example.edu", role.as_str(), tag),
        &format!("{}_{}", role.as_str(), &tag[..8]),
        role,
        pool,
    )
    .await
    .expect("Failed to create user")
}

pub async fn create_event(
    pool: &PgPool,
    organizer: &User,
    max_attendees: Option<i32>,
    ticket_price: Decimal,
) -> Event {
    let builder = NewEvent::builder()
        .organizer_id(organizer.id)
        .title("Spring Hackathon")
        .venue("Engineering Hall 2")
        .address("1 Campus Way")
        .event_date(NaiveDate::from_ymd_opt(2026, 11, 5).unwrap())
        .event_time(NaiveTime::from_hms_opt(18, 30, 0).unwrap())
        .ticket_price(ticket_price);

    let new = match max_attendees {
        Some(max) => builder.max_attendees(max).build(),
        None => builder.build(),
    };

    Event::create(new, pool).await.expect("Failed to create event")
}

/// Unlimited free event.
pub async fn create_open_event(pool: &PgPool, organizer: &User) -> Event {
    create_event(pool, organizer, None, Decimal::ZERO).await
}
