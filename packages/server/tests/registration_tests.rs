//! Registration workflow against a real Postgres.

mod common;

use crate::common::{create_event, create_open_event, create_user, TestHarness};
use rust_decimal::Decimal;
use std::str::FromStr;
use test_context::test_context;
use ticketing_core::common::{Conflict, Role, TicketingError};
use ticketing_core::domains::events::{CapacityLedger, Event};
use ticketing_core::domains::registrations::actions::{
    cancel_registration, event_participants, get_registration, list_user_registrations,
    register,
};
use ticketing_core::domains::registrations::{
    Registration, RegistrationExtras, RegistrationStatus,
};

fn no_extras() -> RegistrationExtras {
    RegistrationExtras::default()
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_register_freezes_amount_and_attaches_ticket(ctx: &TestHarness) {
    let organizer = create_user(&ctx.db_pool, Role::Organizer).await;
    let attendee = create_user(&ctx.db_pool, Role::Attendee).await;
    let event = create_event(
        &ctx.db_pool,
        &organizer,
        Some(50),
        Decimal::from_str("15.25").unwrap(),
    )
    .await;

    let extras = RegistrationExtras::builder()
        .dietary_requirements("Vegetarian")
        .t_shirt_size("L")
        .build();
    let registration = register(TestHarness::actor(&attendee), event.id, 2, extras, &ctx.deps)
        .await
        .unwrap();

    assert_eq!(registration.status, RegistrationStatus::Approved);
    assert_eq!(registration.total_amount, Decimal::from_str("30.50").unwrap());
    assert_eq!(registration.dietary_requirements.as_deref(), Some("Vegetarian"));
    assert!(!registration.check_in_status);
    assert!(registration
        .qr_code
        .as_deref()
        .unwrap()
        .starts_with("data:image/png;base64,"));
    assert!(registration
        .ticket_document
        .as_deref()
        .unwrap()
        .starts_with("data:application/pdf;base64,"));

    let event = Event::find_by_id(event.id, &ctx.db_pool).await.unwrap().unwrap();
    assert_eq!(event.seats_committed, 2);
    assert_eq!(ctx.mocks.ticket_store.stored_content_types(), vec!["application/pdf"]);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_second_registration_is_a_conflict(ctx: &TestHarness) {
    let organizer = create_user(&ctx.db_pool, Role::Organizer).await;
    let attendee = create_user(&ctx.db_pool, Role::Attendee).await;
    let event = create_open_event(&ctx.db_pool, &organizer).await;
    let actor = TestHarness::actor(&attendee);

    register(actor, event.id, 1, no_extras(), &ctx.deps).await.unwrap();
    let err = register(actor, event.id, 1, no_extras(), &ctx.deps)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        TicketingError::Conflict(Conflict::AlreadyRegistered)
    ));
    let event = Event::find_by_id(event.id, &ctx.db_pool).await.unwrap().unwrap();
    assert_eq!(event.seats_committed, 1);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_duplicate_check_precedes_capacity_check(ctx: &TestHarness) {
    let organizer = create_user(&ctx.db_pool, Role::Organizer).await;
    let attendee = create_user(&ctx.db_pool, Role::Attendee).await;
    let event = create_event(&ctx.db_pool, &organizer, Some(1), Decimal::ZERO).await;
    let actor = TestHarness::actor(&attendee);

    register(actor, event.id, 1, no_extras(), &ctx.deps).await.unwrap();
    let err = register(actor, event.id, 5, no_extras(), &ctx.deps)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        TicketingError::Conflict(Conflict::AlreadyRegistered)
    ));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_organizers_cannot_register(ctx: &TestHarness) {
    let organizer = create_user(&ctx.db_pool, Role::Organizer).await;
    let other_organizer = create_user(&ctx.db_pool, Role::Organizer).await;
    let event = create_open_event(&ctx.db_pool, &organizer).await;

    let err = register(
        TestHarness::actor(&other_organizer),
        event.id,
        1,
        no_extras(),
        &ctx.deps,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, TicketingError::Forbidden(_)));
    assert_eq!(err.to_string(), "Organizer accounts cannot register for events");
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_stored_role_wins_over_token_role(ctx: &TestHarness) {
    let organizer = create_user(&ctx.db_pool, Role::Organizer).await;
    let event = create_open_event(&ctx.db_pool, &organizer).await;
    let impostor = create_user(&ctx.db_pool, Role::Organizer).await;

    let err = register(
        TestHarness::actor_with_role(&impostor, Role::Attendee),
        event.id,
        1,
        no_extras(),
        &ctx.deps,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, TicketingError::Forbidden(_)));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_admin_cannot_register_for_own_event(ctx: &TestHarness) {
    let admin = create_user(&ctx.db_pool, Role::Admin).await;
    let event = create_open_event(&ctx.db_pool, &admin).await;

    let err = register(TestHarness::actor(&admin), event.id, 1, no_extras(), &ctx.deps)
        .await
        .unwrap_err();

    assert!(matches!(err, TicketingError::Forbidden(ref m) if m.contains("own event")));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_seat_count_must_be_positive(ctx: &TestHarness) {
    let organizer = create_user(&ctx.db_pool, Role::Organizer).await;
    let attendee = create_user(&ctx.db_pool, Role::Attendee).await;
    let event = create_open_event(&ctx.db_pool, &organizer).await;

    let err = register(TestHarness::actor(&attendee), event.id, 0, no_extras(), &ctx.deps)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        TicketingError::Validation {
            field: "number_of_seats",
            ..
        }
    ));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_oversized_seat_requests_are_validation_errors(ctx: &TestHarness) {
    let organizer = create_user(&ctx.db_pool, Role::Organizer).await;
    let attendee = create_user(&ctx.db_pool, Role::Attendee).await;
    let actor = TestHarness::actor(&attendee);

    let priced = create_event(&ctx.db_pool, &organizer, None, Decimal::from(100)).await;
    let err = register(actor, priced.id, 2_000_000, no_extras(), &ctx.deps)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        TicketingError::Validation {
            field: "number_of_seats",
            ..
        }
    ));

    let free = create_open_event(&ctx.db_pool, &organizer).await;
    let other = create_user(&ctx.db_pool, Role::Attendee).await;
    register(TestHarness::actor(&other), free.id, 10, no_extras(), &ctx.deps)
        .await
        .unwrap();
    let err = register(actor, free.id, i32::MAX, no_extras(), &ctx.deps)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        TicketingError::Validation {
            field: "number_of_seats",
            ..
        }
    ));

    // Nothing was written for the rejected requests.
    let priced = Event::find_by_id(priced.id, &ctx.db_pool).await.unwrap().unwrap();
    assert_eq!(priced.seats_committed, 0);
    let free = Event::find_by_id(free.id, &ctx.db_pool).await.unwrap().unwrap();
    assert_eq!(free.seats_committed, 10);
    assert!(list_user_registrations(attendee.id, &ctx.deps).await.unwrap().is_empty());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_long_t_shirt_size_is_a_validation_error(ctx: &TestHarness) {
    let organizer = create_user(&ctx.db_pool, Role::Organizer).await;
    let attendee = create_user(&ctx.db_pool, Role::Attendee).await;
    let event = create_open_event(&ctx.db_pool, &organizer).await;
    let actor = TestHarness::actor(&attendee);

    let extras = RegistrationExtras::builder()
        .t_shirt_size("Extra Large Tall")
        .build();
    let err = register(actor, event.id, 1, extras, &ctx.deps)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        TicketingError::Validation {
            field: "t_shirt_size",
            ..
        }
    ));

    let extras = RegistrationExtras::builder().t_shirt_size("XL").build();
    let registration = register(actor, event.id, 1, extras, &ctx.deps).await.unwrap();
    assert_eq!(registration.t_shirt_size.as_deref(), Some("XL"));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_unknown_event_is_not_found(ctx: &TestHarness) {
    let attendee = create_user(&ctx.db_pool, Role::Attendee).await;

    let err = register(
        TestHarness::actor(&attendee),
        ticketing_core::common::EventId::new(),
        1,
        no_extras(),
        &ctx.deps,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, TicketingError::NotFound(_)));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_full_event_reports_remaining_seats(ctx: &TestHarness) {
    let organizer = create_user(&ctx.db_pool, Role::Organizer).await;
    let first = create_user(&ctx.db_pool, Role::Attendee).await;
    let second = create_user(&ctx.db_pool, Role::Attendee).await;
    let event = create_event(&ctx.db_pool, &organizer, Some(2), Decimal::ZERO).await;

    register(TestHarness::actor(&first), event.id, 2, no_extras(), &ctx.deps)
        .await
        .unwrap();

    let locked = Event::find_by_id(event.id, &ctx.db_pool).await.unwrap().unwrap();
    assert_eq!(CapacityLedger::for_event(&locked).available_seats(), Some(0));

    let err = register(TestHarness::actor(&second), event.id, 1, no_extras(), &ctx.deps)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        TicketingError::Conflict(Conflict::CapacityExceeded { available: 0 })
    ));
    assert_eq!(err.to_string(), "Only 0 seats available");
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_zero_capacity_admits_nobody(ctx: &TestHarness) {
    let organizer = create_user(&ctx.db_pool, Role::Organizer).await;
    let attendee = create_user(&ctx.db_pool, Role::Attendee).await;
    let event = create_event(&ctx.db_pool, &organizer, Some(0), Decimal::ZERO).await;

    let err = register(TestHarness::actor(&attendee), event.id, 1, no_extras(), &ctx.deps)
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Only 0 seats available");
}

#[test_context(TestHarness)]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_registrations_never_oversell(ctx: &TestHarness) {
    const K: usize = 8;

    let organizer = create_user(&ctx.db_pool, Role::Organizer).await;
    let event = create_event(&ctx.db_pool, &organizer, Some(K as i32 - 1), Decimal::ZERO).await;

    let mut attendees = Vec::with_capacity(K);
    for _ in 0..K {
        attendees.push(create_user(&ctx.db_pool, Role::Attendee).await);
    }

    let handles: Vec<_> = attendees
        .iter()
        .map(|attendee| {
            let deps = ctx.deps.clone();
            let actor = TestHarness::actor(attendee);
            let event_id = event.id;
            tokio::spawn(async move {
                register(actor, event_id, 1, RegistrationExtras::default(), &deps).await
            })
        })
        .collect();

    let results: Vec<_> = futures::future::join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.expect("registration task panicked"))
        .collect();

    let succeeded = results.iter().filter(|r| r.is_ok()).count();
    let capacity_conflicts = results
        .iter()
        .filter(|r| {
            matches!(
                r,
                Err(TicketingError::Conflict(Conflict::CapacityExceeded { .. }))
            )
        })
        .count();

    assert_eq!(succeeded, K - 1);
    assert_eq!(capacity_conflicts, 1);

    let approved = Registration::approved_seats(event.id, &ctx.db_pool).await.unwrap();
    assert_eq!(approved, (K - 1) as i64);
    let event = Event::find_by_id(event.id, &ctx.db_pool).await.unwrap().unwrap();
    assert_eq!(event.seats_committed, K as i32 - 1);
}

#[test_context(TestHarness)]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_duplicates_admit_one(ctx: &TestHarness) {
    let organizer = create_user(&ctx.db_pool, Role::Organizer).await;
    let attendee = create_user(&ctx.db_pool, Role::Attendee).await;
    let event = create_open_event(&ctx.db_pool, &organizer).await;

    let handles: Vec<_> = (0..5)
        .map(|_| {
            let deps = ctx.deps.clone();
            let actor = TestHarness::actor(&attendee);
            let event_id = event.id;
            tokio::spawn(async move {
                register(actor, event_id, 1, RegistrationExtras::default(), &deps).await
            })
        })
        .collect();

    let results: Vec<_> = futures::future::join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.expect("registration task panicked"))
        .collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results.iter().filter(|r| r.is_err()).all(|r| matches!(
        r,
        Err(TicketingError::Conflict(Conflict::AlreadyRegistered))
    )));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_store_failure_keeps_registration_without_document(ctx: &TestHarness) {
    let organizer = create_user(&ctx.db_pool, Role::Organizer).await;
    let attendee = create_user(&ctx.db_pool, Role::Attendee).await;
    let event = create_open_event(&ctx.db_pool, &organizer).await;

    ctx.mocks.ticket_store.set_failing(true);
    let registration = register(TestHarness::actor(&attendee), event.id, 1, no_extras(), &ctx.deps)
        .await
        .unwrap();

    assert!(registration.qr_code.is_some());
    assert!(registration.ticket_document.is_none());

    let stored = Registration::find_by_id(registration.id, &ctx.db_pool)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, RegistrationStatus::Approved);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_registration_visibility(ctx: &TestHarness) {
    let organizer = create_user(&ctx.db_pool, Role::Organizer).await;
    let attendee = create_user(&ctx.db_pool, Role::Attendee).await;
    let stranger = create_user(&ctx.db_pool, Role::Attendee).await;
    let admin = create_user(&ctx.db_pool, Role::Admin).await;
    let event = create_open_event(&ctx.db_pool, &organizer).await;

    let registration = register(TestHarness::actor(&attendee), event.id, 1, no_extras(), &ctx.deps)
        .await
        .unwrap();

    for viewer in [&attendee, &organizer, &admin] {
        let detail = get_registration(registration.id, TestHarness::actor(viewer), &ctx.deps)
            .await
            .unwrap();
        assert_eq!(detail.registration.id, registration.id);
        assert_eq!(detail.event_title, "Spring Hackathon");
        assert_eq!(detail.attendee_email, attendee.email);
    }

    let err = get_registration(registration.id, TestHarness::actor(&stranger), &ctx.deps)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Registration not found or unauthorized");
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_list_user_registrations_newest_first(ctx: &TestHarness) {
    let organizer = create_user(&ctx.db_pool, Role::Organizer).await;
    let attendee = create_user(&ctx.db_pool, Role::Attendee).await;
    let first = create_open_event(&ctx.db_pool, &organizer).await;
    let second = create_open_event(&ctx.db_pool, &organizer).await;
    let actor = TestHarness::actor(&attendee);

    let older = register(actor, first.id, 1, no_extras(), &ctx.deps).await.unwrap();
    let newer = register(actor, second.id, 1, no_extras(), &ctx.deps).await.unwrap();

    let mine = list_user_registrations(attendee.id, &ctx.deps).await.unwrap();
    let ids: Vec<_> = mine.iter().map(|d| d.registration.id).collect();
    assert_eq!(ids, vec![newer.id, older.id]);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_cancel_releases_seats(ctx: &TestHarness) {
    let organizer = create_user(&ctx.db_pool, Role::Organizer).await;
    let first = create_user(&ctx.db_pool, Role::Attendee).await;
    let second = create_user(&ctx.db_pool, Role::Attendee).await;
    let event = create_event(&ctx.db_pool, &organizer, Some(1), Decimal::ZERO).await;

    let registration = register(TestHarness::actor(&first), event.id, 1, no_extras(), &ctx.deps)
        .await
        .unwrap();

    let cancelled = cancel_registration(registration.id, TestHarness::actor(&first), &ctx.deps)
        .await
        .unwrap();
    assert_eq!(cancelled.status, RegistrationStatus::Cancelled);

    let err = cancel_registration(registration.id, TestHarness::actor(&first), &ctx.deps)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        TicketingError::Conflict(Conflict::AlreadyCancelled)
    ));

    register(TestHarness::actor(&second), event.id, 1, no_extras(), &ctx.deps)
        .await
        .unwrap();
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_strangers_cannot_cancel(ctx: &TestHarness) {
    let organizer = create_user(&ctx.db_pool, Role::Organizer).await;
    let attendee = create_user(&ctx.db_pool, Role::Attendee).await;
    let stranger = create_user(&ctx.db_pool, Role::Attendee).await;
    let event = create_open_event(&ctx.db_pool, &organizer).await;

    let registration = register(TestHarness::actor(&attendee), event.id, 1, no_extras(), &ctx.deps)
        .await
        .unwrap();

    let err = cancel_registration(registration.id, TestHarness::actor(&stranger), &ctx.deps)
        .await
        .unwrap_err();
    assert!(matches!(err, TicketingError::NotFound(_)));

    cancel_registration(registration.id, TestHarness::actor(&organizer), &ctx.deps)
        .await
        .unwrap();
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_participants_summary(ctx: &TestHarness) {
    let organizer = create_user(&ctx.db_pool, Role::Organizer).await;
    let other_organizer = create_user(&ctx.db_pool, Role::Organizer).await;
    let first = create_user(&ctx.db_pool, Role::Attendee).await;
    let second = create_user(&ctx.db_pool, Role::Attendee).await;
    let event = create_event(
        &ctx.db_pool,
        &organizer,
        Some(10),
        Decimal::from_str("5.00").unwrap(),
    )
    .await;

    register(TestHarness::actor(&first), event.id, 3, no_extras(), &ctx.deps)
        .await
        .unwrap();
    register(TestHarness::actor(&second), event.id, 1, no_extras(), &ctx.deps)
        .await
        .unwrap();

    let view = event_participants(event.id, TestHarness::actor(&organizer), &ctx.deps)
        .await
        .unwrap();
    assert_eq!(view.participants.len(), 2);
    assert_eq!(view.summary.total_seats_booked, 4);
    assert_eq!(view.summary.available_seats, Some(6));
    assert_eq!(view.summary.max_attendees, Some(10));
    assert_eq!(view.summary.checked_in_count, 0);
    assert_eq!(view.summary.total_revenue, Decimal::from_str("20.00").unwrap());

    let err = event_participants(event.id, TestHarness::actor(&other_organizer), &ctx.deps)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Event not found or unauthorized");

    let err = event_participants(event.id, TestHarness::actor(&first), &ctx.deps)
        .await
        .unwrap_err();
    assert!(matches!(err, TicketingError::Forbidden(_)));
}
