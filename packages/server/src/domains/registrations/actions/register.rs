//! Register action - reserve seats and issue the ticket

use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::common::{
    Actor, Capability, Conflict, EventId, RegistrationId, TicketingError, TicketingResult,
};
use crate::domains::events::{CapacityLedger, Event};
use crate::domains::registrations::models::registration::{
    is_duplicate_registration, NewRegistration, Registration, RegistrationExtras,
    RegistrationStatus,
};
use crate::domains::tickets::{self, DocumentStatus, TicketData, PDF_CONTENT_TYPE};
use crate::domains::users::User;
use crate::kernel::ServerDeps;

/// Largest value the `total_amount` column (`NUMERIC(10, 2)`) holds.
fn max_total_amount() -> Decimal {
    Decimal::new(9_999_999_999, 2)
}

/// Price of `seats` tickets, bounded by what a registration can store.
fn total_amount(seats: i32, ticket_price: Decimal) -> TicketingResult<Decimal> {
    Decimal::from(seats)
        .checked_mul(ticket_price)
        .filter(|amount| *amount <= max_total_amount())
        .ok_or_else(|| {
            TicketingError::validation("number_of_seats", "total amount is too large")
        })
}

/// Register the caller for `seats` seats of an event.
///
/// Answers in `extras` are validated before anything is read. Then, in one
/// transaction holding the event row lock:
/// 1. Lock the event (serializes every registration for it)
/// 2. Reject a second registration by the same attendee
/// 3. Reject organizer accounts, then the event's own organizer
/// 4. Ask the capacity ledger to admit `seats` and price them
/// 5. Insert the approved registration and bump the committed-seat counter
///
/// After commit the ticket is issued and attached. Issuance problems are
/// logged and leave the registration in place without ticket fields.
pub async fn register(
    actor: Actor,
    event_id: EventId,
    seats: i32,
    extras: RegistrationExtras,
    deps: &ServerDeps,
) -> TicketingResult<Registration> {
    info!(%event_id, attendee_id = %actor.user_id, seats, "Registering for event");

    let extras = extras.validated()?;

    let mut tx = deps.db_pool.begin().await?;

    let event = Event::lock_for_update(event_id, &mut *tx)
        .await?
        .ok_or_else(|| TicketingError::not_found("Event not found"))?;

    if Registration::exists_for(event_id, actor.user_id, &mut *tx).await? {
        debug!(%event_id, attendee_id = %actor.user_id, "Duplicate registration rejected");
        return Err(Conflict::AlreadyRegistered.into());
    }

    // The stored account role is authoritative over the token's.
    let attendee = User::find_by_id(actor.user_id, &mut *tx)
        .await?
        .ok_or_else(|| TicketingError::not_found("User not found"))?;
    Actor::new(attendee.id, attendee.role)
        .can(Capability::RegisterForEvents)
        .check()?;

    if event.is_organized_by(attendee.id) {
        return Err(TicketingError::forbidden(
            "You cannot register for your own event",
        ));
    }

    let ledger = CapacityLedger::for_event(&event).admit(i64::from(seats))?;
    let total_amount = total_amount(seats, event.ticket_price)?;

    let new = NewRegistration {
        id: RegistrationId::new(),
        event_id,
        attendee_id: attendee.id,
        number_of_seats: seats,
        total_amount,
        status: RegistrationStatus::Approved,
        extras,
    };

    let registration = Registration::insert(new, &mut *tx).await.map_err(|e| {
        if is_duplicate_registration(&e) {
            TicketingError::from(Conflict::AlreadyRegistered)
        } else {
            TicketingError::from(e)
        }
    })?;

    let committed = Event::adjust_committed_seats(event_id, seats, &mut *tx).await?;
    debug_assert_eq!(i64::from(committed), ledger.committed());

    tx.commit().await?;

    info!(
        registration_id = %registration.id,
        %event_id,
        seats_committed = committed,
        "Registration committed"
    );

    Ok(issue_ticket(registration, &event, &attendee, deps).await)
}

/// Issue and attach the ticket for a committed registration. Never fails:
/// on any error the registration is returned as it was.
pub(crate) async fn issue_ticket(
    registration: Registration,
    event: &Event,
    attendee: &User,
    deps: &ServerDeps,
) -> Registration {
    let registration_id = registration.id;
    let data = TicketData::from_registration(&registration, event, attendee);

    let issued = match tokio::task::spawn_blocking(move || tickets::issue(&data)).await {
        Ok(Ok(issued)) => issued,
        Ok(Err(e)) => {
            warn!(%registration_id, error = %e, "Ticket issuance failed");
            return registration;
        }
        Err(e) => {
            warn!(%registration_id, error = %e, "Ticket issuance task panicked");
            return registration;
        }
    };

    if issued.document_status == DocumentStatus::Placeholder {
        warn!(%registration_id, "Registration holds a placeholder ticket document");
    }

    let document_ref = match deps
        .ticket_store
        .put(&issued.document, PDF_CONTENT_TYPE)
        .await
    {
        Ok(reference) => Some(reference),
        Err(e) => {
            warn!(%registration_id, error = %e, "Failed to store ticket document");
            None
        }
    };

    match Registration::attach_ticket(
        registration_id,
        &issued.qr_code,
        document_ref.as_deref(),
        &deps.db_pool,
    )
    .await
    {
        Ok(updated) => {
            debug!(%registration_id, "Ticket attached");
            updated
        }
        Err(e) => {
            warn!(%registration_id, error = %e, "Failed to attach ticket");
            registration
        }
    }
}
