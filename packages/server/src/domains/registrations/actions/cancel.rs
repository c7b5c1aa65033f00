//! Cancel action - release a registration's seats

use tracing::info;

use crate::common::{Actor, Conflict, RegistrationId, TicketingError, TicketingResult};
use crate::domains::events::Event;
use crate::domains::registrations::models::registration::{Registration, RegistrationStatus};
use crate::kernel::ServerDeps;

/// Cancel a registration. Allowed for the attendee who holds it, the event's
/// organizer and admins.
///
/// Lock order matches `register`: event row first, then the registration,
/// so a cancel and a registration for the same event never deadlock.
pub async fn cancel_registration(
    registration_id: RegistrationId,
    actor: Actor,
    deps: &ServerDeps,
) -> TicketingResult<Registration> {
    let event_id = Registration::find_by_id(registration_id, &deps.db_pool)
        .await?
        .map(|r| r.event_id)
        .ok_or_else(|| TicketingError::not_found_or_unauthorized("Registration"))?;

    let mut tx = deps.db_pool.begin().await?;

    let event = Event::lock_for_update(event_id, &mut *tx)
        .await?
        .ok_or_else(|| TicketingError::not_found_or_unauthorized("Registration"))?;
    let registration = Registration::lock_for_update(registration_id, &mut *tx)
        .await?
        .ok_or_else(|| TicketingError::not_found_or_unauthorized("Registration"))?;

    let permitted = actor.is_admin()
        || registration.attendee_id == actor.user_id
        || event.is_organized_by(actor.user_id);
    if !permitted {
        return Err(TicketingError::not_found_or_unauthorized("Registration"));
    }

    if registration.status == RegistrationStatus::Cancelled {
        return Err(Conflict::AlreadyCancelled.into());
    }

    let updated =
        Registration::set_status(registration_id, RegistrationStatus::Cancelled, &mut *tx).await?;

    let committed = if registration.status.holds_seats() {
        Event::adjust_committed_seats(event_id, -registration.number_of_seats, &mut *tx).await?
    } else {
        event.seats_committed
    };

    tx.commit().await?;

    info!(
        %registration_id,
        %event_id,
        cancelled_by = %actor.user_id,
        seats_committed = committed,
        "Registration cancelled"
    );
    Ok(updated)
}
