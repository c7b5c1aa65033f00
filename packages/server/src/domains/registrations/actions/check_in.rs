//! Check-in actions - door check-in run by the event's organizer
//!
//! Both actions lock the registration row (`FOR UPDATE OF r`) together with
//! the organizer lookup, so the ownership check and the write are one unit.

use tracing::info;

use crate::common::{Actor, Conflict, RegistrationId, TicketingError, TicketingResult};
use crate::domains::registrations::models::registration::{
    LockedRegistration, Registration, RegistrationStatus,
};
use crate::kernel::ServerDeps;

async fn lock_owned(
    registration_id: RegistrationId,
    actor: Actor,
    tx: &mut sqlx::PgConnection,
) -> TicketingResult<LockedRegistration> {
    let locked = Registration::lock_with_organizer(registration_id, tx)
        .await?
        .ok_or_else(|| TicketingError::not_found("Registration not found"))?;

    if locked.organizer_id != actor.user_id {
        return Err(TicketingError::forbidden(
            "Only the event organizer can check in attendees",
        ));
    }

    Ok(locked)
}

fn ensure_admissible(registration: &Registration) -> TicketingResult<()> {
    match registration.status {
        RegistrationStatus::Approved | RegistrationStatus::Pending => Ok(()),
        RegistrationStatus::Rejected | RegistrationStatus::Cancelled => {
            Err(TicketingError::validation(
                "registration_id",
                format!(
                    "registration is {} and cannot be checked in",
                    registration.status.as_str()
                ),
            ))
        }
    }
}

/// One-way check-in, as when scanning a ticket at the door.
///
/// A second scan fails with `AlreadyCheckedIn` and leaves the original
/// check-in time untouched.
pub async fn process_check_in(
    registration_id: RegistrationId,
    actor: Actor,
    deps: &ServerDeps,
) -> TicketingResult<Registration> {
    let mut tx = deps.db_pool.begin().await?;
    let locked = lock_owned(registration_id, actor, &mut tx).await?;

    if locked.registration.check_in_status {
        return Err(Conflict::AlreadyCheckedIn.into());
    }
    ensure_admissible(&locked.registration)?;

    let updated = Registration::set_check_in(registration_id, true, &mut *tx).await?;
    tx.commit().await?;

    info!(%registration_id, organizer_id = %actor.user_id, "Attendee checked in");
    Ok(updated)
}

/// Flip the check-in state; used by organizers to correct mistakes.
pub async fn toggle_check_in(
    registration_id: RegistrationId,
    actor: Actor,
    deps: &ServerDeps,
) -> TicketingResult<Registration> {
    let mut tx = deps.db_pool.begin().await?;
    let locked = lock_owned(registration_id, actor, &mut tx).await?;

    let checked_in = !locked.registration.check_in_status;
    if checked_in {
        ensure_admissible(&locked.registration)?;
    }

    let updated = Registration::set_check_in(registration_id, checked_in, &mut *tx).await?;
    tx.commit().await?;

    info!(
        %registration_id,
        organizer_id = %actor.user_id,
        checked_in,
        "Check-in toggled"
    );
    Ok(updated)
}
