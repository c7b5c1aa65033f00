//! Registration query actions
//!
//! Query actions return data directly; none of them write except the ticket
//! backfill in `download_ticket`.

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, warn};

use crate::common::{
    Actor, Capability, EventId, RegistrationId, TicketingError, TicketingResult, UserId,
};
use crate::domains::events::{CapacityLedger, Event};
use crate::domains::registrations::models::registration::{
    Participant, Registration, RegistrationDetail,
};
use crate::domains::tickets::{self, TicketData, PDF_CONTENT_TYPE};
use crate::domains::users::User;
use crate::kernel::ServerDeps;

fn can_view(detail: &RegistrationDetail, actor: Actor) -> bool {
    actor.can(Capability::ViewAnyRegistration).check().is_ok()
        || detail.registration.attendee_id == actor.user_id
        || detail.organizer_id == actor.user_id
}

/// Registration detail including QR and document reference. Visible to the
/// attendee, the event's organizer and admins.
pub async fn get_registration(
    registration_id: RegistrationId,
    actor: Actor,
    deps: &ServerDeps,
) -> TicketingResult<RegistrationDetail> {
    let detail = Registration::find_detail(registration_id, &deps.db_pool)
        .await?
        .filter(|detail| can_view(detail, actor))
        .ok_or_else(|| TicketingError::not_found_or_unauthorized("Registration"))?;

    Ok(detail)
}

/// Every registration held by an attendee, newest first.
pub async fn list_user_registrations(
    attendee_id: UserId,
    deps: &ServerDeps,
) -> TicketingResult<Vec<RegistrationDetail>> {
    Ok(Registration::list_for_attendee(attendee_id, &deps.db_pool).await?)
}

#[derive(Debug, Clone, Serialize)]
pub struct ParticipantSummary {
    pub total_seats_booked: i64,
    pub max_attendees: Option<i32>,
    /// `None` for unlimited events.
    pub available_seats: Option<i64>,
    pub registrations_count: usize,
    pub checked_in_count: usize,
    pub total_revenue: Decimal,
}

impl ParticipantSummary {
    pub fn from_participants(event: &Event, participants: &[Participant]) -> Self {
        let live = participants.iter().filter(|p| p.status.holds_seats());

        Self {
            total_seats_booked: live.clone().map(|p| i64::from(p.number_of_seats)).sum(),
            max_attendees: event.max_attendees,
            available_seats: CapacityLedger::for_event(event).available_seats(),
            registrations_count: participants.len(),
            checked_in_count: participants.iter().filter(|p| p.check_in_status).count(),
            total_revenue: live.map(|p| p.total_amount).sum(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EventParticipants {
    pub event_id: EventId,
    pub participants: Vec<Participant>,
    pub summary: ParticipantSummary,
}

/// Participant list with booking summary. Organizer of the event (or admin) only.
pub async fn event_participants(
    event_id: EventId,
    actor: Actor,
    deps: &ServerDeps,
) -> TicketingResult<EventParticipants> {
    actor.can(Capability::ManageOwnEvents).check()?;

    let event = Event::find_by_id(event_id, &deps.db_pool)
        .await?
        .filter(|event| actor.is_admin() || event.is_organized_by(actor.user_id))
        .ok_or_else(|| TicketingError::not_found_or_unauthorized("Event"))?;

    let participants = Registration::list_participants(event_id, &deps.db_pool).await?;
    let summary = ParticipantSummary::from_participants(&event, &participants);

    debug!(
        %event_id,
        registrations = summary.registrations_count,
        seats = summary.total_seats_booked,
        "Loaded participants"
    );

    Ok(EventParticipants {
        event_id,
        participants,
        summary,
    })
}

#[derive(Debug, Clone)]
pub struct TicketDownload {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// The ticket PDF for a registration.
///
/// Served from the ticket store when a document was stored at issuance.
/// Otherwise the ticket is rendered again and, best effort, stored for next
/// time.
pub async fn download_ticket(
    registration_id: RegistrationId,
    actor: Actor,
    deps: &ServerDeps,
) -> TicketingResult<TicketDownload> {
    let detail = get_registration(registration_id, actor, deps).await?;
    let filename = format!("ticket-{}.pdf", registration_id);

    if let Some(reference) = detail.registration.ticket_document.as_deref() {
        match deps.ticket_store.get(reference).await {
            Ok(artifact) => {
                return Ok(TicketDownload {
                    filename,
                    content_type: artifact.content_type,
                    bytes: artifact.bytes,
                })
            }
            Err(e) => {
                warn!(%registration_id, error = %e, "Stored ticket unreadable, re-rendering");
            }
        }
    }

    let event = Event::find_by_id(detail.registration.event_id, &deps.db_pool)
        .await?
        .ok_or_else(|| TicketingError::not_found("Event not found"))?;
    let attendee = User::find_by_id(detail.registration.attendee_id, &deps.db_pool)
        .await?
        .ok_or_else(|| TicketingError::not_found("User not found"))?;

    let data = TicketData::from_registration(&detail.registration, &event, &attendee);
    let issued = tokio::task::spawn_blocking(move || tickets::issue(&data))
        .await
        .map_err(|e| TicketingError::DependencyFailure(e.to_string()))?
        .map_err(|e| TicketingError::DependencyFailure(e.to_string()))?;

    match deps.ticket_store.put(&issued.document, PDF_CONTENT_TYPE).await {
        Ok(reference) => {
            if let Err(e) =
                Registration::set_ticket_document(registration_id, &reference, &deps.db_pool).await
            {
                warn!(%registration_id, error = %e, "Failed to backfill ticket document");
            }
        }
        Err(e) => warn!(%registration_id, error = %e, "Failed to store re-rendered ticket"),
    }

    Ok(TicketDownload {
        filename,
        content_type: PDF_CONTENT_TYPE.to_string(),
        bytes: issued.document,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{Role, UserId};
    use crate::domains::events::{EventStatus, PublicationStatus};
    use crate::domains::registrations::models::registration::RegistrationStatus;
    use chrono::{NaiveDate, NaiveTime, Utc};
    use std::str::FromStr;

    fn event(max_attendees: Option<i32>, seats_committed: i32) -> Event {
        Event {
            id: EventId::new(),
            organizer_id: UserId::new(),
            title: "Open Mic".to_string(),
            description: String::new(),
            venue: "Student Union".to_string(),
            address: String::new(),
            event_date: NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
            event_time: NaiveTime::from_hms_opt(19, 0, 0).unwrap(),
            ticket_price: Decimal::from_str("12.50").unwrap(),
            max_attendees,
            seats_committed,
            status: EventStatus::Upcoming,
            publication_status: PublicationStatus::Published,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn participant(seats: i32, status: RegistrationStatus, checked_in: bool) -> Participant {
        Participant {
            registration_id: RegistrationId::new(),
            attendee_id: UserId::new(),
            username: "guest".to_string(),
            email: "guest@example.edu".to_string(),
            number_of_seats: seats,
            total_amount: Decimal::from_str("12.50").unwrap() * Decimal::from(seats),
            status,
            check_in_status: checked_in,
            check_in_time: checked_in.then(Utc::now),
            registration_date: Utc::now(),
            dietary_requirements: None,
            t_shirt_size: None,
        }
    }

    #[test]
    fn summary_ignores_released_seats() {
        let participants = vec![
            participant(2, RegistrationStatus::Approved, true),
            participant(1, RegistrationStatus::Approved, false),
            participant(3, RegistrationStatus::Cancelled, false),
        ];
        let summary = ParticipantSummary::from_participants(&event(Some(10), 3), &participants);

        assert_eq!(summary.total_seats_booked, 3);
        assert_eq!(summary.available_seats, Some(7));
        assert_eq!(summary.registrations_count, 3);
        assert_eq!(summary.checked_in_count, 1);
        assert_eq!(summary.total_revenue, Decimal::from_str("37.50").unwrap());
    }

    #[test]
    fn unlimited_event_has_no_available_count() {
        let summary = ParticipantSummary::from_participants(&event(None, 0), &[]);
        assert_eq!(summary.available_seats, None);
        assert_eq!(summary.total_revenue, Decimal::ZERO);
    }

    #[test]
    fn organizer_and_attendee_can_view_but_strangers_cannot() {
        let registration_owner = UserId::new();
        let organizer = UserId::new();
        let now = Utc::now();
        let detail = RegistrationDetail {
            registration: Registration {
                id: RegistrationId::new(),
                event_id: EventId::new(),
                attendee_id: registration_owner,
                number_of_seats: 1,
                total_amount: Decimal::ZERO,
                status: RegistrationStatus::Approved,
                dietary_requirements: None,
                t_shirt_size: None,
                additional_info: None,
                qr_code: None,
                ticket_document: None,
                check_in_status: false,
                check_in_time: None,
                registration_date: now,
            },
            event_title: "Open Mic".to_string(),
            event_date: NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
            event_time: NaiveTime::from_hms_opt(19, 0, 0).unwrap(),
            venue: "Student Union".to_string(),
            organizer_id: organizer,
            attendee_name: "guest".to_string(),
            attendee_email: "guest@example.edu".to_string(),
        };

        assert!(can_view(&detail, Actor::new(registration_owner, Role::Attendee)));
        assert!(can_view(&detail, Actor::new(organizer, Role::Organizer)));
        assert!(can_view(&detail, Actor::new(UserId::new(), Role::Admin)));
        assert!(!can_view(&detail, Actor::new(UserId::new(), Role::Attendee)));
        assert!(!can_view(&detail, Actor::new(UserId::new(), Role::Organizer)));
    }
}
