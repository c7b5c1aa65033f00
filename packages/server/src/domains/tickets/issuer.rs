//! Ticket issuance: QR payload plus printable document for one registration.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use qrcode::types::QrError;
use thiserror::Error;
use tracing::{debug, warn};

use super::document::{placeholder_pdf, render_ticket_pdf};
use super::qr::QrMatrix;
use crate::common::RegistrationId;
use crate::domains::events::Event;
use crate::domains::registrations::Registration;
use crate::domains::users::User;

#[derive(Debug, Error)]
pub enum TicketError {
    #[error("QR encoding failed: {0}")]
    Qr(#[from] QrError),

    #[error("QR image encoding failed: {0}")]
    Image(#[from] image::ImageError),
}

/// Everything printed on a ticket, frozen at issuance.
#[derive(Debug, Clone)]
pub struct TicketData {
    pub registration_id: RegistrationId,
    pub event_title: String,
    pub event_date: NaiveDate,
    pub event_time: NaiveTime,
    pub venue: String,
    pub attendee_name: String,
    pub attendee_email: String,
    pub number_of_seats: i32,
    pub dietary_requirements: Option<String>,
    pub t_shirt_size: Option<String>,
    pub registration_date: DateTime<Utc>,
}

impl TicketData {
    pub fn from_registration(registration: &Registration, event: &Event, attendee: &User) -> Self {
        Self {
            registration_id: registration.id,
            event_title: event.title.clone(),
            event_date: event.event_date,
            event_time: event.event_time,
            venue: event.venue.clone(),
            attendee_name: attendee.username.clone(),
            attendee_email: attendee.email.clone(),
            number_of_seats: registration.number_of_seats,
            dietary_requirements: registration.dietary_requirements.clone(),
            t_shirt_size: registration.t_shirt_size.clone(),
            registration_date: registration.registration_date,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentStatus {
    Rendered,
    /// Rendering failed; `document` holds the contact-support placeholder.
    Placeholder,
}

#[derive(Debug, Clone)]
pub struct IssuedTicket {
    /// PNG data URI of a QR code whose content is the registration id.
    pub qr_code: String,
    pub document: Vec<u8>,
    pub document_status: DocumentStatus,
}

pub fn issue(ticket: &TicketData) -> Result<IssuedTicket, TicketError> {
    issue_with(ticket, render_ticket_pdf)
}

/// Issue with a custom document renderer. A failing renderer degrades to the
/// placeholder document; only QR failures are errors.
pub fn issue_with<F>(ticket: &TicketData, render: F) -> Result<IssuedTicket, TicketError>
where
    F: FnOnce(&TicketData, &QrMatrix) -> anyhow::Result<Vec<u8>>,
{
    let qr = QrMatrix::encode(&ticket.registration_id.to_string())?;
    let qr_code = qr.to_data_uri()?;

    let (document, document_status) = match render(ticket, &qr) {
        Ok(bytes) => (bytes, DocumentStatus::Rendered),
        Err(e) => {
            warn!(
                registration_id = %ticket.registration_id,
                error = %e,
                "Ticket rendering failed, issuing placeholder document"
            );
            (placeholder_pdf(), DocumentStatus::Placeholder)
        }
    };

    debug!(
        registration_id = %ticket.registration_id,
        document_bytes = document.len(),
        "Ticket issued"
    );

    Ok(IssuedTicket {
        qr_code,
        document,
        document_status,
    })
}
