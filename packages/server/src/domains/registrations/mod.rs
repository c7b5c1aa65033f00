//! Registrations domain - seat reservation, check-in and cancellation
//!
//! Responsibilities:
//! - Admission against the capacity ledger under the event row lock
//! - Ticket issuance for committed registrations
//! - Door check-in owned by the event's organizer
//! - Attendee and organizer read models

pub mod actions;
pub mod models;

pub use models::registration::{
    Participant, Registration, RegistrationDetail, RegistrationExtras, RegistrationStatus,
};
