//! Registration domain actions - business logic functions
//!
//! Actions are async functions called directly from the HTTP routes. They take
//! the authenticated `Actor` and `&ServerDeps` and return `TicketingResult<T>`.

mod cancel;
mod check_in;
mod queries;
mod register;

pub use cancel::cancel_registration;
pub use check_in::{process_check_in, toggle_check_in};
pub use queries::{
    download_ticket, event_participants, get_registration, list_user_registrations,
    EventParticipants, ParticipantSummary, TicketDownload,
};
pub use register::register;
