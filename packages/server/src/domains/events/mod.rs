//! Events domain - event rows and the capacity ledger
//!
//! Event CRUD belongs to the organizer tooling; this domain exposes what the
//! registration workflow needs: a lockable event row and a pure ledger that
//! decides admission.

pub mod capacity;
pub mod models;

pub use capacity::{CapacityLedger, CapacityRejection};
pub use models::event::{Event, EventStatus, NewEvent, PublicationStatus};
