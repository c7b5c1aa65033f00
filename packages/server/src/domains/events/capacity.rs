//! Capacity ledger - the sole authority on admission decisions.
//!
//! The ledger is a pure view over an event's limit and its committed seats.
//! It never reads or writes storage; the registration workflow builds one
//! from an event row it holds locked and applies the decision itself.

use thiserror::Error;

use super::models::event::Event;
use crate::common::{Conflict, TicketingError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CapacityRejection {
    #[error("number of seats must be at least 1, got {requested}")]
    InvalidSeatCount { requested: i64 },

    #[error("Only {available} seats available")]
    Insufficient { available: i64 },

    #[error("number of seats is too large")]
    SeatCountTooLarge { requested: i64 },
}

impl From<CapacityRejection> for TicketingError {
    fn from(rejection: CapacityRejection) -> Self {
        match rejection {
            CapacityRejection::InvalidSeatCount { .. }
            | CapacityRejection::SeatCountTooLarge { .. } => {
                TicketingError::validation("number_of_seats", rejection.to_string())
            }
            CapacityRejection::Insufficient { available } => {
                Conflict::CapacityExceeded { available }.into()
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityLedger {
    max_attendees: Option<i64>,
    committed: i64,
}

impl CapacityLedger {
    /// `max_attendees = None` means unlimited. A limit of zero admits nobody.
    pub fn new(max_attendees: Option<i32>, committed: i64) -> Self {
        Self {
            max_attendees: max_attendees.map(i64::from),
            committed,
        }
    }

    pub fn for_event(event: &Event) -> Self {
        Self::new(event.max_attendees, i64::from(event.seats_committed))
    }

    pub fn committed(&self) -> i64 {
        self.committed
    }

    /// Seats still open, or `None` when the event is unlimited. Can be
    /// negative if the organizer lowered the limit after seats were sold.
    pub fn available_seats(&self) -> Option<i64> {
        self.max_attendees.map(|max| max - self.committed)
    }

    pub fn check_availability(&self, requested_seats: i64) -> Result<(), CapacityRejection> {
        if requested_seats < 1 {
            return Err(CapacityRejection::InvalidSeatCount {
                requested: requested_seats,
            });
        }

        // The committed-seat counter is an INTEGER column.
        match self.committed.checked_add(requested_seats) {
            Some(total) if total <= i64::from(i32::MAX) => {}
            _ => {
                return Err(CapacityRejection::SeatCountTooLarge {
                    requested: requested_seats,
                })
            }
        }

        match self.max_attendees {
            None => Ok(()),
            Some(max) if self.committed + requested_seats <= max => Ok(()),
            Some(max) => Err(CapacityRejection::Insufficient {
                available: (max - self.committed).max(0),
            }),
        }
    }

    /// Ledger after admitting `seats`.
    pub fn admit(self, seats: i64) -> Result<Self, CapacityRejection> {
        self.check_availability(seats)?;
        Ok(Self {
            committed: self.committed + seats,
            ..self
        })
    }
}
