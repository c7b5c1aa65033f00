//! Error taxonomy shared by every ticketing operation.

use thiserror::Error;

use super::auth::AuthError;

/// Why a request conflicts with state already committed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Conflict {
    #[error("You are already registered for this event")]
    AlreadyRegistered,

    /// `available` is clamped at zero when an event's limit was lowered
    /// below what is already committed.
    #[error("Only {available} seats available")]
    CapacityExceeded { available: i64 },

    #[error("Already checked in")]
    AlreadyCheckedIn,

    #[error("Registration is already cancelled")]
    AlreadyCancelled,
}

#[derive(Debug, Error)]
pub enum TicketingError {
    #[error("Invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error(transparent)]
    Conflict(#[from] Conflict),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Unauthenticated(AuthError),

    /// Every expected notification recipient failed.
    #[error("Notification could not be delivered to any of {expected} recipients")]
    PartialFailure { expected: usize },

    #[error("Ticket artifact unavailable: {0}")]
    DependencyFailure(String),

    #[error("Database error")]
    Database(#[from] sqlx::Error),

    #[error("Internal error")]
    Internal(#[from] anyhow::Error),
}

impl TicketingError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Combined message for cross-tenant lookups where "missing" and
    /// "not yours" must look the same.
    pub fn not_found_or_unauthorized(what: &str) -> Self {
        Self::NotFound(format!("{} not found or unauthorized", what))
    }

    /// Stable machine-readable code for the transport layer.
    pub fn code(&self) -> &'static str {
        match self {
            TicketingError::Validation { .. } => "VALIDATION_ERROR",
            TicketingError::Conflict(Conflict::AlreadyRegistered) => "ALREADY_REGISTERED",
            TicketingError::Conflict(Conflict::CapacityExceeded { .. }) => "CAPACITY_EXCEEDED",
            TicketingError::Conflict(Conflict::AlreadyCheckedIn) => "ALREADY_CHECKED_IN",
            TicketingError::Conflict(Conflict::AlreadyCancelled) => "ALREADY_CANCELLED",
            TicketingError::Forbidden(_) => "FORBIDDEN",
            TicketingError::NotFound(_) => "NOT_FOUND",
            TicketingError::Unauthenticated(_) => "AUTH_ERROR",
            TicketingError::PartialFailure { .. } => "PARTIAL_FAILURE",
            TicketingError::DependencyFailure(_) => "DEPENDENCY_FAILURE",
            TicketingError::Database(_) => "DATABASE_ERROR",
            TicketingError::Internal(_) => "INTERNAL_SERVER_ERROR",
        }
    }
}

impl From<AuthError> for TicketingError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::NotPermitted { .. } => TicketingError::Forbidden(err.to_string()),
            AuthError::AuthenticationRequired | AuthError::InvalidToken => {
                TicketingError::Unauthenticated(err)
            }
        }
    }
}

pub type TicketingResult<T> = std::result::Result<T, TicketingError>;
