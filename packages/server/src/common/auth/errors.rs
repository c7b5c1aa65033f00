use thiserror::Error;

use super::{Capability, Role};

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Authentication required")]
    AuthenticationRequired,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("{role} accounts cannot {capability}")]
    NotPermitted { role: Role, capability: Capability },
}
