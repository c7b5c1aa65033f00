//! Tickets domain - turns a committed registration into its ticket artifacts
//!
//! Issuance is pure: it reads frozen registration data and returns a QR
//! payload plus a printable PDF. Persisting them is the caller's job.

pub mod data_uri;
pub mod document;
pub mod issuer;
pub mod qr;

pub use issuer::{issue, issue_with, DocumentStatus, IssuedTicket, TicketData, TicketError};
pub use qr::QrMatrix;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";
pub const PNG_CONTENT_TYPE: &str = "image/png";
