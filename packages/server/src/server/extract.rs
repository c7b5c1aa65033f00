//! Request extractors that reject with `TicketingError` bodies.

use axum::extract::FromRequest;

use crate::common::TicketingError;

/// `axum::Json` whose rejections surface as validation errors.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(TicketingError))]
pub struct JsonBody<T>(pub T);
