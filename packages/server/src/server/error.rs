//! HTTP mapping for `TicketingError`.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::error;

use crate::common::TicketingError;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<&'static str, String>>,
}

pub fn status_for(err: &TicketingError) -> StatusCode {
    match err {
        TicketingError::Validation { .. } => StatusCode::BAD_REQUEST,
        TicketingError::Conflict(_) => StatusCode::CONFLICT,
        TicketingError::Forbidden(_) => StatusCode::FORBIDDEN,
        TicketingError::NotFound(_) => StatusCode::NOT_FOUND,
        TicketingError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
        TicketingError::PartialFailure { .. } | TicketingError::DependencyFailure(_) => {
            StatusCode::BAD_GATEWAY
        }
        TicketingError::Database(_) | TicketingError::Internal(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for TicketingError {
    fn into_response(self) -> Response {
        let status = status_for(&self);

        // Storage details stay in the logs.
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = ?self, "Request failed");
        }

        let fields = match &self {
            TicketingError::Validation { field, message } => {
                Some(BTreeMap::from([(*field, message.clone())]))
            }
            _ => None,
        };

        let body = ErrorBody {
            code: self.code(),
            error: self.to_string(),
            fields,
        };

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for TicketingError {
    fn from(rejection: JsonRejection) -> Self {
        TicketingError::validation("body", rejection.body_text())
    }
}
