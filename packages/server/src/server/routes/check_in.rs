//! Check-in endpoints

use axum::{
    extract::{Extension, Path},
    Json,
};
use serde::Deserialize;

use crate::common::{RegistrationId, TicketingError};
use crate::domains::registrations::actions::{process_check_in, toggle_check_in};
use crate::domains::registrations::Registration;
use crate::server::app::AppState;
use crate::server::extract::JsonBody;
use crate::server::middleware::AuthUser;

#[derive(Debug, Deserialize)]
pub struct CheckInRequest {
    /// Scanned QR content.
    pub registration_id: RegistrationId,
}

pub async fn check_in_handler(
    Extension(state): Extension<AppState>,
    AuthUser(actor): AuthUser,
    JsonBody(body): JsonBody<CheckInRequest>,
) -> Result<Json<Registration>, TicketingError> {
    Ok(Json(
        process_check_in(body.registration_id, actor, &state.deps).await?,
    ))
}

pub async fn toggle_check_in_handler(
    Extension(state): Extension<AppState>,
    AuthUser(actor): AuthUser,
    Path(registration_id): Path<RegistrationId>,
) -> Result<Json<Registration>, TicketingError> {
    Ok(Json(
        toggle_check_in(registration_id, actor, &state.deps).await?,
    ))
}
