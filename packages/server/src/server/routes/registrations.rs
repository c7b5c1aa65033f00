//! Registration endpoints

use axum::{
    extract::{Extension, Path},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use crate::common::{EventId, RegistrationId, TicketingError};
use crate::domains::registrations::actions::{
    cancel_registration, download_ticket, event_participants, get_registration,
    list_user_registrations, register, EventParticipants,
};
use crate::domains::registrations::{Registration, RegistrationDetail, RegistrationExtras};
use crate::server::app::AppState;
use crate::server::extract::JsonBody;
use crate::server::middleware::AuthUser;

fn one_seat() -> i32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default = "one_seat")]
    pub number_of_seats: i32,
    #[serde(flatten)]
    pub extras: RegistrationExtras,
}

pub async fn register_handler(
    Extension(state): Extension<AppState>,
    AuthUser(actor): AuthUser,
    Path(event_id): Path<EventId>,
    JsonBody(body): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, Json<Registration>), TicketingError> {
    let registration =
        register(actor, event_id, body.number_of_seats, body.extras, &state.deps).await?;
    Ok((StatusCode::CREATED, Json(registration)))
}

pub async fn get_registration_handler(
    Extension(state): Extension<AppState>,
    AuthUser(actor): AuthUser,
    Path(registration_id): Path<RegistrationId>,
) -> Result<Json<RegistrationDetail>, TicketingError> {
    Ok(Json(get_registration(registration_id, actor, &state.deps).await?))
}

pub async fn download_ticket_handler(
    Extension(state): Extension<AppState>,
    AuthUser(actor): AuthUser,
    Path(registration_id): Path<RegistrationId>,
) -> Result<impl IntoResponse, TicketingError> {
    let ticket = download_ticket(registration_id, actor, &state.deps).await?;

    Ok((
        [
            (header::CONTENT_TYPE, ticket.content_type),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", ticket.filename),
            ),
        ],
        ticket.bytes,
    ))
}

pub async fn cancel_registration_handler(
    Extension(state): Extension<AppState>,
    AuthUser(actor): AuthUser,
    Path(registration_id): Path<RegistrationId>,
) -> Result<Json<Registration>, TicketingError> {
    Ok(Json(
        cancel_registration(registration_id, actor, &state.deps).await?,
    ))
}

pub async fn my_registrations_handler(
    Extension(state): Extension<AppState>,
    AuthUser(actor): AuthUser,
) -> Result<Json<Vec<RegistrationDetail>>, TicketingError> {
    Ok(Json(
        list_user_registrations(actor.user_id, &state.deps).await?,
    ))
}

pub async fn event_participants_handler(
    Extension(state): Extension<AppState>,
    AuthUser(actor): AuthUser,
    Path(event_id): Path<EventId>,
) -> Result<Json<EventParticipants>, TicketingError> {
    Ok(Json(event_participants(event_id, actor, &state.deps).await?))
}
