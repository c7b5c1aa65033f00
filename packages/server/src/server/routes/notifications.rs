//! Notification endpoints

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::common::{EventId, NotificationId, TicketingError, UserId};
use crate::domains::notifications::actions::{
    event_notifications, list_user_notifications, mark_notification_read, notify_event,
    send_notification, unread_count,
};
use crate::domains::notifications::{InboxEntry, Notification, NotificationType};
use crate::server::app::AppState;
use crate::server::extract::JsonBody;
use crate::server::middleware::AuthUser;

#[derive(Debug, Deserialize)]
pub struct EventNotificationRequest {
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub notification_type: NotificationType,
}

#[derive(Debug, Serialize)]
pub struct FanOutResponse {
    pub recipient_count: usize,
}

#[derive(Debug, Deserialize)]
pub struct DirectNotificationRequest {
    pub recipient_id: UserId,
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub notification_type: NotificationType,
    pub event_id: Option<EventId>,
}

#[derive(Debug, Deserialize)]
pub struct InboxQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct UnreadCountResponse {
    pub unread_count: i64,
}

pub async fn notify_event_handler(
    Extension(state): Extension<AppState>,
    AuthUser(actor): AuthUser,
    Path(event_id): Path<EventId>,
    JsonBody(body): JsonBody<EventNotificationRequest>,
) -> Result<Json<FanOutResponse>, TicketingError> {
    let recipient_count = notify_event(
        event_id,
        actor,
        &body.title,
        &body.message,
        body.notification_type,
        &state.deps,
    )
    .await?;
    Ok(Json(FanOutResponse { recipient_count }))
}

pub async fn event_notifications_handler(
    Extension(state): Extension<AppState>,
    AuthUser(actor): AuthUser,
    Path(event_id): Path<EventId>,
) -> Result<Json<Vec<Notification>>, TicketingError> {
    Ok(Json(event_notifications(event_id, actor, &state.deps).await?))
}

pub async fn send_notification_handler(
    Extension(state): Extension<AppState>,
    AuthUser(actor): AuthUser,
    JsonBody(body): JsonBody<DirectNotificationRequest>,
) -> Result<(StatusCode, Json<Notification>), TicketingError> {
    let notification = send_notification(
        actor,
        body.recipient_id,
        &body.title,
        &body.message,
        body.notification_type,
        body.event_id,
        &state.deps,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(notification)))
}

pub async fn inbox_handler(
    Extension(state): Extension<AppState>,
    AuthUser(actor): AuthUser,
    Query(query): Query<InboxQuery>,
) -> Result<Json<Vec<InboxEntry>>, TicketingError> {
    Ok(Json(
        list_user_notifications(actor.user_id, query.limit, query.offset, &state.deps).await?,
    ))
}

pub async fn unread_count_handler(
    Extension(state): Extension<AppState>,
    AuthUser(actor): AuthUser,
) -> Result<Json<UnreadCountResponse>, TicketingError> {
    Ok(Json(UnreadCountResponse {
        unread_count: unread_count(actor.user_id, &state.deps).await?,
    }))
}

pub async fn mark_read_handler(
    Extension(state): Extension<AppState>,
    AuthUser(actor): AuthUser,
    Path(notification_id): Path<NotificationId>,
) -> Result<Json<Notification>, TicketingError> {
    Ok(Json(
        mark_notification_read(notification_id, actor.user_id, &state.deps).await?,
    ))
}
