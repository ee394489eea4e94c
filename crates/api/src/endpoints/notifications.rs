//! Notification endpoints.

use axum::{extract::State, routing::post, Json, Router};
use encore_common::AppResult;
use encore_db::entities::notification::{
    Model as NotificationModel, NotificationState, NotificationSubject,
};
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// List notifications request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListNotificationsRequest {
    /// Maximum results (default: 10, max: 100)
    #[serde(default = "default_limit")]
    pub limit: u64,
}

const fn default_limit() -> u64 {
    10
}

/// Notification response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    pub id: String,
    pub subject: NotificationSubject,
    pub state: NotificationState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_id: Option<String>,
    pub created_at: String,
    pub expires_at: String,
}

impl From<NotificationModel> for NotificationResponse {
    fn from(n: NotificationModel) -> Self {
        Self {
            id: n.id,
            subject: n.subject,
            state: n.state,
            artist_id: n.artist_id,
            game_id: n.game_id,
            release_id: n.release_id,
            created_at: n.created_at.to_rfc3339(),
            expires_at: n.expires_at.to_rfc3339(),
        }
    }
}

/// Active notifications for the authenticated user, newest first.
///
/// Only active notifications surface here; expired and retracted ones
/// stay stored but never reach the dashboard.
async fn list_notifications(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ListNotificationsRequest>,
) -> AppResult<ApiResponse<Vec<NotificationResponse>>> {
    let limit = req.limit.min(100);
    let notifications = state.lifecycle_service.active_for_user(&user.id, limit).await?;
    Ok(ApiResponse::ok(
        notifications.into_iter().map(Into::into).collect(),
    ))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(list_notifications))
}
