//! Manual trigger endpoints.
//!
//! Each trigger runs its job inline and answers with the job's counts.
//! A second trigger for the same key while one is in flight gets 409
//! `ALREADY_RUNNING`; that is an answer, not an error to retry blindly.

use axum::{extract::State, routing::post, Json, Router};
use chrono::Utc;
use encore_common::AppResult;
use encore_core::{
    keys,
    role_gate::{authorize, Operation, UserRole},
    UpdateScope,
};
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Stats update request. Scope narrows from all artists down to one.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsUpdateRequest {
    /// Update only this artist.
    pub artist_id: Option<String>,
    /// Update every artist this user follows.
    pub user_id: Option<String>,
}

impl StatsUpdateRequest {
    fn scope(self) -> UpdateScope {
        match (self.artist_id, self.user_id) {
            (Some(artist_id), _) => UpdateScope::Artist(artist_id),
            (None, Some(user_id)) => UpdateScope::User(user_id),
            (None, None) => UpdateScope::All,
        }
    }
}

/// Stats update response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsUpdateResponse {
    pub updated_count: u64,
    pub failed_count: u64,
}

/// Trigger a stats update over the requested scope.
async fn stats_update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<StatsUpdateRequest>,
) -> AppResult<ApiResponse<StatsUpdateResponse>> {
    authorize(UserRole::from_tag(&user.role), Operation::TriggerStatsUpdate)?;
    let summary = state.artist_service.update_stats(req.scope()).await?;
    Ok(ApiResponse::ok(StatsUpdateResponse {
        updated_count: summary.updated_count,
        failed_count: summary.failed_count,
    }))
}

/// Cleanup response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupResponse {
    pub cleaned_count: u64,
}

/// Trigger the expiry sweep.
async fn cleanup_expired(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<CleanupResponse>> {
    authorize(UserRole::from_tag(&user.role), Operation::TriggerCleanup)?;
    let cleaned_count = state
        .coordinator
        .run_exclusive(keys::CLEANUP_EXPIRED, async {
            state.lifecycle_service.sweep_expired(Utc::now()).await
        })
        .await?;
    Ok(ApiResponse::ok(CleanupResponse { cleaned_count }))
}

/// Trigger the false-positive sweep.
async fn cleanup_false_positives(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<CleanupResponse>> {
    authorize(UserRole::from_tag(&user.role), Operation::TriggerCleanup)?;
    let cleaned_count = state
        .coordinator
        .run_exclusive(keys::CLEANUP_FALSE_POSITIVE, async {
            state.lifecycle_service.sweep_false_positives().await
        })
        .await?;
    Ok(ApiResponse::ok(CleanupResponse { cleaned_count }))
}

/// Game scan response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameScanResponse {
    pub notified_count: u64,
}

/// Trigger a scan for games whose release date has arrived.
async fn game_release_scan(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<GameScanResponse>> {
    authorize(UserRole::from_tag(&user.role), Operation::TriggerStatsUpdate)?;
    let notified_count = state.game_service.scan_releases(Utc::now()).await?;
    Ok(ApiResponse::ok(GameScanResponse { notified_count }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stats-update", post(stats_update))
        .route("/cleanup-expired", post(cleanup_expired))
        .route("/cleanup-false-positives", post(cleanup_false_positives))
        .route("/game-scan", post(game_release_scan))
}
