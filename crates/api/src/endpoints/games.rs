//! Game endpoints.

use axum::{extract::State, routing::post, Json, Router};
use encore_common::AppResult;
use encore_core::{
    role_gate::{authorize, Operation, UserRole},
    FollowGameInput,
};
use encore_db::entities::game::{self, Storefront};
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Game response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameResponse {
    pub id: String,
    pub name: String,
    pub storefront: Storefront,
    pub storefront_game_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    pub notified: bool,
    pub created_at: String,
}

impl From<game::Model> for GameResponse {
    fn from(g: game::Model) -> Self {
        Self {
            id: g.id,
            name: g.name,
            storefront: g.storefront,
            storefront_game_id: g.storefront_game_id,
            release_date: g.release_date.map(|t| t.to_rfc3339()),
            notified: g.notified,
            created_at: g.created_at.to_rfc3339(),
        }
    }
}

/// List the games the authenticated user follows.
async fn list_games(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<GameResponse>>> {
    let games = state.game_service.list(&user.id).await?;
    Ok(ApiResponse::ok(games.into_iter().map(Into::into).collect()))
}

/// Follow a game.
async fn follow_game(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<FollowGameInput>,
) -> AppResult<ApiResponse<GameResponse>> {
    authorize(UserRole::from_tag(&user.role), Operation::Add)?;
    let game = state.game_service.follow(&user.id, req).await?;
    Ok(ApiResponse::ok(game.into()))
}

/// Unfollow request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnfollowGameRequest {
    pub game_id: String,
}

/// Unfollow a game.
async fn unfollow_game(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UnfollowGameRequest>,
) -> AppResult<ApiResponse<()>> {
    authorize(UserRole::from_tag(&user.role), Operation::Remove)?;
    state.game_service.unfollow(&user.id, &req.game_id).await?;
    Ok(ApiResponse::ok(()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(list_games))
        .route("/follow", post(follow_game))
        .route("/unfollow", post(unfollow_game))
}
