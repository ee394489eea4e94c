//! User endpoints.

use axum::{extract::State, routing::post, Json, Router};
use chrono::Utc;
use encore_common::{AppError, AppResult, IdGenerator};
use encore_core::role_gate::UserRole;
use encore_db::entities::user;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Create user request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 64))]
    pub username: String,
    #[validate(length(max = 128))]
    pub display_name: Option<String>,
    /// Role tag; anything outside the known set never grants access.
    pub role: String,
}

/// Created user response. The only time the token is shown.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserResponse {
    pub id: String,
    pub username: String,
    pub role: String,
    pub api_token: String,
}

/// Provision a user with a fresh API token. Admin only.
async fn create_user(
    AuthUser(caller): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> AppResult<ApiResponse<CreateUserResponse>> {
    if UserRole::from_tag(&caller.role) != UserRole::Admin {
        return Err(AppError::Forbidden("createUser".to_string()));
    }
    req.validate()?;

    let id_gen = IdGenerator::new();
    let created = state
        .user_repo
        .create(user::ActiveModel {
            id: Set(id_gen.generate()),
            username: Set(req.username),
            display_name: Set(req.display_name),
            role: Set(req.role),
            api_token: Set(id_gen.generate_token()),
            created_at: Set(Utc::now().into()),
        })
        .await?;

    Ok(ApiResponse::ok(CreateUserResponse {
        id: created.id,
        username: created.username,
        role: created.role,
        api_token: created.api_token,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/create", post(create_user))
}
