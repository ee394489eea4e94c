//! Artist endpoints.

use axum::{extract::State, routing::post, Json, Router};
use encore_common::AppResult;
use encore_core::{
    role_gate::{authorize, Operation, UserRole},
    FollowArtistInput,
};
use encore_db::entities::{artist, platform_link::Platform};
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Artist response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistResponse {
    pub id: String,
    pub name: String,
    pub total_followers: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_popularity: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_release_at: Option<String>,
    pub created_at: String,
}

impl From<artist::Model> for ArtistResponse {
    fn from(a: artist::Model) -> Self {
        Self {
            id: a.id,
            name: a.name,
            total_followers: a.total_followers,
            average_popularity: a.average_popularity,
            last_release_at: a.last_release_at.map(|t| t.to_rfc3339()),
            created_at: a.created_at.to_rfc3339(),
        }
    }
}

/// List the artists the authenticated user follows.
async fn list_artists(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<ArtistResponse>>> {
    let artists = state.artist_service.list(&user.id).await?;
    Ok(ApiResponse::ok(artists.into_iter().map(Into::into).collect()))
}

/// Search request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchArtistsRequest {
    pub platform: Platform,
    pub query: String,
}

/// Search result entry.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistSearchResponse {
    pub platform: Platform,
    pub platform_artist_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub followers: Option<i64>,
}

/// Search a platform for artists to follow.
async fn search_artists(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<SearchArtistsRequest>,
) -> AppResult<ApiResponse<Vec<ArtistSearchResponse>>> {
    let hits = state.artist_service.search(req.platform, &req.query).await?;
    Ok(ApiResponse::ok(
        hits.into_iter()
            .map(|h| ArtistSearchResponse {
                platform: h.platform,
                platform_artist_id: h.platform_artist_id,
                name: h.name,
                followers: h.followers,
            })
            .collect(),
    ))
}

/// Follow an artist.
async fn follow_artist(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<FollowArtistInput>,
) -> AppResult<ApiResponse<ArtistResponse>> {
    authorize(UserRole::from_tag(&user.role), Operation::Add)?;
    let artist = state.artist_service.follow(&user.id, req).await?;
    Ok(ApiResponse::ok(artist.into()))
}

/// Link an additional platform request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkPlatformRequest {
    pub artist_id: String,
    pub platform: Platform,
    pub platform_artist_id: String,
}

/// Link an additional platform to a followed artist.
async fn link_platform(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<LinkPlatformRequest>,
) -> AppResult<ApiResponse<ArtistResponse>> {
    authorize(UserRole::from_tag(&user.role), Operation::Add)?;
    let artist = state
        .artist_service
        .link_platform(&user.id, &req.artist_id, req.platform, &req.platform_artist_id)
        .await?;
    Ok(ApiResponse::ok(artist.into()))
}

/// Unfollow request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnfollowArtistRequest {
    pub artist_id: String,
}

/// Unfollow an artist.
async fn unfollow_artist(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UnfollowArtistRequest>,
) -> AppResult<ApiResponse<()>> {
    authorize(UserRole::from_tag(&user.role), Operation::Remove)?;
    state.artist_service.unfollow(&user.id, &req.artist_id).await?;
    Ok(ApiResponse::ok(()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(list_artists))
        .route("/search", post(search_artists))
        .route("/follow", post(follow_artist))
        .route("/link", post(link_platform))
        .route("/unfollow", post(unfollow_artist))
}
