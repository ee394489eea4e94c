//! API middleware.

#![allow(missing_docs)]

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use encore_core::{ArtistService, GameService, NotificationLifecycleService, UpdateCoordinator};
use encore_db::repositories::UserRepository;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_repo: UserRepository,
    pub artist_service: ArtistService,
    pub game_service: GameService,
    pub lifecycle_service: NotificationLifecycleService,
    pub coordinator: UpdateCoordinator,
}

/// Authentication middleware.
///
/// Resolves the bearer token to a user and stashes it in the request
/// extensions. Routes requiring authentication reject through the
/// `AuthUser` extractor when nothing was resolved.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        if let Ok(Some(user)) = state.user_repo.find_by_api_token(token).await {
            req.extensions_mut().insert(user);
        }
    }

    next.run(req).await
}
