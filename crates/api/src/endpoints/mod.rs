//! API endpoints.

mod artists;
mod games;
mod notifications;
mod triggers;
mod users;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/artists", artists::router())
        .nest("/games", games::router())
        .nest("/notifications", notifications::router())
        .nest("/triggers", triggers::router())
        .nest("/users", users::router())
}
