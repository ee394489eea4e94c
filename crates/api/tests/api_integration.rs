//! API integration tests.
//!
//! Exercise the router end to end over a mock database: bearer auth,
//! role gating on the trigger routes and the busy-trigger answer.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    middleware as axum_middleware, Router,
};
use chrono::Utc;
use encore_api::{middleware::auth_middleware, router as api_router, AppState};
use encore_core::{
    ArtistService, GameService, InMemoryPlatformGateway, NotificationLifecycleService,
    ReleaseDetector, UpdateCoordinator,
};
use encore_db::{
    entities::user,
    repositories::{
        ArtistRepository, GameRepository, JobLockRepository, NotificationRepository,
        PlatformLinkRepository, ReleaseRepository, UserRepository,
    },
};
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};
use std::sync::Arc;
use tower::ServiceExt;

fn exec(rows_affected: u64) -> MockExecResult {
    MockExecResult {
        last_insert_id: 0,
        rows_affected,
    }
}

fn test_user(role: &str) -> user::Model {
    user::Model {
        id: "u1".to_string(),
        username: "casey".to_string(),
        display_name: None,
        role: role.to_string(),
        api_token: "token-1".to_string(),
        created_at: Utc::now().into(),
    }
}

/// Build the app the way the server wires it, over a mock connection.
fn create_app(db: DatabaseConnection) -> Router {
    let db = Arc::new(db);

    let user_repo = UserRepository::new(Arc::clone(&db));
    let artist_repo = ArtistRepository::new(Arc::clone(&db));
    let link_repo = PlatformLinkRepository::new(Arc::clone(&db));
    let release_repo = ReleaseRepository::new(Arc::clone(&db));
    let game_repo = GameRepository::new(Arc::clone(&db));
    let notification_repo = NotificationRepository::new(Arc::clone(&db));
    let lock_repo = JobLockRepository::new(Arc::clone(&db));

    let coordinator = UpdateCoordinator::new(lock_repo, 600);
    let detector = ReleaseDetector::new(release_repo.clone(), notification_repo.clone());
    let gateway = Arc::new(InMemoryPlatformGateway::new());

    let artist_service = ArtistService::new(
        artist_repo.clone(),
        link_repo,
        gateway,
        detector,
        coordinator.clone(),
        7,
    );
    let game_service = GameService::new(
        game_repo.clone(),
        notification_repo.clone(),
        coordinator.clone(),
        7,
    );
    let lifecycle_service = NotificationLifecycleService::new(
        notification_repo,
        artist_repo,
        game_repo,
        release_repo,
    );

    let state = AppState {
        user_repo,
        artist_service,
        game_service,
        lifecycle_service,
        coordinator,
    };

    Router::new()
        .nest("/api", api_router())
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .with_state(state)
}

fn authed_post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, "Bearer token-1")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let app = create_app(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/artists")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_viewer_denied_cleanup_trigger() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[test_user("viewer")]])
        .into_connection();
    let app = create_app(db);

    let response = app
        .oneshot(authed_post("/api/triggers/cleanup-expired", ""))
        .await
        .unwrap();

    // denied before the sweep or its lock is touched
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_editor_denied_cleanup_but_allowed_stats_update() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[test_user("editor")]])
        .into_connection();
    let app = create_app(db);

    let response = app
        .oneshot(authed_post("/api/triggers/cleanup-false-positives", ""))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_unrecognized_role_denied_mutation() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[test_user("superuser")]])
        .into_connection();
    let app = create_app(db);

    let response = app
        .oneshot(authed_post(
            "/api/artists/unfollow",
            r#"{"artistId":"a1"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_cleanup_expired_reports_count() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[test_user("admin")]])
        // stale lock delete, lock acquire, expiry update, lock release
        .append_exec_results([exec(0), exec(1), exec(2), exec(1)])
        .into_connection();
    let app = create_app(db);

    let response = app
        .oneshot(authed_post("/api/triggers/cleanup-expired", ""))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["data"]["cleanedCount"], 2);
}

#[tokio::test]
async fn test_concurrent_trigger_answers_already_running() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[test_user("admin")]])
        // stale lock delete, then the acquire hits the held lock
        .append_exec_results([exec(0), exec(0)])
        .into_connection();
    let app = create_app(db);

    let response = app
        .oneshot(authed_post("/api/triggers/cleanup-expired", ""))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"]["code"], "ALREADY_RUNNING");
}

#[tokio::test]
async fn test_active_notifications_listed_for_viewer() {
    use encore_db::entities::notification;
    use encore_db::entities::notification::{NotificationState, NotificationSubject};

    let now = Utc::now();
    let n = notification::Model {
        id: "n1".to_string(),
        user_id: "u1".to_string(),
        subject: NotificationSubject::ArtistRelease,
        artist_id: Some("a1".to_string()),
        game_id: None,
        release_id: Some("r1".to_string()),
        state: NotificationState::Active,
        created_at: now.into(),
        expires_at: (now + chrono::Duration::days(7)).into(),
    };

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[test_user("viewer")]])
        .append_query_results([[n]])
        .into_connection();
    let app = create_app(db);

    let response = app
        .oneshot(authed_post("/api/notifications", r#"{"limit":10}"#))
        .await
        .unwrap();

    // reads are open to every authenticated role
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["data"][0]["subject"], "artistRelease");
    assert_eq!(body["data"][0]["state"], "active");
}
