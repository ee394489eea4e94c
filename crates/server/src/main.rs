//! Encore server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{middleware, Router};
use encore_api::{middleware::AppState, router as api_router};
use encore_common::Config;
use encore_core::{
    ArtistService, GameService, HttpPlatformGateway, NotificationLifecycleService,
    PlatformGateway, ReleaseDetector, UpdateCoordinator,
};
use encore_db::repositories::{
    ArtistRepository, GameRepository, JobLockRepository, NotificationRepository,
    PlatformLinkRepository, ReleaseRepository, UserRepository,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "encore=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting encore server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database
    let db = encore_db::init(&config).await?;
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    encore_db::migrate(&db).await?;
    info!("Migrations completed");

    // Initialize repositories
    let db = Arc::new(db);
    let user_repo = UserRepository::new(Arc::clone(&db));
    let artist_repo = ArtistRepository::new(Arc::clone(&db));
    let link_repo = PlatformLinkRepository::new(Arc::clone(&db));
    let release_repo = ReleaseRepository::new(Arc::clone(&db));
    let game_repo = GameRepository::new(Arc::clone(&db));
    let notification_repo = NotificationRepository::new(Arc::clone(&db));
    let lock_repo = JobLockRepository::new(Arc::clone(&db));

    // Initialize the platform gateway
    let gateway: Arc<dyn PlatformGateway> = Arc::new(HttpPlatformGateway::new(
        &config.platforms.function_url,
        config.platforms.timeout_secs,
    )?);
    info!(url = %config.platforms.function_url, "Platform gateway ready");

    // Initialize services
    let coordinator = UpdateCoordinator::new(lock_repo, config.tracking.stale_lock_secs);
    let detector = ReleaseDetector::new(release_repo.clone(), notification_repo.clone());
    let artist_service = ArtistService::new(
        artist_repo.clone(),
        link_repo,
        gateway,
        detector,
        coordinator.clone(),
        config.tracking.notification_ttl_days,
    );
    let game_service = GameService::new(
        game_repo.clone(),
        notification_repo.clone(),
        coordinator.clone(),
        config.tracking.notification_ttl_days,
    );
    let lifecycle_service = NotificationLifecycleService::new(
        notification_repo,
        artist_repo,
        game_repo,
        release_repo,
    );

    // Create app state
    let state = AppState {
        user_repo,
        artist_service,
        game_service,
        lifecycle_service,
        coordinator,
    };

    // Build router
    let app = Router::new()
        .nest("/api", api_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            encore_api::middleware::auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
