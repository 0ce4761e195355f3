use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use sitecrm_core::site_context::SiteContext;
use sitecrm_db::repositories::{SessionRepo, UserRepo};
use sitecrm_wp::ClientRegistry;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sitecrm_api::auth::bootstrap::ensure_admin;
use sitecrm_api::auth::session::MySqlSessionStore;
use sitecrm_api::auth::site_login::SiteLogins;
use sitecrm_api::config::{AdminBootstrap, ServerConfig};
use sitecrm_api::router::build_app_router;
use sitecrm_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sitecrm_api=debug,sitecrm_wp=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = %config.port,
        legacy_site = config.wp.legacy_url.as_deref().unwrap_or("<none>"),
        global_credential = config.wp.global_credential.is_some(),
        token_expiry_hours = ?config.jwt.expiry_hours,
        "Loaded server configuration"
    );

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = sitecrm_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    sitecrm_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    sitecrm_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- First-run admin ---
    match AdminBootstrap::from_env() {
        Some(admin) => {
            ensure_admin(&pool, &admin)
                .await
                .expect("Failed to create bootstrap admin");
        }
        None => {
            let users = UserRepo::count(&pool).await.expect("Failed to count users");
            if users == 0 {
                tracing::warn!(
                    "No users exist and ADMIN_USERNAME/ADMIN_PASSWORD are unset; nobody can log in"
                );
            }
        }
    }

    match SessionRepo::purge_inactive(&pool).await {
        Ok(purged) => tracing::info!(purged, "Purged inactive sessions"),
        Err(e) => tracing::warn!(error = %e, "Failed to purge inactive sessions"),
    }

    // --- Site state ---
    let site_context = Arc::new(SiteContext::new());
    let site_logins = Arc::new(SiteLogins::new(chrono::Duration::minutes(
        config.site_login_ttl_mins,
    )));

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .build()
        .expect("Failed to build HTTP client");
    let clients = Arc::new(ClientRegistry::new(http));

    // Drop cached site clients whenever a user's current site changes.
    let evictions_handle = tokio::spawn(Arc::clone(&clients).run_evictions(site_context.subscribe()));

    // --- App state ---
    let state = AppState {
        sessions: Arc::new(MySqlSessionStore::new(pool.clone())),
        pool,
        config: Arc::new(config.clone()),
        site_context: Arc::clone(&site_context),
        site_logins,
        clients,
    };

    let app = build_app_router(state);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    // The router (and its state) is gone; dropping the last context closes the
    // event channel and lets the eviction task finish.
    drop(site_context);
    let _ = tokio::time::timeout(Duration::from_secs(5), evictions_handle).await;

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT (Ctrl-C) or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
