use anyhow::Context;
use profile_api::auth::AuthKeys;
use profile_api::github::GitHubClient;
use profile_api::storage::DocumentStore;
use profile_api::{AppConfig, AppState, router};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    info!("🚀 Starting Profile API Server");

    // Load configuration
    let config = AppConfig::load()?;
    info!("📋 Configuration loaded");
    info!("   - Server: {}:{}", config.server.host, config.server.port);
    info!("   - GitHub API: {}", config.github.api_base);
    if config.github.token.is_none() {
        warn!("   - No GitHub token configured, requests are rate limited");
    }

    // Initialize document store
    info!("💾 Initializing document store...");
    let store = match &config.storage.data_path {
        Some(path) => DocumentStore::open(path)
            .with_context(|| format!("Failed to open store at {}", path.display()))?,
        None => {
            info!("   - No data_path set, documents are kept in memory only");
            DocumentStore::in_memory()
        }
    };
    let store = Arc::new(store);
    let stats = store.stats().await;
    info!(
        "✅ Document store ready ({} profiles, {} users, {} posts)",
        stats.profiles, stats.users, stats.posts
    );

    let github = GitHubClient::new(&config.github).context("Failed to build GitHub client")?;

    // Create application state
    let state = AppState {
        store: store.clone(),
        github: Arc::new(github),
        auth: Arc::new(AuthKeys::new(
            &config.auth.jwt_secret,
            Duration::from_secs(config.auth.token_ttl_secs),
        )),
        gravatar: Arc::new(config.gravatar.clone()),
    };

    let app = router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    );

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("🌐 Server listening on http://{}", addr);
    info!("");
    info!("📡 Available endpoints:");
    info!("   GET    /health                          - Health check");
    info!("   GET    /api/profile/me                  - Own profile");
    info!("   POST   /api/profile                     - Create or update profile");
    info!("   GET    /api/profile                     - All profiles");
    info!("   GET    /api/profile/user/:user_id       - Profile by user");
    info!("   DELETE /api/profile                     - Delete profile, user & posts");
    info!("   PUT    /api/profile/experience          - Add experience");
    info!("   DELETE /api/profile/experience/:exp_id  - Remove experience");
    info!("   PUT    /api/profile/education           - Add education");
    info!("   DELETE /api/profile/education/:edu_id   - Remove education");
    info!("   GET    /api/profile/github/:username    - Latest GitHub repos");
    info!("");
    info!("✨ Server is ready to accept requests!");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Flush store on graceful shutdown
    info!("💾 Flushing document store before shutdown...");
    if store.flush().await.is_ok() {
        info!("✅ Store flushed");
    } else {
        warn!("⚠️  Failed to flush store");
    }

    info!("👋 Server shutting down gracefully");

    Ok(())
}

/// Graceful shutdown handler
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("🛑 Shutdown signal received");
}
