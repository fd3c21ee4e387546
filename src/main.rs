use interview_prep::{
    AppState,
    auth::issue_token,
    config::{AppConfig, Env},
    create_router,
    repository::{InMemoryRepository, RepositoryState, SAMPLE_ADMIN_USER, SAMPLE_STANDARD_USER},
};
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Loads configuration, sets up logging, seeds the question store and serves
/// the HTTP API.
#[tokio::main]
async fn main() {
    // 1. Configuration (fail-fast on missing production secrets).
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging. RUST_LOG wins over the defaults below.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "interview_prep=debug,tower_http=info".into());

    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            // JSON lines for the log aggregator.
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    // 3. Question store.
    let repo = match &config.seed_path {
        Some(path) => {
            tracing::info!(path = %path, "loading questions from seed file");
            InMemoryRepository::from_path(path).expect("FATAL: Failed to load QUESTIONS_SEED_PATH.")
        }
        None => {
            tracing::info!("no seed file configured, using the built-in sample set");
            InMemoryRepository::sample()
        }
    };
    let repo = Arc::new(repo) as RepositoryState;

    // LOCAL-ONLY: print ready-made tokens for the sample users.
    if config.env == Env::Local && config.seed_path.is_none() {
        for (label, user_id) in [("standard", SAMPLE_STANDARD_USER), ("admin", SAMPLE_ADMIN_USER)] {
            match issue_token(user_id, &config.jwt_secret, Duration::from_secs(60 * 60 * 8)) {
                Ok(token) => tracing::info!(%user_id, "sample {} token: Bearer {}", label, token),
                Err(e) => tracing::warn!(error = %e, "could not sign sample {} token", label),
            }
        }
    }

    let bind_addr = config.bind_addr.clone();
    let app = create_router(AppState { repo, config });

    // 4. Serve.
    let listener = TcpListener::bind(&bind_addr)
        .await
        .expect("FATAL: Failed to bind BIND_ADDR.");

    tracing::info!("Listening on {}", bind_addr);
    tracing::info!("API Documentation (Swagger UI) available at: http://{}/swagger-ui", bind_addr);

    axum::serve(listener, app).await.expect("FATAL: HTTP server error.");
}
