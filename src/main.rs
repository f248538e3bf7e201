use nz_walks_api::{
    AppState,
    config::{AppConfig, Env},
    create_router,
    credentials::CredentialStore,
    repository::{InMemoryUserStore, PostgresRepository},
    seed::{DEFAULT_USERS, seed_users},
    token::TokenIssuer,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Startup sequence: configuration, logging, token issuer, storage, seeding, server.
/// Any failure before the server is listening is fatal.
#[tokio::main]
async fn main() {
    // 1. Configuration (fail-fast on missing production secrets)
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging: pretty locally, JSON in production. RUST_LOG overrides the filter.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "nz_walks_api=debug,tower_http=info,axum=trace".into());

    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    // 3. Token issuer. An absent or malformed signing key stops the process here.
    let tokens = TokenIssuer::new(&config.jwt)
        .unwrap_or_else(|e| panic!("FATAL: invalid JWT configuration: {e}"));

    // 4. Storage: Postgres when DATABASE_URL is set, otherwise in-memory (local only).
    let app_state = match config.db_url.clone() {
        Some(db_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(&db_url)
                .await
                .expect("FATAL: Failed to connect to Postgres. Check DATABASE_URL.");

            let repo = PostgresRepository::new(pool);
            repo.migrate()
                .await
                .expect("FATAL: Failed to run database migrations.");

            AppState::postgres(repo, tokens)
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory repositories");
            AppState::in_memory(Arc::new(InMemoryUserStore::new()), tokens)
        }
    };

    // 5. Development accounts
    if config.seed_default_users {
        let store: &dyn CredentialStore = app_state.users.as_ref();
        match seed_users(store, &DEFAULT_USERS).await {
            Ok(created) => tracing::info!(created, "default users seeded"),
            Err(e) => panic!("FATAL: Failed to seed default users: {e}"),
        }
    }

    // 6. Router and server
    let app = create_router(app_state);

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .unwrap_or_else(|e| panic!("FATAL: Failed to bind {}: {e}", config.bind_addr));

    tracing::info!("Listening on {}", config.bind_addr);
    tracing::info!(
        "API Documentation (Swagger UI) available at: http://{}/swagger-ui",
        config.bind_addr
    );

    axum::serve(listener, app)
        .await
        .expect("FATAL: HTTP server terminated unexpectedly");
}
