use std::env;

/// Fallback signing key used only when running in `Env::Local` without `JWT_KEY`.
const LOCAL_JWT_KEY: &str = "nz-walks-local-development-signing-key";
const DEFAULT_ISSUER: &str = "nz-walks-api";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// AppConfig
///
/// Holds the application's entire configuration state. Loaded once at startup and
/// never mutated afterwards. `main` consumes it to pick the logging format, the
/// storage backend, the token settings and the bind address.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Controls logging format, seeding and secret fallbacks.
    pub env: Env,
    // Postgres connection string. `None` selects the in-memory repositories.
    pub db_url: Option<String>,
    // Socket address the HTTP server binds to.
    pub bind_addr: String,
    // Token signing settings.
    pub jwt: JwtConfig,
    // Whether the default reader/writer accounts are created at startup.
    pub seed_default_users: bool,
}

/// JwtConfig
///
/// Symmetric key plus the issuer/audience pair stamped into, and required from,
/// every access token.
#[derive(Clone, Debug)]
pub struct JwtConfig {
    pub key: String,
    pub issuer: String,
    pub audience: String,
}

/// Env
///
/// Defines the runtime context, used to switch between development conveniences
/// (in-memory storage, seeded accounts, pretty logs) and production behaviour.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            key: LOCAL_JWT_KEY.to_string(),
            issuer: DEFAULT_ISSUER.to_string(),
            audience: DEFAULT_ISSUER.to_string(),
        }
    }
}

impl Default for AppConfig {
    /// default
    ///
    /// Provides a non-panicking configuration for test setup: local mode, no database,
    /// the development signing key and no seeding.
    fn default() -> Self {
        Self {
            env: Env::Local,
            db_url: None,
            bind_addr: "127.0.0.1:0".to_string(),
            jwt: JwtConfig::default(),
            seed_default_users: false,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables (call `dotenv` first).
    ///
    /// # Panics
    /// Panics if a variable required in `Env::Production` (`DATABASE_URL`, `JWT_KEY`)
    /// is missing, so the service never starts with an incomplete or insecure setup.
    pub fn load() -> Self {
        let env = match env::var("APP_ENV").as_deref() {
            Ok("production") => Env::Production,
            _ => Env::Local,
        };

        let key = match env {
            Env::Production => {
                env::var("JWT_KEY").expect("FATAL: JWT_KEY must be set in production.")
            }
            Env::Local => env::var("JWT_KEY").unwrap_or_else(|_| LOCAL_JWT_KEY.to_string()),
        };

        let db_url = match env {
            Env::Production => Some(
                env::var("DATABASE_URL").expect("FATAL: DATABASE_URL required in production"),
            ),
            Env::Local => env::var("DATABASE_URL").ok(),
        };

        let issuer = env::var("JWT_ISSUER").unwrap_or_else(|_| DEFAULT_ISSUER.to_string());
        let audience = env::var("JWT_AUDIENCE").unwrap_or_else(|_| issuer.clone());

        let seed_default_users = env::var("SEED_DEFAULT_USERS")
            .map(|value| matches!(value.as_str(), "1" | "true" | "yes"))
            .unwrap_or(env == Env::Local);

        Self {
            env,
            db_url,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            jwt: JwtConfig {
                key,
                issuer,
                audience,
            },
            seed_default_users,
        }
    }
}
