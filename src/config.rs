use std::env;

/// Fallback signing secret for local development and tests.
pub const LOCAL_JWT_SECRET: &str = "interview-prep-local-secret";

/// AppConfig
///
/// Holds the service configuration. Loaded once at startup and shared through
/// `AppState`; nothing mutates it afterwards.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Controls the local `x-user-id` bypass and log format.
    pub env: Env,
    // HMAC secret used to validate incoming bearer tokens.
    pub jwt_secret: String,
    // Socket address the HTTP listener binds to.
    pub bind_addr: String,
    // Optional JSON file with questions, users and a category catalog. The
    // built-in sample set is used when absent.
    pub seed_path: Option<String>,
}

/// Env
///
/// Local runs get developer conveniences; production runs get none of them.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// A non-panicking configuration for test setup.
    fn default() -> Self {
        Self {
            env: Env::Local,
            jwt_secret: LOCAL_JWT_SECRET.to_string(),
            bind_addr: "127.0.0.1:3000".to_string(),
            seed_path: None,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables.
    ///
    /// # Panics
    /// Panics in production when `JWT_SECRET` is not set, so the service never
    /// starts validating tokens against a known development secret.
    pub fn load() -> Self {
        let env = match env::var("APP_ENV").as_deref() {
            Ok("production") => Env::Production,
            _ => Env::Local,
        };

        let jwt_secret = match env {
            Env::Production => {
                env::var("JWT_SECRET").expect("FATAL: JWT_SECRET must be set in production.")
            }
            Env::Local => env::var("JWT_SECRET").unwrap_or_else(|_| LOCAL_JWT_SECRET.to_string()),
        };

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let seed_path = env::var("QUESTIONS_SEED_PATH")
            .ok()
            .filter(|path| !path.trim().is_empty());

        Self {
            env,
            jwt_secret,
            bind_addr,
            seed_path,
        }
    }
}
