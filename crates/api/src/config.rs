use crate::auth::jwt::JwtConfig;

/// Email domain members must sign in with unless overridden.
pub const DEFAULT_EMAIL_DOMAIN: &str = "youngmuslims.com";

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long in-flight background saves get to finish after the server
    /// stops accepting connections (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Wizard sessions unused for this long are dropped (default: `1800`).
    pub wizard_idle_timeout_secs: u64,
    /// Members whose email is outside this domain are signed out.
    pub allowed_email_domain: String,
    /// Session token verification.
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`| `30`                       |
    /// | `WIZARD_IDLE_TIMEOUT_SECS` | `1800`                 |
    /// | `ALLOWED_EMAIL_DOMAIN` | `youngmuslims.com`         |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let wizard_idle_timeout_secs: u64 = std::env::var("WIZARD_IDLE_TIMEOUT_SECS")
            .unwrap_or_else(|_| "1800".into())
            .parse()
            .expect("WIZARD_IDLE_TIMEOUT_SECS must be a valid u64");

        let allowed_email_domain = std::env::var("ALLOWED_EMAIL_DOMAIN")
            .map(|d| d.trim().trim_start_matches('@').to_lowercase())
            .ok()
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| DEFAULT_EMAIL_DOMAIN.to_string());

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            wizard_idle_timeout_secs,
            allowed_email_domain,
            jwt,
        }
    }
}
