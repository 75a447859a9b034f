//! Service settings from the environment. `main` loads `.env` first via
//! dotenvy, so every value can also live in a local env file.

/// Bind address when `PERSONS_BIND_ADDR` is unset.
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
/// Pool size when `PERSONS_MAX_CONNECTIONS` is unset or unparsable.
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Clone, Debug)]
pub struct ServiceConfig {
    pub database_url: String,
    pub bind_addr: String,
    pub max_connections: u32,
}

impl ServiceConfig {
    /// Read `DATABASE_URL`, `PERSONS_BIND_ADDR` and
    /// `PERSONS_MAX_CONNECTIONS`, falling back to defaults suited to a
    /// local PostgreSQL.
    pub fn from_env() -> ServiceConfig {
        ServiceConfig {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://localhost/persons".into()),
            bind_addr: std::env::var("PERSONS_BIND_ADDR")
                .unwrap_or_else(|_| DEFAULT_BIND_ADDR.into()),
            max_connections: std::env::var("PERSONS_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MAX_CONNECTIONS),
        }
    }
}
