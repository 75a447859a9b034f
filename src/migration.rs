//! Startup DDL: create the database if missing, then the persons table.
//! This is idempotent bootstrap, not a versioned migration mechanism.

use crate::error::StoreError;
use sqlx::ConnectOptions;
use sqlx::PgPool;
use std::str::FromStr;

/// Ensure the database in `database_url` exists; create it if not.
/// Connects to the default `postgres` database to run CREATE DATABASE.
/// Call before opening the main pool.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), StoreError> {
    let (admin_url, db_name) = split_database_url(database_url);
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url)?;
    let mut conn: sqlx::PgConnection = opts.connect().await?;
    let exists: (bool,) =
        sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
            .bind(&db_name)
            .fetch_one(&mut conn)
            .await?;
    if !exists.0 {
        tracing::info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

/// Create the persons table when absent. The version column is the
/// optimistic-concurrency token; it never leaves the gateway.
pub async fn apply_migrations(pool: &PgPool) -> Result<(), StoreError> {
    tracing::info!("ensuring persons table");
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS persons (
            id UUID PRIMARY KEY,
            first_name TEXT NOT NULL,
            name TEXT NOT NULL,
            version BIGINT NOT NULL DEFAULT 1,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

/// Split a connection URL into the admin URL (same server, `postgres`
/// database) and the target database name. A URL with no path yields an
/// empty name, which callers treat as nothing to do.
fn split_database_url(url: &str) -> (String, String) {
    match url.rfind('/') {
        Some(pos) => {
            let base = &url[..pos + 1];
            let db_name = url[pos + 1..].split('?').next().unwrap_or("").trim();
            (format!("{}postgres", base), db_name.to_string())
        }
        None => (url.to_string(), String::new()),
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
