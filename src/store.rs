//! The persistence gateway: every read and write of the persons table
//! goes through [`PersonStore`]. Nothing else in the crate holds
//! storage state.

use crate::error::StoreError;
use crate::person::{NewPerson, Person, PersonChanges, PersonFilter};
use sqlx::PgPool;
use uuid::Uuid;

/// Pool-backed gateway over the single `persons` table. Cloning shares
/// the underlying pool.
#[derive(Clone)]
pub struct PersonStore {
    pool: PgPool,
}

impl PersonStore {
    pub fn new(pool: PgPool) -> Self {
        PersonStore { pool }
    }

    /// One round trip to the engine, used by the readiness probe.
    pub async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }

    /// Whether the table holds no rows at all. The list operation runs
    /// this before filtering (collection-level existence check).
    pub async fn is_empty(&self) -> Result<bool, StoreError> {
        let row: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM persons)")
            .fetch_one(&self.pool)
            .await?;
        Ok(!row.0)
    }

    /// All rows matching the filter, in storage order. Each supplied
    /// term matches as a case-insensitive substring; both terms are
    /// ANDed when present.
    pub async fn find_all(&self, filter: &PersonFilter) -> Result<Vec<Person>, StoreError> {
        let (sql, patterns) = select_sql(filter);
        tracing::debug!(sql = %sql, params = ?patterns, "query");
        let mut query = sqlx::query_as::<_, Person>(&sql);
        for pattern in &patterns {
            query = query.bind(pattern);
        }
        Ok(query.fetch_all(&self.pool).await?)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Person>, StoreError> {
        let person = sqlx::query_as::<_, Person>(
            "SELECT id, first_name, name FROM persons WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(person)
    }

    /// Assign a fresh id, persist the record, return it as stored.
    pub async fn insert(&self, draft: &NewPerson) -> Result<Person, StoreError> {
        let id = Uuid::new_v4();
        let person = sqlx::query_as::<_, Person>(
            "INSERT INTO persons (id, first_name, name) VALUES ($1, $2, $3) \
             RETURNING id, first_name, name",
        )
        .bind(id)
        .bind(&draft.first_name)
        .bind(&draft.name)
        .fetch_one(&self.pool)
        .await?;
        Ok(person)
    }

    /// Overwrite only the supplied fields. The `version` column is the
    /// concurrency token: a write that raced a concurrent change
    /// updates zero rows, after which existence decides between
    /// `Conflict` and `NotFound`.
    pub async fn update(&self, id: Uuid, changes: &PersonChanges) -> Result<(), StoreError> {
        let current: Option<(String, String, i64)> = sqlx::query_as(
            "SELECT first_name, name, version FROM persons WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        let (first_name, name, version) = current.ok_or(StoreError::NotFound)?;

        let first_name = changes.first_name.as_deref().unwrap_or(&first_name);
        let name = changes.name.as_deref().unwrap_or(&name);

        let result = sqlx::query(
            "UPDATE persons SET first_name = $2, name = $3, version = version + 1, \
             updated_at = NOW() WHERE id = $1 AND version = $4",
        )
        .bind(id)
        .bind(first_name)
        .bind(name)
        .bind(version)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            let exists: (bool,) =
                sqlx::query_as("SELECT EXISTS(SELECT 1 FROM persons WHERE id = $1)")
                    .bind(id)
                    .fetch_one(&self.pool)
                    .await?;
            return Err(if exists.0 {
                StoreError::Conflict
            } else {
                StoreError::NotFound
            });
        }
        Ok(())
    }

    /// Remove the row permanently.
    pub async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM persons WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

/// SELECT for `find_all`: the base statement plus one ILIKE clause per
/// supplied filter term.
fn select_sql(filter: &PersonFilter) -> (String, Vec<String>) {
    let mut sql = String::from("SELECT id, first_name, name FROM persons");
    let mut patterns: Vec<String> = Vec::new();
    for (column, term) in [
        ("first_name", filter.first_name.as_deref()),
        ("name", filter.name.as_deref()),
    ] {
        if let Some(term) = term {
            patterns.push(contains_pattern(term));
            let connector = if patterns.len() == 1 { "WHERE" } else { "AND" };
            sql.push_str(&format!(" {} {} ILIKE ${}", connector, column, patterns.len()));
        }
    }
    (sql, patterns)
}

/// Escape LIKE wildcards in the user's term and wrap it for substring
/// matching. Backslash is PostgreSQL's default escape character.
fn contains_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}
