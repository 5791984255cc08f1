//! # Bankly Storage - SQLite Backend
//!
//! SQLite implementation of the query backend. Owns the connection pool and
//! the users-table migration; all business logic lives above this layer.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Column, Row as _, TypeInfo};
use tracing::{debug, info};

use bankly_storage::{QueryBackend, Row, SqlValue, StorageError};

/// SQL schema for the users table.
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    username   TEXT PRIMARY KEY,
    password   TEXT NOT NULL,
    first_name TEXT NOT NULL,
    last_name  TEXT NOT NULL,
    email      TEXT NOT NULL,
    phone      TEXT NOT NULL,
    admin      BOOLEAN NOT NULL DEFAULT FALSE
)
"#;

/// SQLite query backend.
///
/// The database lives in a single file at `{base_path}/{name}.db`.
#[derive(Clone)]
pub struct SqliteBackend {
    pool: SqlitePool,
    #[allow(dead_code)]
    db_path: PathBuf,
}

impl SqliteBackend {
    /// Opens or creates a SQLite database.
    ///
    /// # Arguments
    ///
    /// * `base_path` - Directory where the database file is stored
    /// * `name` - Database name (must match `[a-z0-9_-]+`)
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The database name is invalid
    /// - The directory cannot be created
    /// - The database connection fails
    pub async fn open(base_path: impl AsRef<Path>, name: &str) -> Result<Self, StorageError> {
        Self::validate_name(name)?;

        let base = base_path.as_ref();
        std::fs::create_dir_all(base).map_err(|e| {
            StorageError::ConnectionFailed(format!("failed to create directory: {e}"))
        })?;

        let db_path = base.join(format!("{name}.db"));
        let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

        debug!(name = %name, path = %db_path.display(), "Opening SQLite database");

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&db_url)
            .await
            .map_err(|e| StorageError::ConnectionFailed(e.to_string()))?;

        let backend = Self { pool, db_path };

        backend.migrate().await?;

        info!(name = %name, "SQLite backend ready");

        Ok(backend)
    }

    /// Validates that a database name is safe to embed in a file path.
    ///
    /// Only allows: lowercase letters, digits, underscore, hyphen.
    fn validate_name(name: &str) -> Result<(), StorageError> {
        if name.is_empty() || name.len() > 64 {
            return Err(StorageError::ConnectionFailed(
                "database name must be 1-64 characters".into(),
            ));
        }

        let valid = name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-');

        if !valid {
            return Err(StorageError::ConnectionFailed(
                "database name must match [a-z0-9_-]+".into(),
            ));
        }

        Ok(())
    }

    /// Runs database migrations.
    async fn migrate(&self) -> Result<(), StorageError> {
        debug!("Running database migrations");

        sqlx::query(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::ConnectionFailed(format!("migration failed: {e}")))?;

        debug!("Migrations complete");

        Ok(())
    }
}

/// Decodes one SQLite result row into backend-neutral column values.
fn decode_row(row: &SqliteRow) -> Result<Row, StorageError> {
    let mut columns = Vec::with_capacity(row.columns().len());

    for (idx, column) in row.columns().iter().enumerate() {
        let value = match column.type_info().name() {
            "NULL" => SqlValue::Null,
            "INTEGER" | "INT8" => row
                .try_get::<Option<i64>, _>(idx)
                .map(SqlValue::from)
                .map_err(|e| StorageError::QueryFailed(e.to_string()))?,
            "BOOLEAN" => row
                .try_get::<Option<bool>, _>(idx)
                .map(SqlValue::from)
                .map_err(|e| StorageError::QueryFailed(e.to_string()))?,
            "REAL" => row
                .try_get::<Option<f64>, _>(idx)
                .map(|v| match v {
                    Some(f) => SqlValue::Real(f),
                    None => SqlValue::Null,
                })
                .map_err(|e| StorageError::QueryFailed(e.to_string()))?,
            _ => row
                .try_get::<Option<String>, _>(idx)
                .map(SqlValue::from)
                .map_err(|e| StorageError::QueryFailed(e.to_string()))?,
        };

        columns.push((column.name().to_string(), value));
    }

    Ok(Row::new(columns))
}

#[async_trait]
impl QueryBackend for SqliteBackend {
    async fn query(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>, StorageError> {
        let mut query = sqlx::query(sql);

        // SQLite treats `$1`, `$2`, ... as distinct parameters in order of
        // first appearance, so positional binding lines up with the
        // placeholder numbers.
        for param in params {
            query = match param {
                SqlValue::Null => query.bind(None::<String>),
                SqlValue::Bool(b) => query.bind(*b),
                SqlValue::Integer(i) => query.bind(*i),
                SqlValue::Real(f) => query.bind(*f),
                SqlValue::Text(s) => query.bind(s.clone()),
            };
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;

        rows.iter().map(decode_row).collect()
    }
}
