//! # Bankly User Model
//!
//! The user credential lifecycle: register, authenticate, fetch, partial
//! update, delete. Talks to the relational store through the
//! [`QueryBackend`] seam and to password hashing through the
//! [`CredentialHasher`] seam, so both can be substituted in tests.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod hash;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use bankly_storage::{partial_update, QueryBackend, Row, SqlValue, StorageError};

pub use error::ModelError;
pub use hash::{Argon2Hasher, CredentialHasher};

/// Column list returned by every single-user statement.
const USER_COLUMNS: &str = "username, password, first_name, last_name, email, phone, admin";

/// An account holder.
///
/// `password` always holds the one-way hash once the record has been
/// persisted, never the original secret, and is skipped on serialization so
/// it cannot leak through API responses.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    /// Unique account identifier.
    pub username: String,
    /// Stored password hash (opaque to callers).
    #[serde(skip_serializing)]
    pub password: String,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Email address.
    pub email: String,
    /// Phone number.
    pub phone: String,
    /// Whether the user has admin rights.
    pub admin: bool,
}

impl User {
    /// Builds a user from a result row. Absent columns become empty strings
    /// (the list query omits the password column).
    fn from_row(row: &Row) -> Self {
        Self {
            username: row.text("username").unwrap_or_default().to_string(),
            password: row.text("password").unwrap_or_default().to_string(),
            first_name: row.text("first_name").unwrap_or_default().to_string(),
            last_name: row.text("last_name").unwrap_or_default().to_string(),
            email: row.text("email").unwrap_or_default().to_string(),
            phone: row.text("phone").unwrap_or_default().to_string(),
            admin: row.boolean("admin").unwrap_or(false),
        }
    }
}

/// Attributes for registering a new user.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    /// Unique account identifier.
    pub username: String,
    /// Plaintext password; hashed before it reaches storage.
    pub password: String,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Email address.
    pub email: String,
    /// Phone number.
    pub phone: String,
    /// Admin flag, false unless explicitly set.
    #[serde(default)]
    pub admin: bool,
}

/// The user model over an injected query backend and hasher.
#[derive(Clone)]
pub struct UserStore {
    db: Arc<dyn QueryBackend>,
    hasher: Arc<dyn CredentialHasher>,
}

impl UserStore {
    /// Creates a user store over the given backend and hasher.
    pub fn new(db: Arc<dyn QueryBackend>, hasher: Arc<dyn CredentialHasher>) -> Self {
        Self { db, hasher }
    }

    /// Registers a new user.
    ///
    /// Fails with [`ModelError::Conflict`] if the username is taken. The
    /// password is hashed before the record is persisted; the returned
    /// record carries the hash, which callers must treat as opaque.
    pub async fn register(&self, input: NewUser) -> Result<User, ModelError> {
        let existing = self
            .db
            .query(
                "SELECT username FROM users WHERE username = $1",
                &[SqlValue::from(input.username.as_str())],
            )
            .await?;

        if !existing.is_empty() {
            return Err(ModelError::Conflict(input.username));
        }

        let digest = self.hasher.hash(&input.password)?;

        let rows = self
            .db
            .query(
                &format!(
                    "INSERT INTO users (username, password, first_name, last_name, email, phone, admin) \
                     VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {USER_COLUMNS}"
                ),
                &[
                    SqlValue::from(input.username.as_str()),
                    SqlValue::from(digest),
                    SqlValue::from(input.first_name),
                    SqlValue::from(input.last_name),
                    SqlValue::from(input.email),
                    SqlValue::from(input.phone),
                    SqlValue::from(input.admin),
                ],
            )
            .await?;

        let row = rows.first().ok_or_else(|| {
            ModelError::Storage(StorageError::QueryFailed("insert returned no row".into()))
        })?;

        let user = User::from_row(row);
        info!(username = %user.username, "User registered");
        Ok(user)
    }

    /// Authenticates a user by username and plaintext password.
    ///
    /// A missing user and a wrong password both fail with
    /// [`ModelError::Unauthorized`]; callers cannot tell the two apart.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User, ModelError> {
        let rows = self
            .db
            .query(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1"),
                &[SqlValue::from(username)],
            )
            .await?;

        let user = rows.first().map(User::from_row);

        match user {
            Some(user) if self.hasher.verify(password, &user.password) => {
                debug!(username = %username, "Authentication succeeded");
                Ok(user)
            },
            _ => Err(ModelError::Unauthorized),
        }
    }

    /// Returns all users ordered by username.
    ///
    /// The payment-range parameters are accepted for interface compatibility
    /// but are not applied as filters; the full set is returned.
    pub async fn get_all(
        &self,
        _min_payments: Option<i64>,
        _max_payments: Option<i64>,
    ) -> Result<Vec<User>, ModelError> {
        let rows = self
            .db
            .query(
                "SELECT username, first_name, last_name, email, phone, admin \
                 FROM users ORDER BY username",
                &[],
            )
            .await?;

        Ok(rows.iter().map(User::from_row).collect())
    }

    /// Returns the single matching user.
    pub async fn get(&self, username: &str) -> Result<User, ModelError> {
        let rows = self
            .db
            .query(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1"),
                &[SqlValue::from(username)],
            )
            .await?;

        rows.first().map(User::from_row).ok_or(ModelError::NotFound)
    }

    /// Applies a partial update to the user keyed by `username`.
    ///
    /// Field names beginning with `_` are dropped by the statement builder.
    /// Fails with [`ModelError::NotFound`] if no row was updated.
    pub async fn update(
        &self,
        username: &str,
        fields: &[(String, SqlValue)],
    ) -> Result<User, ModelError> {
        let update = partial_update("users", fields, "username", SqlValue::from(username))?;

        let rows = self.db.query(&update.statement, &update.params).await?;

        let user = rows.first().map(User::from_row).ok_or(ModelError::NotFound)?;
        debug!(username = %username, "User updated");
        Ok(user)
    }

    /// Deletes the user keyed by `username`.
    ///
    /// Returns `true` on success; fails with [`ModelError::NotFound`] if no
    /// row was deleted. Deletion is immediate and irreversible.
    pub async fn delete(&self, username: &str) -> Result<bool, ModelError> {
        let rows = self
            .db
            .query(
                "DELETE FROM users WHERE username = $1 RETURNING username",
                &[SqlValue::from(username)],
            )
            .await?;

        if rows.is_empty() {
            return Err(ModelError::NotFound);
        }

        info!(username = %username, "User deleted");
        Ok(true)
    }
}
