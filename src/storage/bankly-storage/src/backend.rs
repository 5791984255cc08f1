//! Query backend trait definition.

use async_trait::async_trait;

use crate::error::StorageError;
use crate::value::{Row, SqlValue};

/// Query execution trait for implementing different relational backends.
///
/// Statements use `$1`, `$2`, ... positional placeholders; `params` binds
/// them in order.
#[async_trait]
pub trait QueryBackend: Send + Sync {
    /// Executes a statement and returns the resulting rows.
    ///
    /// Statements without a result set (or without a `RETURNING` clause)
    /// yield an empty row list.
    async fn query(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>, StorageError>;
}
