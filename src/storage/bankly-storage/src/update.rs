//! Partial-update statement builder.
//!
//! Turns a field/value mapping into a single `UPDATE ... RETURNING *`
//! statement with positional parameters, for patch-style writes where only
//! a subset of columns changes.

use crate::error::StorageError;
use crate::value::SqlValue;

/// A built update statement and its positional parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialUpdate {
    /// The statement text, with `$1`..`$N` placeholders.
    pub statement: String,
    /// Parameter values in placeholder order; the key value is last.
    pub params: Vec<SqlValue>,
}

/// Builds an `UPDATE <table> SET c1=$1, ... WHERE <key_column>=$N
/// RETURNING *` statement from the given fields, keyed on one column.
///
/// Field names beginning with `_` are control fields carried alongside form
/// data (e.g. `_token`) and are excluded from the statement and parameters.
/// Remaining fields keep their given order.
///
/// Purely syntactic: column names are not validated against any schema and
/// values are not coerced.
///
/// # Errors
///
/// Returns [`StorageError::InvalidArgument`] when `table` or `key_column` is
/// empty, `key_value` is NULL or empty text, or no fields remain after
/// filtering.
pub fn partial_update(
    table: &str,
    fields: &[(String, SqlValue)],
    key_column: &str,
    key_value: SqlValue,
) -> Result<PartialUpdate, StorageError> {
    let persisted: Vec<&(String, SqlValue)> = fields
        .iter()
        .filter(|(name, _)| !name.starts_with('_'))
        .collect();

    if table.is_empty() || key_column.is_empty() || key_value.is_missing() || persisted.is_empty() {
        return Err(StorageError::InvalidArgument);
    }

    let assignments: Vec<String> = persisted
        .iter()
        .enumerate()
        .map(|(idx, (name, _))| format!("{}=${}", name, idx + 1))
        .collect();

    let statement = format!(
        "UPDATE {} SET {} WHERE {}=${} RETURNING *",
        table,
        assignments.join(", "),
        key_column,
        persisted.len() + 1,
    );

    let mut params: Vec<SqlValue> = persisted
        .iter()
        .map(|(_, value)| value.clone())
        .collect();
    params.push(key_value);

    Ok(PartialUpdate { statement, params })
}
