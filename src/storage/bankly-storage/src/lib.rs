//! # Bankly Storage
//!
//! Storage abstraction layer for Bankly backends.
//!
//! Provides the query execution trait, the scalar value and row types
//! exchanged with backends, and the partial-update statement builder.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod backend;
pub mod error;
pub mod update;
pub mod value;

pub use backend::QueryBackend;
pub use error::StorageError;
pub use update::{partial_update, PartialUpdate};
pub use value::{Row, SqlValue};
