//! # Bankly Auth
//!
//! Authentication and authorization for Bankly.
//!
//! Three pieces, mirroring the request pipeline:
//!
//! - token encode/decode behind the [`TokenCodec`] seam
//! - identity propagation: a decoded token becomes an [`IdentityContext`]
//! - access control gates evaluating that context into a [`GateOutcome`]

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod context;
pub mod error;
pub mod gate;
pub mod token;

pub use context::IdentityContext;
pub use error::AuthError;
pub use gate::{require_admin, require_login, resolve_identity, GateOutcome};
pub use token::{Claims, JwtCodec, TokenCodec};
