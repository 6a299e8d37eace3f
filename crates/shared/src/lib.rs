//! # gazette-digest-shared
//!
//! Shared result and error types for the gazette-digest workspace.
//!
//! - `ErrorEnvelope` is the one error shape every crate converts into
//! - `Validated<T>` marks values that have passed resolution
//!
//! This crate depends on external crates only.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod errors;
pub mod invariants;
pub mod result;

pub use errors::{ErrorClass, ErrorCode, ErrorEnvelope, ErrorKind, ErrorMetadata};
pub use invariants::Validated;
pub use result::Result;

/// Returns the shared crate version.
#[must_use]
pub const fn shared_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
