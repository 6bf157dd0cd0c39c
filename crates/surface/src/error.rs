//! Error taxonomy for the surface.
//!
//! Nothing in this crate is fatal: a missing host target disables the one
//! component that needed it, a failing durable medium leaves the
//! in-memory state authoritative, and malformed persisted or attribute
//! data degrades to an empty or unchanged state.

use thiserror::Error;

/// Errors binding a component to its host targets.
///
/// Returned by component constructors when a required element handle is
/// absent. Callers log a warning and skip that instance; sibling
/// components are unaffected.
#[derive(Debug, Error)]
pub enum BindError {
    /// A required element handle was not supplied.
    #[error("missing {role} element")]
    MissingTarget {
        /// Logical role of the absent element (e.g. "panel", "region").
        role: &'static str,
    },

    /// A component that needs at least one trigger got none.
    #[error("no trigger elements supplied")]
    NoTriggers,
}

/// Errors writing to the durable mirror.
///
/// These never propagate past the store: writes are best-effort and the
/// in-memory collection stays authoritative for the session.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The underlying medium failed.
    #[error("storage i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The medium is present but rejects writes (full or disabled).
    #[error("storage is unavailable: {0}")]
    Unavailable(String),
}
