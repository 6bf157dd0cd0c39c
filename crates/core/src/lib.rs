//! Flourish Core - Shared types library.
//!
//! This crate provides common types used across all Flourish components:
//! - `surface` - Client-side interactive storefront surface
//! - `integration-tests` - Cross-crate scenario tests
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no host access, no event
//! wiring. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for product ids, display prices, and
//!   viewport geometry

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
