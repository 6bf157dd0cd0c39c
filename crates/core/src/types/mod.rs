//! Core types for Flourish.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod geometry;
pub mod id;
pub mod price;

pub use geometry::{Point, Rect, Size};
pub use id::ProductId;
pub use price::DisplayPrice;
