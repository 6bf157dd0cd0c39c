//! Newtype ID for type-safe product references.
//!
//! Product ids are issued by the catalog backend and arrive as opaque
//! strings on `data-product-id` attributes; the wrapper keeps them from
//! being mixed up with other string-typed fields.

use core::fmt;

use serde::{Deserialize, Serialize};

/// A stable external product identifier.
///
/// Ids are opaque: the surface never inspects their structure, it only
/// compares them for equality and uses them as collection keys.
///
/// ## Examples
///
/// ```
/// use flourish_core::ProductId;
///
/// let id = ProductId::new("sku-341");
/// assert_eq!(id.as_str(), "sku-341");
/// assert_eq!(id, "sku-341".parse::<ProductId>().unwrap());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Create a new product id from any string-like value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `ProductId` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ProductId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl AsRef<str> for ProductId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ProductId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl PartialEq<str> for ProductId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ProductId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
