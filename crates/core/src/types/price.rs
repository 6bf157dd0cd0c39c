//! Display-price representation using decimal arithmetic.
//!
//! Catalog prices reach the surface as already-formatted display strings
//! (`"$12.34"`, `"$4.50/stem"`). The surface never reformats them for
//! display; it only needs their numeric value for cart totals. All math
//! is done with `rust_decimal` - no floating-point money.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A decimal-bearing price display string.
///
/// The wrapped string is treated as opaque presentation data. [`amount`]
/// extracts the numeric value leniently: currency decoration is stripped
/// and anything unparsable is worth zero, so a malformed price can never
/// poison an aggregate computation.
///
/// ## Examples
///
/// ```
/// use flourish_core::DisplayPrice;
/// use rust_decimal::Decimal;
///
/// assert_eq!(DisplayPrice::new("$12.34").amount(), Decimal::new(1234, 2));
/// assert_eq!(DisplayPrice::new("$1,200.00").amount(), Decimal::new(120_000, 2));
/// assert_eq!(DisplayPrice::new("call us").amount(), Decimal::ZERO);
/// ```
///
/// [`amount`]: DisplayPrice::amount
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DisplayPrice(String);

impl DisplayPrice {
    /// Wrap a display string.
    #[must_use]
    pub fn new(price: impl Into<String>) -> Self {
        Self(price.into())
    }

    /// Returns the display string as-is.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `DisplayPrice` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// The numeric value of the price.
    ///
    /// Strips currency decoration (symbols, thousands separators, unit
    /// suffixes) and parses what remains. A string with no parsable
    /// number is worth [`Decimal::ZERO`].
    #[must_use]
    pub fn amount(&self) -> Decimal {
        let numeric: String = self
            .0
            .chars()
            .skip_while(|c| !c.is_ascii_digit() && *c != '-')
            .take_while(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-'))
            .filter(|c| *c != ',')
            .collect();

        numeric.parse().unwrap_or(Decimal::ZERO)
    }
}

impl std::fmt::Display for DisplayPrice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for DisplayPrice {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DisplayPrice {
    fn from(price: &str) -> Self {
        Self::new(price)
    }
}

impl From<String> for DisplayPrice {
    fn from(price: String) -> Self {
        Self(price)
    }
}

/// Round a monetary amount to exactly two fraction digits.
///
/// The result always carries a scale of 2, so `Decimal::to_string`
/// renders `"20.00"` rather than `"20"`.
#[must_use]
pub fn round_to_cents(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp(2);
    rounded.rescale(2);
    rounded
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_strips_currency_symbol() {
        assert_eq!(DisplayPrice::new("$10.00").amount(), Decimal::new(1000, 2));
        assert_eq!(DisplayPrice::new("€7.25").amount(), Decimal::new(725, 2));
    }

    #[test]
    fn test_amount_ignores_unit_suffix() {
        assert_eq!(
            DisplayPrice::new("$4.50/stem").amount(),
            Decimal::new(450, 2)
        );
    }

    #[test]
    fn test_amount_strips_thousands_separators() {
        assert_eq!(
            DisplayPrice::new("$1,234.56").amount(),
            Decimal::new(123_456, 2)
        );
    }

    #[test]
    fn test_malformed_price_is_zero() {
        assert_eq!(DisplayPrice::new("").amount(), Decimal::ZERO);
        assert_eq!(DisplayPrice::new("call us").amount(), Decimal::ZERO);
        assert_eq!(DisplayPrice::new("$1.2.3").amount(), Decimal::ZERO);
    }

    #[test]
    fn test_amount_is_idempotent() {
        let price = DisplayPrice::new("$19.99");
        assert_eq!(price.amount(), price.amount());
    }

    #[test]
    fn test_round_to_cents_pads_scale() {
        assert_eq!(round_to_cents(Decimal::new(20, 0)).to_string(), "20.00");
        assert_eq!(round_to_cents(Decimal::new(12_345, 3)).to_string(), "12.35");
    }

    #[test]
    fn test_serde_is_transparent() {
        let price = DisplayPrice::new("$3.00");
        assert_eq!(serde_json::to_string(&price).unwrap(), "\"$3.00\"");
    }
}
