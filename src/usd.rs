use anyhow::{bail, Context};
use regex::Regex;
use serde_with::DeserializeFromStr;

use std::{
    fmt::{Debug, Display},
    str::FromStr,
    sync::LazyLock,
};

static AMOUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\$?(\d{1,3}(?:,\d{3})+|\d+)(?:\.(\d{1,2}))?$").expect("valid amount regex")
});

/// Represents an amount of money in USD currency.
///
/// The amount is stored internally as an integer number of cents, so sums
/// are exact and don't depend on the order they're added in. Arithmetic is
/// checked: it returns `None` rather than overflowing.
///
/// The [`Display`] implementation formats it as dollars to 2 decimal places,
/// without a currency sign, and honours width and alignment flags. For the
/// shortest form, use [`Usd::to_short_string`].
#[derive(Clone, Copy, Default, DeserializeFromStr, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Usd(i64);

impl Usd {
    /// Creates an amount from a whole number of cents.
    #[must_use]
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    #[must_use]
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    /// Returns the price of `qty` units at `self` each.
    #[must_use]
    pub fn checked_mul(self, qty: u32) -> Option<Self> {
        self.0.checked_mul(i64::from(qty)).map(Self)
    }

    /// Adds up `amounts`, or returns `None` if the total overflows.
    pub fn checked_sum(amounts: impl IntoIterator<Item = Self>) -> Option<Self> {
        amounts
            .into_iter()
            .try_fold(Self::default(), Self::checked_add)
    }

    /// Formats the amount with trailing fractional zeros removed, keeping at
    /// least one decimal place: `30.0`, `4.5`, `12.34`.
    #[must_use]
    pub fn to_short_string(self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let cents = self.0.unsigned_abs();
        let (dollars, frac) = (cents / 100, cents % 100);
        if frac % 10 == 0 {
            format!("{sign}{dollars}.{}", frac / 10)
        } else {
            format!("{sign}{dollars}.{frac:02}")
        }
    }
}

impl Debug for Usd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

impl Display for Usd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let cents = self.0.unsigned_abs();
        f.pad(&format!("{sign}{}.{:02}", cents / 100, cents % 100))
    }
}

impl FromStr for Usd {
    type Err = anyhow::Error;

    /// Parses amounts such as `10`, `$4.5`, `$10.00` or `3,409.15`.
    ///
    /// At most two fractional digits are accepted; negative amounts are not.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let Some(caps) = AMOUNT.captures(s.trim()) else {
            bail!("invalid amount {s:?}");
        };
        let dollars: i64 = caps[1]
            .replace(',', "")
            .parse()
            .with_context(|| format!("amount out of range: {s:?}"))?;
        let cents = match caps.get(2).map(|m| m.as_str()) {
            None => 0,
            Some(frac) if frac.len() == 1 => frac.parse::<i64>()? * 10,
            Some(frac) => frac.parse::<i64>()?,
        };
        let Some(total) = dollars.checked_mul(100).and_then(|d| d.checked_add(cents)) else {
            bail!("amount out of range: {s:?}");
        };
        Ok(Self(total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_str_fn_accepts_dollar_prefix_and_short_fractions() {
        assert_eq!(Usd::from_str("$10.00").unwrap(), Usd::from_cents(1000));
        assert_eq!(Usd::from_str("$4.5").unwrap(), Usd::from_cents(450));
        assert_eq!(Usd::from_str("7").unwrap(), Usd::from_cents(700));
        assert_eq!(Usd::from_str("0.0").unwrap(), Usd::default());
        assert_eq!(Usd::from_str("3,409.15").unwrap(), Usd::from_cents(340_915));
    }

    #[test]
    fn from_str_fn_rejects_malformed_amounts() {
        for bad in ["", "$", "ten", "1.234", "-1.00", "1,23.00", "$$1", "1.", "99999999999999999999"] {
            assert!(Usd::from_str(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn display_fn_formats_two_decimals_without_sign() {
        assert_eq!(Usd::from_cents(3000).to_string(), "30.00");
        assert_eq!(Usd::from_cents(5).to_string(), "0.05");
        assert_eq!(Usd::default().to_string(), "0.00");
        assert_eq!(format!("{:>8}", Usd::from_cents(1234)), "   12.34");
    }

    #[test]
    fn to_short_string_fn_trims_trailing_zeros() {
        assert_eq!(Usd::default().to_short_string(), "0.0");
        assert_eq!(Usd::from_cents(3000).to_short_string(), "30.0");
        assert_eq!(Usd::from_cents(450).to_short_string(), "4.5");
        assert_eq!(Usd::from_cents(1234).to_short_string(), "12.34");
        assert_eq!(Usd::from_cents(5).to_short_string(), "0.05");
        assert_eq!(Usd::from_cents(-250).to_short_string(), "-2.5");
    }

    #[test]
    fn checked_mul_fn_multiplies_by_quantity() {
        assert_eq!(Usd::from_cents(1000).checked_mul(3), Some(Usd::from_cents(3000)));
        assert_eq!(Usd::from_cents(1000).checked_mul(0), Some(Usd::default()));
    }

    #[test]
    fn checked_mul_fn_returns_none_on_overflow() {
        let big = Usd::from_str("$3,000,000,000.00").unwrap();
        assert_eq!(big.checked_mul(4_000_000_000), None);
    }

    #[test]
    fn checked_add_fn_returns_none_on_overflow() {
        assert_eq!(Usd::from_cents(i64::MAX).checked_add(Usd::from_cents(1)), None);
        assert_eq!(
            Usd::from_cents(250).checked_add(Usd::from_cents(5)),
            Some(Usd::from_cents(255))
        );
    }

    #[test]
    fn checked_sum_fn_adds_all_amounts() {
        let total = Usd::checked_sum([250, 1000, 5].into_iter().map(Usd::from_cents));
        assert_eq!(total, Some(Usd::from_cents(1255)));
        let huge = Usd::checked_sum([Usd::from_cents(i64::MAX), Usd::from_cents(1)]);
        assert_eq!(huge, None);
    }
}
