use anyhow::{bail, Context, Result};
use serde_with::DeserializeFromStr;
use tracing::{debug, warn};

use std::{collections::BTreeMap, fmt::Display, path::Path, str::FromStr};

use crate::{line_of, semicolon_reader, usd::Usd};

/// A unit price, as listed in the products file.
///
/// Keeps both the parsed amount and the text it was parsed from, so that the
/// products report can reproduce the listing exactly (`$4.5` stays `$4.5`).
#[derive(Clone, Debug, DeserializeFromStr, PartialEq, Eq)]
pub struct Price {
    amount: Usd,
    listed: String,
}

impl Price {
    #[must_use]
    pub fn amount(&self) -> Usd {
        self.amount
    }

    #[must_use]
    pub fn listed(&self) -> &str {
        &self.listed
    }
}

impl FromStr for Price {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self {
            amount: s.parse()?,
            listed: s.to_string(),
        })
    }
}

impl Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.listed)
    }
}

/// A product from the products file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: Price,
}

/// Products keyed by product id.
///
/// To load a catalog, use [`Catalog::from_file`]. To look up the unit price
/// of a product referenced by a sale, use [`Catalog::price`].
#[derive(Debug, Default)]
pub struct Catalog(BTreeMap<String, Product>);

impl Catalog {
    /// Reads products from `path`.
    ///
    /// Each line has the format:
    ///
    /// ```txt
    /// PRODUCT_ID;PRODUCT_NAME;PRICE
    /// ```
    ///
    /// `PRICE` may carry a leading `$`, and has at most two decimal places.
    /// If the same `PRODUCT_ID` appears more than once, the last line wins.
    ///
    /// # Errors
    ///
    /// Returns errors if:
    /// * The file cannot be opened or read
    /// * A line doesn't have exactly three fields
    /// * `PRICE` is not a valid amount
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut catalog = Self::default();
        let mut rdr = semicolon_reader(path)?;
        for result in rdr.records() {
            let record = result.with_context(|| format!("reading {}", path.display()))?;
            let line = line_of(&record);
            if record.len() != 3 {
                bail!(
                    "{} line {line}: expected 3 fields (id;name;price), found {}",
                    path.display(),
                    record.len()
                );
            }
            let (id, name, price): (String, String, Price) = record
                .deserialize(None)
                .with_context(|| format!("{} line {line}", path.display()))?;
            catalog.insert(Product { id, name, price });
        }
        debug!(path = %path.display(), count = catalog.len(), "read products");
        Ok(catalog)
    }

    /// Adds `product`, replacing any earlier product with the same id.
    pub fn insert(&mut self, product: Product) {
        if let Some(old) = self.0.insert(product.id.clone(), product) {
            warn!(id = %old.id, "duplicate product id, keeping the later entry");
        }
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Product> {
        self.0.get(id)
    }

    /// Returns the unit price of product `id`, if it is in the catalog.
    ///
    /// ```
    /// # use sales_report::{Catalog, Product, Usd};
    /// let mut catalog = Catalog::default();
    /// catalog.insert(Product {
    ///     id: "P1".into(),
    ///     name: "Widget".into(),
    ///     price: "$10.00".parse().unwrap(),
    /// });
    /// assert_eq!(catalog.price("P1"), Some(Usd::from_cents(1000)));
    /// assert_eq!(catalog.price("P2"), None);
    /// ```
    #[must_use]
    pub fn price(&self, id: &str) -> Option<Usd> {
        self.get(id).map(|p| p.price.amount())
    }

    /// Iterates over the products in id order.
    pub fn products(&self) -> impl Iterator<Item = &Product> {
        self.0.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_file_fn_correctly_parses_products() {
        let catalog = Catalog::from_file("testdata/products.txt").unwrap();
        assert_eq!(catalog.len(), 4);
        assert_eq!(catalog.price("P1"), Some(Usd::from_cents(1000)));
        assert_eq!(catalog.price("P4"), Some(Usd::from_cents(100)));
        let pie = catalog.get("P3").unwrap();
        assert_eq!(pie.name, "apple Pie");
        assert_eq!(pie.price.listed(), "$4.25");
    }

    #[test]
    fn from_file_fn_returns_error_for_bad_price() {
        let err = Catalog::from_file("testdata/products.bad").unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("line 2"), "{msg}");
        assert!(msg.contains("ten"), "{msg}");
    }

    #[test]
    fn from_file_fn_returns_error_for_missing_price_field() {
        let err = Catalog::from_file("testdata/products_short.bad").unwrap_err();
        assert!(format!("{err:#}").contains("expected 3 fields"), "{err:#}");
    }

    #[test]
    fn insert_fn_replaces_duplicate_ids() {
        let mut catalog = Catalog::default();
        for price in ["$1.00", "$2.00"] {
            catalog.insert(Product {
                id: "P1".into(),
                name: "Widget".into(),
                price: price.parse().unwrap(),
            });
        }
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.price("P1"), Some(Usd::from_cents(200)));
    }

    #[test]
    fn price_display_fn_reproduces_listed_text() {
        let price: Price = "$4.5".parse().unwrap();
        assert_eq!(price.to_string(), "$4.5");
        assert_eq!(price.amount(), Usd::from_cents(450));
    }
}
