use anyhow::{Context, Result};
use tracing::warn;

use std::{
    collections::HashSet,
    fmt::Display,
    fs::File,
    io::Write,
    path::Path,
};

use crate::{
    product::{Catalog, Product},
    sale::SalesTotals,
    salesman::Salesman,
    usd::Usd,
};

/// A salesman together with their total revenue.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ranked {
    pub salesman: Salesman,
    pub revenue: Usd,
}

/// Returns `salesmen` sorted by revenue, descending.
///
/// Salesmen with no sales count as zero. Salesmen with identical revenue
/// keep their original relative order.
#[must_use]
pub fn rank_salesmen(salesmen: Vec<Salesman>, totals: &SalesTotals) -> Vec<Ranked> {
    let mut ranked: Vec<_> = salesmen
        .into_iter()
        .map(|salesman| Ranked {
            revenue: totals.get_or_zero(&salesman.id),
            salesman,
        })
        .collect();
    ranked.sort_by(|a, b| b.revenue.cmp(&a.revenue));
    ranked
}

/// Returns the products in `catalog` sorted by name, ignoring case.
///
/// Products whose names differ only in case are ordered by their listed
/// price text, also ignoring case.
#[must_use]
pub fn products_by_name(catalog: &Catalog) -> Vec<Product> {
    let mut products: Vec<_> = catalog.products().cloned().collect();
    products.sort_by_cached_key(|p| (p.name.to_lowercase(), p.price.listed().to_lowercase()));
    products
}

/// Holds the ranked salesmen and sorted products of one run.
///
/// To build a `Report`, use [`Report::new`].
///
/// To write the CSV reports, use [`Report::write_salesmen_csv`] and
/// [`Report::write_products_csv`].
///
/// To get a printable ranking table, use its [`Display`] implementation.
#[derive(Debug, Default)]
pub struct Report {
    salesmen: Vec<Ranked>,
    products: Vec<Product>,
}

impl Report {
    /// Ranks `salesmen` by their revenue in `totals`, and sorts the products
    /// in `catalog` by name.
    ///
    /// Sales recorded against ids that aren't in `salesmen` are left out of
    /// the report, and logged as warnings.
    #[must_use]
    pub fn new(salesmen: Vec<Salesman>, catalog: &Catalog, totals: &SalesTotals) -> Self {
        let known: HashSet<&str> = salesmen.iter().map(|s| s.id.as_str()).collect();
        let mut unknown: Vec<_> = totals.salesman_ids().filter(|id| !known.contains(id)).collect();
        unknown.sort_unstable();
        for id in unknown {
            warn!(id, revenue = %totals.get_or_zero(id), "sales for unknown salesman not reported");
        }
        Self {
            salesmen: rank_salesmen(salesmen, totals),
            products: products_by_name(catalog),
        }
    }

    #[must_use]
    pub fn salesmen(&self) -> &[Ranked] {
        &self.salesmen
    }

    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Returns the revenue of all reported salesmen, or `None` if it
    /// overflows.
    #[must_use]
    pub fn total_revenue(&self) -> Option<Usd> {
        Usd::checked_sum(self.salesmen.iter().map(|r| r.revenue))
    }

    /// Writes `SALESMAN_ID;REVENUE` lines to `wtr`, best-selling first.
    ///
    /// `REVENUE` has no trailing zeros beyond the first decimal place
    /// (`30.0`, `4.5`, `12.34`).
    ///
    /// # Errors
    ///
    /// Returns any errors from writing.
    pub fn write_salesmen<W: Write>(&self, wtr: W) -> Result<()> {
        let mut wtr = semicolon_writer(wtr);
        for r in &self.salesmen {
            wtr.write_record([r.salesman.id.as_str(), r.revenue.to_short_string().as_str()])?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Writes `PRODUCT_NAME;PRICE` lines to `wtr`, in name order.
    ///
    /// `PRICE` is written exactly as it was listed in the products file.
    ///
    /// # Errors
    ///
    /// Returns any errors from writing.
    pub fn write_products<W: Write>(&self, wtr: W) -> Result<()> {
        let mut wtr = semicolon_writer(wtr);
        for p in &self.products {
            wtr.write_record([p.name.as_str(), p.price.listed()])?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Creates (or truncates) the file at `path` and writes the salesmen
    /// report to it.
    ///
    /// # Errors
    ///
    /// Returns any errors from creating or writing the file.
    pub fn write_salesmen_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        self.write_salesmen(file)
            .with_context(|| format!("writing {}", path.display()))
    }

    /// Creates (or truncates) the file at `path` and writes the products
    /// report to it.
    ///
    /// # Errors
    ///
    /// Returns any errors from creating or writing the file.
    pub fn write_products_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        self.write_products(file)
            .with_context(|| format!("writing {}", path.display()))
    }
}

fn semicolon_writer<W: Write>(wtr: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .flexible(true)
        .quote_style(csv::QuoteStyle::Never)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(wtr)
}

impl Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        const HEADING: &str = "Salesman";
        let width = self
            .salesmen
            .iter()
            .map(|r| r.salesman.id.len() + r.salesman.full_name().len() + 1)
            .max()
            .unwrap_or_default()
            .max(HEADING.len());
        writeln!(f, "{HEADING:width$} {:>12}", "Revenue")?;
        let length = width + 13;
        writeln!(f, "{:-<length$}", "")?;
        for r in &self.salesmen {
            let label = format!("{} {}", r.salesman.id, r.salesman.full_name());
            writeln!(f, "{label:width$} {:>12}", r.revenue)?;
        }
        writeln!(f, "{:-<length$}", "")?;
        match self.total_revenue() {
            Some(total) => writeln!(f, "{:width$} {total:>12}", "Total")?,
            None => writeln!(f, "{:width$} {:>12}", "Total", "overflow")?,
        }
        Ok(())
    }
}
