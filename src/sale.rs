use anyhow::{bail, Context, Result};
use tracing::{debug, info};

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use crate::{line_of, product::Catalog, semicolon_reader, usd::Usd};

/// One `PRODUCT_ID,QUANTITY` pair from a sales line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaleItem {
    pub product_id: String,
    pub qty: u32,
}

impl FromStr for SaleItem {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let Some((product_id, qty)) = s.split_once(',') else {
            bail!("bad sale item (missing ,): {s:?}");
        };
        let product_id = product_id.trim();
        if product_id.is_empty() {
            bail!("bad sale item (empty product id): {s:?}");
        }
        let qty = qty
            .trim()
            .parse()
            .with_context(|| format!("bad quantity in sale item {s:?}"))?;
        Ok(Self {
            product_id: product_id.to_string(),
            qty,
        })
    }
}

/// One line of a sales file: the salesman, and what they sold.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaleLine {
    /// Line number in the sales file, starting at 1.
    pub line: u64,
    pub salesman_id: String,
    pub items: Vec<SaleItem>,
}

impl SaleLine {
    /// Returns the revenue of this line, priced from `catalog`.
    ///
    /// # Errors
    ///
    /// Returns an error if any item refers to a product not in `catalog`, or
    /// if the revenue is too large to represent.
    pub fn revenue(&self, catalog: &Catalog) -> Result<Usd> {
        let mut total = Usd::default();
        for item in &self.items {
            let Some(price) = catalog.price(&item.product_id) else {
                bail!("unknown product {:?}", item.product_id);
            };
            let Some(amount) = price.checked_mul(item.qty) else {
                bail!("revenue overflow: {} x {price}", item.qty);
            };
            let Some(sum) = total.checked_add(amount) else {
                bail!("revenue overflow adding {amount} to {total}");
            };
            total = sum;
        }
        Ok(total)
    }
}

/// Reads every sale line from the sales file at `path`.
///
/// Each line has the format:
///
/// ```txt
/// SALESMAN_ID;PRODUCT_ID,QTY;PRODUCT_ID,QTY;...
/// ```
///
/// Empty fields and blank lines are skipped.
///
/// # Errors
///
/// Returns errors if the file cannot be read, or if any item is malformed.
pub fn read_sale_lines(path: impl AsRef<Path>) -> Result<Vec<SaleLine>> {
    let path = path.as_ref();
    let mut rdr = semicolon_reader(path)?;
    let mut lines = Vec::new();
    for result in rdr.records() {
        let record = result.with_context(|| format!("reading {}", path.display()))?;
        let line = line_of(&record);
        let salesman_id = record.get(0).unwrap_or_default();
        if salesman_id.is_empty() {
            bail!("{} line {line}: empty salesman id", path.display());
        }
        let items = record
            .iter()
            .skip(1)
            .filter(|field| !field.is_empty())
            .map(SaleItem::from_str)
            .collect::<Result<Vec<_>>>()
            .with_context(|| format!("{} line {line}", path.display()))?;
        lines.push(SaleLine {
            line,
            salesman_id: salesman_id.to_string(),
            items,
        });
    }
    Ok(lines)
}

/// Lists the regular files in `dir`, sorted by path.
///
/// # Errors
///
/// Returns any errors from reading the directory.
pub fn sales_files(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))? {
        let entry = entry.with_context(|| format!("reading {}", dir.display()))?;
        let path = entry.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Total revenue per salesman id.
///
/// Salesmen with no recorded sales are never stored; [`SalesTotals::get_or_zero`]
/// reads them as zero.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SalesTotals(HashMap<String, Usd>);

impl SalesTotals {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the revenue recorded for `salesman_id`, or zero if there is none.
    ///
    /// This never inserts an entry.
    ///
    /// ```
    /// # use sales_report::{SalesTotals, Usd};
    /// let mut totals = SalesTotals::new();
    /// totals.add("S1", Usd::from_cents(3000))?;
    /// assert_eq!(totals.get_or_zero("S1"), Usd::from_cents(3000));
    /// assert_eq!(totals.get_or_zero("S2"), Usd::default());
    /// assert_eq!(totals.len(), 1);
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    #[must_use]
    pub fn get_or_zero(&self, salesman_id: &str) -> Usd {
        self.0.get(salesman_id).copied().unwrap_or_default()
    }

    /// Adds `amount` to the revenue of `salesman_id`.
    ///
    /// # Errors
    ///
    /// Returns an error, leaving the total unchanged, if the new total would
    /// overflow.
    pub fn add(&mut self, salesman_id: &str, amount: Usd) -> Result<()> {
        let total = self.get_or_zero(salesman_id);
        let Some(sum) = total.checked_add(amount) else {
            bail!("revenue overflow for salesman {salesman_id}: {total} + {amount}");
        };
        self.0.insert(salesman_id.to_string(), sum);
        Ok(())
    }

    /// Adds every line of the sales file at `path`, priced from `catalog`.
    ///
    /// The whole file is parsed and totalled before anything is added, so on
    /// error the totals are left unchanged.
    ///
    /// # Errors
    ///
    /// Returns errors if the file cannot be read or parsed, if a line refers
    /// to a product not in `catalog`, or if a total overflows.
    pub fn read_sales_file(&mut self, path: impl AsRef<Path>, catalog: &Catalog) -> Result<()> {
        let path = path.as_ref();
        let mut file_totals = Self::new();
        let mut count = 0;
        for line in read_sale_lines(path)? {
            let revenue = line.revenue(catalog).with_context(|| {
                format!(
                    "{} line {}: salesman {}",
                    path.display(),
                    line.line,
                    line.salesman_id
                )
            })?;
            file_totals
                .add(&line.salesman_id, revenue)
                .with_context(|| format!("{} line {}", path.display(), line.line))?;
            count += 1;
        }
        debug!(path = %path.display(), lines = count, "read sales");
        self.merge(file_totals)
            .with_context(|| format!("reading {}", path.display()))
    }

    /// Adds every total in `other` to this one.
    ///
    /// # Errors
    ///
    /// Returns an error, leaving this one unchanged, if any total would
    /// overflow.
    pub fn merge(&mut self, other: Self) -> Result<()> {
        let merged = other
            .0
            .into_iter()
            .map(|(salesman_id, amount)| {
                let total = self.get_or_zero(&salesman_id);
                let Some(sum) = total.checked_add(amount) else {
                    bail!("revenue overflow for salesman {salesman_id}: {total} + {amount}");
                };
                Ok((salesman_id, sum))
            })
            .collect::<Result<Vec<_>>>()?;
        self.0.extend(merged);
        Ok(())
    }

    /// Adds every sales file in `paths`, in order.
    ///
    /// # Errors
    ///
    /// Stops at, and returns, the first error from [`Self::read_sales_file`].
    pub fn read_sales_files<P: AsRef<Path>>(&mut self, paths: &[P], catalog: &Catalog) -> Result<()> {
        for path in paths {
            self.read_sales_file(path, catalog)?;
        }
        Ok(())
    }

    /// Adds every sales file found in `dir`. Returns the number of files read.
    ///
    /// # Errors
    ///
    /// Returns errors from listing `dir` or from [`Self::read_sales_file`].
    pub fn read_sales_dir(&mut self, dir: impl AsRef<Path>, catalog: &Catalog) -> Result<usize> {
        let files = sales_files(&dir)?;
        self.read_sales_files(&files, catalog)?;
        info!(dir = %dir.as_ref().display(), files = files.len(), "aggregated sales");
        Ok(files.len())
    }

    /// Returns the sum of all recorded revenue, or `None` if it overflows.
    #[must_use]
    pub fn grand_total(&self) -> Option<Usd> {
        Usd::checked_sum(self.0.values().copied())
    }

    /// Iterates over the salesman ids with recorded sales, in no particular order.
    pub fn salesman_ids(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
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
