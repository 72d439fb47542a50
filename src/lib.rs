#![doc = include_str!("../README.md")]
use anyhow::{Context, Result};
use csv::{Position, StringRecord};
use tracing::info;

use std::{
    fs::File,
    path::{Path, PathBuf},
};

pub mod generate;
pub mod logging;
pub mod product;
pub mod report;
pub mod sale;
pub mod salesman;
pub mod usd;

pub use product::{Catalog, Price, Product};
pub use report::{Ranked, Report};
pub use sale::{SaleItem, SaleLine, SalesTotals};
pub use salesman::Salesman;
pub use usd::Usd;

/// Where a report run reads its input and writes its output.
///
/// The [`Default`] paths are the fixed names used by the data generator,
/// relative to the working directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Paths {
    pub salesmen_info: PathBuf,
    pub products: PathBuf,
    pub sales_dir: PathBuf,
    pub salesmen_report: PathBuf,
    pub products_report: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self::in_dir(".")
    }
}

impl Paths {
    /// Returns the default file names, all inside `dir`.
    #[must_use]
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            salesmen_info: dir.join("salesmen_info.txt"),
            products: dir.join("products.txt"),
            sales_dir: dir.join("sales"),
            salesmen_report: dir.join("salesmen_report.csv"),
            products_report: dir.join("products_report.csv"),
        }
    }
}

/// Reads all input named by `paths`, and writes both reports.
///
/// Returns the finished [`Report`], so that callers can display it.
///
/// # Errors
///
/// Returns the first error encountered reading, parsing, or writing. Nothing
/// is written unless all the input was read successfully; if writing fails,
/// the report being written may be left truncated.
pub fn run(paths: &Paths) -> Result<Report> {
    let salesmen = salesman::read_salesmen(&paths.salesmen_info)?;
    let catalog = Catalog::from_file(&paths.products)?;
    let mut totals = SalesTotals::new();
    totals.read_sales_dir(&paths.sales_dir, &catalog)?;
    let report = Report::new(salesmen, &catalog, &totals);
    report.write_salesmen_csv(&paths.salesmen_report)?;
    report.write_products_csv(&paths.products_report)?;
    info!(
        salesmen = report.salesmen().len(),
        products = report.products().len(),
        "wrote reports"
    );
    Ok(report)
}

/// Opens `path` for reading `;`-separated records with no header line.
///
/// Fields are trimmed, quotes are not special, records may have any number of
/// fields, and blank lines are skipped.
pub(crate) fn semicolon_reader(path: &Path) -> Result<csv::Reader<File>> {
    csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))
}

/// Returns the (1-based) line number `record` was read from.
pub(crate) fn line_of(record: &StringRecord) -> u64 {
    record.position().map_or(0, Position::line)
}
