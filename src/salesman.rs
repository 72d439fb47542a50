use anyhow::{bail, Context, Result};
use serde::de::IgnoredAny;
use tracing::debug;

use std::path::Path;

use crate::{line_of, semicolon_reader};

/// A salesman, as listed in the salesman-info file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Salesman {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
}

impl Salesman {
    /// Returns the salesman's first and last names, separated by a space.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Reads salesmen from the salesman-info file at `path`, in file order.
///
/// Each line has the format:
///
/// ```txt
/// LABEL;ID;FIRST_NAME;LAST_NAME
/// ```
///
/// `LABEL` (usually `Cedula`) is ignored. Blank lines are skipped.
///
/// # Errors
///
/// Returns errors if:
/// * The file cannot be opened or read
/// * A line doesn't have exactly four fields
/// * A line has an empty `ID`
pub fn read_salesmen(path: impl AsRef<Path>) -> Result<Vec<Salesman>> {
    let path = path.as_ref();
    let mut rdr = semicolon_reader(path)?;
    let mut salesmen = Vec::new();
    for result in rdr.records() {
        let record = result.with_context(|| format!("reading {}", path.display()))?;
        let line = line_of(&record);
        if record.len() != 4 {
            bail!(
                "{} line {line}: expected 4 fields (label;id;first name;last name), found {}",
                path.display(),
                record.len()
            );
        }
        let (_, id, first_name, last_name): (IgnoredAny, String, String, String) = record
            .deserialize(None)
            .with_context(|| format!("{} line {line}", path.display()))?;
        if id.is_empty() {
            bail!("{} line {line}: empty salesman id", path.display());
        }
        salesmen.push(Salesman {
            id,
            first_name,
            last_name,
        });
    }
    debug!(path = %path.display(), count = salesmen.len(), "read salesmen");
    Ok(salesmen)
}
