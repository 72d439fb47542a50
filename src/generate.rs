//! Random test data for the report pipeline.
//!
//! Everything written here uses the same plain-text formats that the readers
//! in this crate accept, so a generated directory can be fed straight to
//! [`crate::run`].

use anyhow::{bail, Context, Result};
use rand::{rngs::StdRng, seq::index, Rng, SeedableRng};
use tracing::{debug, info};

use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use crate::usd::Usd;

/// Salesman ids are drawn from `0..ID_RANGE`.
const ID_RANGE: usize = 100_000;
/// Prices are drawn from zero up to and including this many cents.
const MAX_PRICE_CENTS: i64 = 10_000;
const MAX_QTY: u32 = 10;

/// How much data to generate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub salesmen: usize,
    pub products: usize,
    /// Sale lines written for each salesman.
    pub lines: usize,
    /// Maximum product/quantity pairs on one sale line.
    pub max_items: usize,
    /// Seed for reproducible output; `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            salesmen: 10,
            products: 50,
            lines: 3,
            max_items: 3,
            seed: None,
        }
    }
}

/// The files written by [`generate`].
#[derive(Debug, PartialEq, Eq)]
pub struct Generated {
    pub salesmen_info: PathBuf,
    pub products: PathBuf,
    pub sales_files: Vec<PathBuf>,
}

/// Writes `salesmen_info.txt`, `products.txt`, and one file per salesman in
/// `sales/`, all inside `out_dir`.
///
/// Existing files with the same names are overwritten.
///
/// # Errors
///
/// Returns errors if `config` is unusable (no products, no room on a sale
/// line, or more salesmen than there are distinct ids), or if any file
/// cannot be written.
pub fn generate(out_dir: impl AsRef<Path>, config: &GeneratorConfig) -> Result<Generated> {
    if config.products == 0 {
        bail!("at least one product is needed");
    }
    if config.max_items == 0 {
        bail!("sale lines need room for at least one item");
    }
    if config.salesmen > ID_RANGE {
        bail!("at most {ID_RANGE} distinct salesmen can be generated");
    }
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let out_dir = out_dir.as_ref();
    let sales_dir = out_dir.join("sales");
    fs::create_dir_all(&sales_dir).with_context(|| format!("creating {}", sales_dir.display()))?;

    let ids: Vec<String> = index::sample(&mut rng, ID_RANGE, config.salesmen)
        .into_iter()
        .map(|id| id.to_string())
        .collect();

    let salesmen_info = out_dir.join("salesmen_info.txt");
    write_lines(&salesmen_info, ids.iter().enumerate().map(|(i, id)| {
        let n = i + 1;
        format!("Cedula;{id};John_{n};Doe_{n}")
    }))?;

    let products = out_dir.join("products.txt");
    let prices: Vec<Usd> = (0..config.products)
        .map(|_| Usd::from_cents(rng.gen_range(0..=MAX_PRICE_CENTS)))
        .collect();
    write_lines(&products, prices.iter().enumerate().map(|(i, price)| {
        let n = i + 1;
        format!("ProductID_{n};ProductName_{n};${price}")
    }))?;

    let mut sales_files = Vec::with_capacity(ids.len());
    for id in &ids {
        let lines: Vec<String> = (0..config.lines)
            .map(|_| sale_line(&mut rng, id, config))
            .collect();
        let path = sales_dir.join(format!("sales_{id}.txt"));
        write_lines(&path, lines)?;
        debug!(path = %path.display(), "wrote sales file");
        sales_files.push(path);
    }
    info!(
        salesmen = ids.len(),
        products = config.products,
        dir = %out_dir.display(),
        "generated test files"
    );
    Ok(Generated {
        salesmen_info,
        products,
        sales_files,
    })
}

fn sale_line(rng: &mut impl Rng, salesman_id: &str, config: &GeneratorConfig) -> String {
    let items = rng.gen_range(1..=config.max_items);
    let mut line = salesman_id.to_string();
    for _ in 0..items {
        let product = rng.gen_range(1..=config.products);
        let qty = rng.gen_range(1..=MAX_QTY);
        line.push_str(&format!(";ProductID_{product},{qty}"));
    }
    line
}

fn write_lines(path: &Path, lines: impl IntoIterator<Item = String>) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut wtr = BufWriter::new(file);
    for line in lines {
        writeln!(wtr, "{line}").with_context(|| format!("writing {}", path.display()))?;
    }
    wtr.flush()
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{salesman::read_salesmen, Catalog};

    use tempfile::TempDir;

    fn seeded(seed: u64) -> GeneratorConfig {
        GeneratorConfig {
            seed: Some(seed),
            ..GeneratorConfig::default()
        }
    }

    #[test]
    fn generate_fn_writes_readable_files() {
        let dir = TempDir::new().unwrap();
        let generated = generate(dir.path(), &seeded(7)).unwrap();
        let salesmen = read_salesmen(&generated.salesmen_info).unwrap();
        assert_eq!(salesmen.len(), 10);
        assert_eq!(salesmen[0].first_name, "John_1");
        let catalog = Catalog::from_file(&generated.products).unwrap();
        assert_eq!(catalog.len(), 50);
        assert!(catalog
            .products()
            .all(|p| p.price.listed().starts_with('$')));
        assert_eq!(generated.sales_files.len(), 10);
    }

    #[test]
    fn generate_fn_uses_distinct_salesman_ids() {
        let dir = TempDir::new().unwrap();
        let config = GeneratorConfig {
            salesmen: 500,
            ..seeded(1)
        };
        let generated = generate(dir.path(), &config).unwrap();
        let salesmen = read_salesmen(&generated.salesmen_info).unwrap();
        let mut ids: Vec<_> = salesmen.into_iter().map(|s| s.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 500);
    }

    #[test]
    fn generate_fn_is_reproducible_with_a_seed() {
        let a = TempDir::new().unwrap();
        let b = TempDir::new().unwrap();
        generate(a.path(), &seeded(42)).unwrap();
        generate(b.path(), &seeded(42)).unwrap();
        for name in ["salesmen_info.txt", "products.txt"] {
            assert_eq!(
                fs::read(a.path().join(name)).unwrap(),
                fs::read(b.path().join(name)).unwrap(),
                "{name} differs"
            );
        }
    }

    #[test]
    fn generate_fn_rejects_unusable_config() {
        let dir = TempDir::new().unwrap();
        for config in [
            GeneratorConfig {
                products: 0,
                ..seeded(1)
            },
            GeneratorConfig {
                max_items: 0,
                ..seeded(1)
            },
            GeneratorConfig {
                salesmen: ID_RANGE + 1,
                ..seeded(1)
            },
        ] {
            assert!(generate(dir.path(), &config).is_err(), "{config:?}");
        }
    }
}
