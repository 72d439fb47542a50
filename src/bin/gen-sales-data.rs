use clap::Parser;
use sales_report::{
    generate::{generate, GeneratorConfig},
    logging,
};

use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about)]
/// Writes random salesman, product, and sales files for `sales-report`.
struct Args {
    /// Directory to write the files into
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
    /// Number of salesmen
    #[arg(long, default_value_t = 10)]
    salesmen: usize,
    /// Number of products
    #[arg(long, default_value_t = 50)]
    products: usize,
    /// Sale lines per salesman
    #[arg(long, default_value_t = 3)]
    lines: usize,
    /// Maximum products sold on one sale line
    #[arg(long, default_value_t = 3)]
    max_items: usize,
    /// Seed the random generator, for reproducible output
    #[arg(long)]
    seed: Option<u64>,
    /// Log progress to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();
    logging::init_logger(args.verbose);
    let config = GeneratorConfig {
        salesmen: args.salesmen,
        products: args.products,
        lines: args.lines,
        max_items: args.max_items,
        seed: args.seed,
    };
    match generate(&args.out_dir, &config) {
        Ok(_) => println!("Test files generated successfully."),
        Err(e) => eprintln!("Error generating test files: {e:#}"),
    }
}
