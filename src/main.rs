use clap::Parser;
use sales_report::{logging, Paths};

use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about)]
/// Ranks salesmen by revenue and lists products by name, from flat sales
/// files, writing the results as CSV reports.
struct Args {
    /// Salesman info file (LABEL;ID;FIRST_NAME;LAST_NAME per line)
    #[arg(long, default_value = "salesmen_info.txt")]
    salesmen_info: PathBuf,
    /// Products file (ID;NAME;PRICE per line)
    #[arg(long, default_value = "products.txt")]
    products: PathBuf,
    /// Directory of sales files (SALESMAN_ID;PRODUCT_ID,QTY;... per line)
    #[arg(long, default_value = "sales")]
    sales_dir: PathBuf,
    /// Where to write the salesmen report
    #[arg(long, default_value = "salesmen_report.csv")]
    salesmen_report: PathBuf,
    /// Where to write the products report
    #[arg(long, default_value = "products_report.csv")]
    products_report: PathBuf,
    /// Also print the salesman ranking
    #[arg(long)]
    print: bool,
    /// Log progress to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();
    logging::init_logger(args.verbose);
    let paths = Paths {
        salesmen_info: args.salesmen_info,
        products: args.products,
        sales_dir: args.sales_dir,
        salesmen_report: args.salesmen_report,
        products_report: args.products_report,
    };
    match sales_report::run(&paths) {
        Ok(report) => {
            if args.print {
                print!("{report}");
            }
            println!("Reports generated successfully.");
        }
        Err(e) => {
            tracing::debug!(error = ?e, "run failed");
            eprintln!("Error generating reports: {e:#}");
        }
    }
}
