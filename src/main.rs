use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};
use monthly_sales::{analyze_file, Groups, Options};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use std::path::PathBuf;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum Format {
    #[default]
    Text,
    Json,
}

/// Computes monthly sales metrics from a delimited sales file.
///
/// The file must have a header line, then one sale per line with the columns
/// `date, product, category, quantity, revenue`.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Path to the sales file
    #[arg(default_value = "data.csv")]
    path: PathBuf,

    /// Field delimiter (a single ASCII character)
    #[arg(short, long, default_value_t = ',')]
    delimiter: char,

    /// Product group file: lines of `GROUP_NAME | GROUP_REGEX`
    #[arg(short, long)]
    groups: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t)]
    format: Format,

    /// Log more detail to stderr (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn options(&self) -> Result<Options> {
        let Ok(delimiter) = u8::try_from(self.delimiter) else {
            bail!("delimiter {:?} is not an ASCII character", self.delimiter);
        };
        if !delimiter.is_ascii() {
            bail!("delimiter {:?} is not an ASCII character", self.delimiter);
        }
        let groups = match &self.groups {
            Some(path) => Groups::from_file(path)?,
            None => Groups::default(),
        };
        Ok(Options { delimiter, groups })
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);
    let opts = args.options()?;
    let (report, summary) = analyze_file(&args.path, &opts)?;
    if summary.invalid > 0 {
        warn!(
            invalid = summary.invalid,
            "some rows had unparseable values and were left out"
        );
    }
    info!(?summary, "done");
    match args.format {
        Format::Text => print!("{report}"),
        Format::Json => println!("{}", report.to_json()?),
    }
    Ok(())
}
