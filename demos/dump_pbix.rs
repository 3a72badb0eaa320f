//! Command-line tool for inspecting the parts of a `.pbix` container.
//!
//! # Usage
//!
//! Dump every part as JSON:
//! ```sh
//! cargo run --example dump_pbix -- report.pbix
//! ```
//!
//! Dump a single part, keeping the staged files:
//! ```sh
//! cargo run --example dump_pbix -- report.pbix --part layout --staging-dir .pbix-content --keep-staging
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use pbix::{ContentLoader, LoaderOptions, PartName};

/// Print the normalized parts of a Power BI report container
#[derive(Parser, Debug)]
#[command(name = "dump_pbix", version)]
struct Args {
    /// Container to open
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Only print this part (version, layout, metadata, settings, diagramLayout, connections)
    #[arg(short, long)]
    part: Option<PartName>,

    /// Print the page display names instead of part content
    #[arg(long)]
    sections: bool,

    /// Stage into this directory instead of a temporary one
    #[arg(long)]
    staging_dir: Option<PathBuf>,

    /// Leave the staged files on disk
    #[arg(long)]
    keep_staging: bool,

    /// Give up extraction after this many seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Maximum nesting depth for embedded JSON
    #[arg(long, default_value_t = pbix::normalize::DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Load parts one after another
    #[arg(long)]
    sequential: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();

    let mut options = LoaderOptions::new()
        .with_keep_staging(args.keep_staging)
        .with_max_depth(args.max_depth)
        .with_parallel(!args.sequential);
    if let Some(dir) = args.staging_dir {
        options = options.with_staging_dir(dir);
    }
    if let Some(secs) = args.timeout_secs {
        options = options.with_deadline(Duration::from_secs(secs));
    }

    let doc = ContentLoader::new(options).open(&args.input).await?;

    if args.sections {
        for page in doc.sections().unwrap_or_default() {
            println!("{page}");
        }
    } else {
        let value = match args.part {
            Some(part) => doc.get(part).unwrap_or_default(),
            None => doc.to_json(),
        };
        println!("{}", serde_json::to_string_pretty(&value)?);
    }

    for diagnostic in doc.diagnostics() {
        eprintln!("{diagnostic}");
    }
    Ok(())
}
