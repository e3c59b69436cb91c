use clap::Parser;
use dirsync_common::{load_config, ComparisonResult, RelativePath, SyncMode, SyncOptions};
use dirsync_core::Synchronizer;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dirsync")]
#[command(author = "DirSync Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Directory comparison and one-way synchronization", long_about = None)]
struct Cli {
    /// Source directory
    source: PathBuf,

    /// Destination directory
    destination: PathBuf,

    /// Only compare, don't copy files (no filesystem changes)
    #[arg(long, conflicts_with = "sync")]
    no_copy: bool,

    /// Make destination an exact copy of source (erase divergent contents)
    #[arg(long)]
    sync: bool,

    /// Restrict all operations to one file or subtree (relative path)
    #[arg(long, value_name = "RELPATH")]
    only: Option<String>,

    /// Maximum directory depth to traverse
    #[arg(long, value_name = "N")]
    max_depth: Option<usize>,

    /// Ignore patterns (can be specified multiple times)
    #[arg(short, long)]
    ignore: Vec<String>,

    /// Output the result as JSON
    #[arg(long)]
    json: bool,
}

fn main() {
    // Tracing to stderr so JSON output can go cleanly to stdout
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(clean) => {
            if !clean {
                std::process::exit(1);
            }
        }
        Err(e) => {
            error!("Run failed: {}", e);
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli) -> Result<bool, Box<dyn std::error::Error>> {
    let mut config = load_config(false)?;

    if !cli.ignore.is_empty() {
        config.ignore_patterns.extend(cli.ignore.clone());
    }
    if cli.max_depth.is_some() {
        config.max_depth = cli.max_depth;
    }

    let mode = resolve_mode(cli.no_copy, cli.sync);
    if mode == SyncMode::Mirror {
        info!(
            "SYNC MODE: {} will be replaced with an exact copy of {}",
            cli.destination.display(),
            cli.source.display()
        );
    }

    let options = SyncOptions {
        mode,
        filter: cli.only.as_deref().map(RelativePath::new),
        max_depth: config.max_depth.unwrap_or(SyncOptions::default().max_depth),
    };

    info!("Comparing directories...");
    let synchronizer = Synchronizer::new(&config, options);
    let result = synchronizer.run(&cli.source, &cli.destination);

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_report(&result);
    }

    Ok(result.errors.is_empty())
}

fn resolve_mode(no_copy: bool, sync: bool) -> SyncMode {
    if no_copy {
        SyncMode::Report
    } else if sync {
        SyncMode::Mirror
    } else {
        SyncMode::Copy
    }
}

fn print_report(result: &ComparisonResult) {
    let rule = "=".repeat(60);

    println!("\n{}", rule);
    println!("FOLDER COMPARISON REPORT");
    println!("{}", rule);
    println!("Source:      {}", result.source.display());
    println!("Destination: {}", result.destination.display());
    println!("{}", rule);

    if !result.unique_to_source.is_empty() {
        println!(
            "\nUnique in source ({}):",
            result.unique_to_source.len()
        );
        for path in &result.unique_to_source {
            println!("  - {}", path);
        }
    }

    if !result.common.is_empty() {
        println!("\nCommon files ({}):", result.common.len());
        if result.common.len() < 5 {
            for path in &result.common {
                println!("  - {}", path);
            }
        }
    }

    if !result.unique_to_destination.is_empty() {
        println!(
            "\nUnique in destination ({}):",
            result.unique_to_destination.len()
        );
        for path in &result.unique_to_destination {
            println!("  - {}", path);
        }
    }

    if !result.deleted.is_empty() {
        println!("\nDeleted files ({}):", result.deleted.len());
        for path in &result.deleted {
            println!("  - {}", path);
        }
    }

    if !result.copied.is_empty() {
        println!("\nSuccessfully copied files ({}):", result.copied.len());
        for path in &result.copied {
            println!("  - {}", path);
        }
    }

    if !result.warnings.is_empty() {
        println!("\nWarnings ({}):", result.warnings.len());
        for warning in &result.warnings {
            println!("  - {}", warning);
        }
    }

    if !result.errors.is_empty() {
        println!("\nErrors ({}):", result.errors.len());
        for error in &result.errors {
            println!("  - {}", error);
        }
    }

    println!("\n{}\n", rule);
}
