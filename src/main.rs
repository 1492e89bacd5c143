//! repoindex - Repository embedding index tool
//!
//! Scans a source repository, splits every eligible file into line-aligned
//! chunks with exact byte offsets, embeds the chunks, and writes the result
//! to a single JSON index file.

use anyhow::Result;
use repoindex::cli::{
    auth, index, print_hits_json, print_hits_text, print_stats_json, print_stats_text,
    print_summary_json, print_summary_text, search, stats, Cli, Commands, OutputFormat,
};
use std::path::Path;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse_args();

    // Setup logging; diagnostics go to stderr so JSON output stays clean
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    // Get repository path
    let repo_path = Path::new(&cli.path);

    // Execute command
    match cli.command {
        Commands::Index(args) => {
            let summary = index(repo_path, &args).await?;

            match cli.format {
                OutputFormat::Json => print_summary_json(&summary)?,
                OutputFormat::Text => print_summary_text(&summary),
            }
        }

        Commands::Search(args) => {
            let hits = search(&args).await?;

            match cli.format {
                OutputFormat::Json => print_hits_json(&hits)?,
                OutputFormat::Text => print_hits_text(&hits),
            }
        }

        Commands::Stats(args) => {
            let index_stats = stats(&args)?;

            match cli.format {
                OutputFormat::Json => print_stats_json(&index_stats)?,
                OutputFormat::Text => print_stats_text(&index_stats),
            }
        }

        Commands::Auth(args) => {
            auth(&args)?;
        }

        Commands::Config(args) => {
            handle_config(repo_path, &args)?;
        }
    }

    Ok(())
}

/// Handle config command
fn handle_config(path: &Path, args: &repoindex::cli::ConfigArgs) -> Result<()> {
    use repoindex::repo::{IndexConfig, Repository};

    let repo = Repository::open(path)?;
    let config = repo.config();

    // Showing is the default action
    if args.show || !args.reset {
        println!("Repository Index Configuration");
        println!("==============================\n");

        println!("Include suffixes:");
        for suffix in &config.include_suffixes {
            println!("  - {}", suffix);
        }

        println!("\nExclude suffixes:");
        for suffix in &config.exclude_suffixes {
            println!("  - {}", suffix);
        }

        println!("\nMax chunk size: {}", config.max_chunk_size);
        println!("Model: {}", config.model);
        println!("Batch size: {}", config.batch_size);
    }

    if args.reset {
        let default_config = IndexConfig::default();
        default_config.save(repo.root())?;
        println!("✓ Configuration reset to defaults");
    }

    Ok(())
}
