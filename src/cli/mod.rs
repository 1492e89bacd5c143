//! CLI interface using clap
//!
//! Provides the command-line interface for the repository indexer

mod commands;

pub use commands::*;

use crate::auth::API_KEY_ENV;
use crate::index::DEFAULT_INDEX_FILE;
use clap::{Parser, Subcommand};

/// repoindex - Repository embedding index tool
#[derive(Parser, Debug)]
#[command(name = "repoindex")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the repository (defaults to current directory)
    #[arg(short, long, global = true, default_value = ".")]
    pub path: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json)
    #[arg(short = 'o', long, global = true, default_value = "text")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the chunk index for a repository
    Index(IndexArgs),

    /// Search an index by semantic similarity
    Search(SearchArgs),

    /// Show statistics for an index file
    Stats(StatsArgs),

    /// Manage the stored API key
    Auth(AuthArgs),

    /// Show or reset repository configuration
    Config(ConfigArgs),
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Arguments for index command
#[derive(Parser, Debug)]
pub struct IndexArgs {
    /// Output file for the index
    #[arg(long, default_value = DEFAULT_INDEX_FILE)]
    pub output: String,

    /// Soft ceiling for chunk size in bytes (defaults from config)
    #[arg(long)]
    pub max_chunk_size: Option<usize>,

    /// Embedding model to use (defaults from config)
    #[arg(long)]
    pub model: Option<String>,

    /// Chunks sent per embedding request (defaults from config)
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// API key for the embedding service
    #[arg(long, env = API_KEY_ENV, hide_env_values = true)]
    pub api_key: Option<String>,

    /// Skip embedding generation and store chunks only
    #[arg(long)]
    pub no_embeddings: bool,

    /// Overwrite an existing index file
    #[arg(short, long)]
    pub force: bool,
}

/// Arguments for search command
#[derive(Parser, Debug)]
pub struct SearchArgs {
    /// Query text
    pub query: String,

    /// Index file to search
    #[arg(long, default_value = DEFAULT_INDEX_FILE)]
    pub index: String,

    /// Number of results to show
    #[arg(short = 'k', long, default_value_t = 5)]
    pub top_k: usize,

    /// API key for the embedding service
    #[arg(long, env = API_KEY_ENV, hide_env_values = true)]
    pub api_key: Option<String>,
}

/// Arguments for stats command
#[derive(Parser, Debug)]
pub struct StatsArgs {
    /// Index file to inspect
    #[arg(long, default_value = DEFAULT_INDEX_FILE)]
    pub index: String,
}

/// Arguments for auth command
#[derive(Parser, Debug)]
pub struct AuthArgs {
    /// Store an API key
    #[arg(long, value_name = "KEY")]
    pub set: Option<String>,

    /// Show the stored key, masked
    #[arg(long)]
    pub show: bool,

    /// Remove the stored key
    #[arg(long)]
    pub clear: bool,
}

/// Arguments for config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Show current configuration
    #[arg(long)]
    pub show: bool,

    /// Reset to defaults
    #[arg(long)]
    pub reset: bool,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from(["repoindex", "index", "--no-embeddings"]);
        assert!(matches!(cli.command, Commands::Index(_)));

        if let Commands::Index(args) = cli.command {
            assert!(args.no_embeddings);
            assert_eq!(args.output, DEFAULT_INDEX_FILE);
            assert!(args.max_chunk_size.is_none());
        }
    }

    #[test]
    fn test_search_command() {
        let cli = Cli::parse_from(["repoindex", "search", "parse the config", "-k", "3"]);
        if let Commands::Search(args) = cli.command {
            assert_eq!(args.query, "parse the config");
            assert_eq!(args.top_k, 3);
            assert_eq!(args.index, DEFAULT_INDEX_FILE);
        } else {
            panic!("expected search command");
        }
    }

    #[test]
    fn test_global_path_flag() {
        let cli = Cli::parse_from(["repoindex", "index", "--path", "/tmp/repo"]);
        assert_eq!(cli.path, "/tmp/repo");
    }

    #[test]
    fn test_auth_set() {
        let cli = Cli::parse_from(["repoindex", "auth", "--set", "sk-key"]);
        if let Commands::Auth(args) = cli.command {
            assert_eq!(args.set.as_deref(), Some("sk-key"));
            assert!(!args.clear);
        } else {
            panic!("expected auth command");
        }
    }
}
