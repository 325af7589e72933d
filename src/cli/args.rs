//! Command line argument parsing for the tweetdex CLI using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

/// tweetdex - index tweet CSV data and search it
#[derive(Parser, Debug, Clone)]
#[command(name = "tweetdex")]
#[command(about = "Index tweet CSV data and run term, wildcard and boolean queries against it")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct TweetdexArgs {
    /// Verbosity level (repeat for more: -v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human", global = true)]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl TweetdexArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            // No flag means the default level 1; each -v adds one.
            self.verbose.saturating_add(1)
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Index a tweet CSV file
    Index(IndexArgs),

    /// Search an index
    Search(SearchArgs),
}

impl Command {
    /// One-line usage of the command, printed after runtime errors.
    pub fn usage(&self) -> &'static str {
        match self {
            Command::Index(_) => "Usage: tweetdex index <INDEX_DIR> <DATA_FILE>",
            Command::Search(_) => "Usage: tweetdex search <INDEX_DIR> <NUM_HITS> [QUERY]...",
        }
    }
}

/// Arguments for indexing
#[derive(Parser, Debug, Clone)]
pub struct IndexArgs {
    /// Path to the index directory (created if missing)
    #[arg(value_name = "INDEX_DIR")]
    pub index_dir: PathBuf,

    /// Tweet CSV file to index
    #[arg(value_name = "DATA_FILE")]
    pub data_file: PathBuf,

    /// Stop at the first malformed record instead of skipping it
    #[arg(long)]
    pub strict: bool,

    /// Buffered documents per segment (0 = one segment per run)
    #[arg(long, default_value = "10000")]
    pub max_buffered_docs: usize,

    /// Schema definition file path (JSON)
    #[arg(short, long, value_name = "SCHEMA_FILE")]
    pub schema_file: Option<PathBuf>,

    /// Skip fsync when closing files
    #[arg(long)]
    pub no_sync: bool,
}

/// Arguments for searching
#[derive(Parser, Debug, Clone)]
pub struct SearchArgs {
    /// Path to the index directory
    #[arg(value_name = "INDEX_DIR")]
    pub index_dir: PathBuf,

    /// Maximum number of results per query
    #[arg(value_name = "NUM_HITS")]
    pub num_hits: usize,

    /// Queries such as `user:bob` or `+text:*#* +polarity:4`; without any,
    /// the built-in demo queries run
    #[arg(value_name = "QUERY")]
    pub queries: Vec<String>,

    /// Field for query clauses that do not name one
    #[arg(long)]
    pub default_field: Option<String>,

    /// Schema definition file path (JSON)
    #[arg(short, long, value_name = "SCHEMA_FILE")]
    pub schema_file: Option<PathBuf>,
}

/// Output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_command() {
        let args = TweetdexArgs::try_parse_from([
            "tweetdex",
            "index",
            "/path/to/index",
            "tweets.csv",
            "--strict",
            "--max-buffered-docs",
            "500",
        ])
        .unwrap();

        if let Command::Index(index_args) = &args.command {
            assert_eq!(index_args.index_dir, PathBuf::from("/path/to/index"));
            assert_eq!(index_args.data_file, PathBuf::from("tweets.csv"));
            assert!(index_args.strict);
            assert_eq!(index_args.max_buffered_docs, 500);
            assert!(index_args.schema_file.is_none());
        } else {
            panic!("Expected Index command");
        }
        assert_eq!(args.command.usage(), "Usage: tweetdex index <INDEX_DIR> <DATA_FILE>");
    }

    #[test]
    fn test_search_command() {
        let args = TweetdexArgs::try_parse_from([
            "tweetdex",
            "search",
            "/path/to/index",
            "10",
            "user:bob",
            "+text:*#* +polarity:4",
        ])
        .unwrap();

        if let Command::Search(search_args) = args.command {
            assert_eq!(search_args.num_hits, 10);
            assert_eq!(search_args.queries, vec!["user:bob", "+text:*#* +polarity:4"]);
        } else {
            panic!("Expected Search command");
        }
    }

    #[test]
    fn test_search_without_queries() {
        let args = TweetdexArgs::try_parse_from(["tweetdex", "search", "idx", "5"]).unwrap();
        if let Command::Search(search_args) = args.command {
            assert!(search_args.queries.is_empty());
        } else {
            panic!("Expected Search command");
        }
    }

    #[test]
    fn test_missing_arguments() {
        assert!(TweetdexArgs::try_parse_from(["tweetdex", "index", "idx"]).is_err());
        assert!(TweetdexArgs::try_parse_from(["tweetdex", "search", "idx", "many"]).is_err());
        assert!(TweetdexArgs::try_parse_from(["tweetdex"]).is_err());
    }

    #[test]
    fn test_verbosity_levels() {
        let args = TweetdexArgs::try_parse_from(["tweetdex", "search", "idx", "1"]).unwrap();
        assert_eq!(args.verbosity(), 1);

        let args =
            TweetdexArgs::try_parse_from(["tweetdex", "-vv", "search", "idx", "1"]).unwrap();
        assert_eq!(args.verbosity(), 3);

        let args = TweetdexArgs::try_parse_from(["tweetdex", "search", "idx", "1", "-q", "-v"])
            .unwrap();
        assert_eq!(args.verbosity(), 0);
    }

    #[test]
    fn test_output_format() {
        let args =
            TweetdexArgs::try_parse_from(["tweetdex", "--format", "json", "search", "idx", "1"])
                .unwrap();
        assert_eq!(args.output_format, OutputFormat::Json);
    }
}
