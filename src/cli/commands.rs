//! Command implementations for the tweetdex CLI.

use std::path::Path;

use log::{debug, info};

use crate::cli::args::*;
use crate::cli::output::*;
use crate::engine::{EngineConfig, SearchEngine};
use crate::error::{Result, TweetdexError};
use crate::index::WriterConfig;
use crate::query::{BooleanQuery, Query, QueryParser, TermQuery, WildcardQuery};
use crate::schema::{POLARITY, Schema, TEXT, USER};
use crate::storage::StorageConfig;

/// Execute a CLI command.
pub fn execute_command(args: TweetdexArgs) -> Result<()> {
    match &args.command {
        Command::Index(index_args) => index_data(index_args, &args),
        Command::Search(search_args) => search_index(search_args, &args),
    }
}

/// The queries run by `search` when none are given: tweets by one user,
/// tweets mentioning someone and positive tweets with a hashtag.
pub fn demo_queries() -> Result<Vec<(String, Query)>> {
    Ok(vec![
        (
            "Find tweets by user @scotthamilton:".to_string(),
            TermQuery::new(USER, "scotthamilton").into(),
        ),
        (
            "Find tweets that mention another user:".to_string(),
            WildcardQuery::new(TEXT, "*@*")?.into(),
        ),
        (
            "Find tweets with a positive polarity that include a #hashtag:".to_string(),
            BooleanQuery::new()
                .must(WildcardQuery::new(TEXT, "*#*")?)
                .must(TermQuery::new(POLARITY, "4"))
                .into(),
        ),
    ])
}

/// Index a CSV file.
fn index_data(args: &IndexArgs, cli_args: &TweetdexArgs) -> Result<()> {
    let schema = load_schema(args.schema_file.as_deref())?;
    let config = EngineConfig {
        storage: StorageConfig {
            sync_writes: !args.no_sync,
            ..StorageConfig::default()
        },
        writer: WriterConfig {
            max_buffered_docs: args.max_buffered_docs,
        },
    };

    info!(
        "Indexing {} into {}",
        args.data_file.display(),
        args.index_dir.display()
    );
    let engine = SearchEngine::open_dir(&args.index_dir, schema, config)?;
    let report = engine.index_csv(&args.data_file, args.strict)?;

    let result = IndexingResult::new(args.index_dir.display().to_string(), &report);
    output_indexing_result(&result, cli_args)
}

/// Run the given queries, or the demo queries, against an index.
fn search_index(args: &SearchArgs, cli_args: &TweetdexArgs) -> Result<()> {
    if !args.index_dir.is_dir() {
        return Err(TweetdexError::not_found(format!(
            "index directory {}",
            args.index_dir.display()
        )));
    }

    let schema = load_schema(args.schema_file.as_deref())?;
    let engine = SearchEngine::open_dir(&args.index_dir, schema, EngineConfig::default())?;
    debug!(
        "Opened index with {} segments and {} documents",
        engine.store().segment_count(),
        engine.store().doc_count()
    );

    let queries = if args.queries.is_empty() {
        demo_queries()?
    } else {
        let mut parser = QueryParser::new();
        if let Some(field) = &args.default_field {
            parser = parser.with_default_field(field.as_str());
        }
        args.queries
            .iter()
            .map(|text| Ok((format!("Results for {text}:"), parser.parse(text)?)))
            .collect::<Result<Vec<_>>>()?
    };

    for (heading, query) in queries {
        let report = engine.search_summaries(&query, args.num_hits)?;
        let result = QueryResult::new(heading, query.to_string(), report);
        output_query_result(&result, cli_args)?;
    }
    Ok(())
}

/// Load the schema from a file, or use the tweet schema.
fn load_schema(schema_file: Option<&Path>) -> Result<Schema> {
    match schema_file {
        Some(path) => {
            debug!("Loading schema from {}", path.display());
            Schema::from_json_file(path).map_err(|e| {
                TweetdexError::schema(format!("failed to load {}: {e}", path.display()))
            })
        }
        None => Ok(Schema::tweets()),
    }
}
