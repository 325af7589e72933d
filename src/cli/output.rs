//! Output formatting for CLI commands.

use std::io::{self, Write};

use serde::Serialize;

use crate::cli::args::{OutputFormat, TweetdexArgs};
use crate::engine::{HitSummary, IndexingReport, SearchReport};
use crate::error::Result;

const SEPARATOR: &str =
    "----------------------------------------------------------------------";

/// Result structure for an indexing run.
#[derive(Debug, Serialize)]
pub struct IndexingResult {
    pub index_dir: String,
    pub documents_indexed: u64,
    pub records_rejected: u64,
    pub segments_written: u64,
    pub duration_ms: u64,
    pub docs_per_second: f64,
}

impl IndexingResult {
    /// Summarize an indexing report.
    pub fn new(index_dir: String, report: &IndexingReport) -> Self {
        let seconds = report.elapsed.as_secs_f64();
        IndexingResult {
            index_dir,
            documents_indexed: report.indexed,
            records_rejected: report.rejected,
            segments_written: report.segments,
            duration_ms: report.elapsed.as_millis() as u64,
            docs_per_second: if seconds > 0.0 {
                report.indexed as f64 / seconds
            } else {
                0.0
            },
        }
    }
}

/// Result structure for one query.
#[derive(Debug, Serialize)]
pub struct QueryResult {
    pub heading: String,
    pub query: String,
    pub hits: Vec<HitSummary>,
    pub total_hits: u64,
    pub duration_ms: u64,
}

impl QueryResult {
    /// Summarize a search report.
    pub fn new(heading: String, query: String, report: SearchReport) -> Self {
        QueryResult {
            heading,
            query,
            duration_ms: report.elapsed.as_millis() as u64,
            total_hits: report.total_hits,
            hits: report.hits,
        }
    }
}

/// Print the result of an indexing run.
pub fn output_indexing_result(result: &IndexingResult, args: &TweetdexArgs) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match args.output_format {
        OutputFormat::Human => write_indexing_human(result, args.verbosity(), &mut out),
        OutputFormat::Json => write_json(result, args.pretty, &mut out),
    }
}

/// Print the result of one query.
pub fn output_query_result(result: &QueryResult, args: &TweetdexArgs) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match args.output_format {
        OutputFormat::Human => write_query_human(result, args.verbosity(), &mut out),
        OutputFormat::Json => write_json(result, args.pretty, &mut out),
    }
}

fn write_indexing_human<W: Write>(result: &IndexingResult, verbosity: u8, out: &mut W) -> Result<()> {
    writeln!(
        out,
        "Indexed {} documents in {} seconds",
        result.documents_indexed,
        result.duration_ms / 1000
    )?;
    if result.records_rejected > 0 {
        writeln!(out, "Skipped {} malformed records", result.records_rejected)?;
    }
    if verbosity > 1 {
        writeln!(
            out,
            "{} segments written to {} ({:.1} docs/s)",
            result.segments_written, result.index_dir, result.docs_per_second
        )?;
    }
    Ok(())
}

fn write_query_human<W: Write>(result: &QueryResult, verbosity: u8, out: &mut W) -> Result<()> {
    writeln!(out, "{}", result.heading)?;
    writeln!(out, "{SEPARATOR}")?;
    for hit in &result.hits {
        writeln!(
            out,
            "{} : {}",
            hit.user.as_deref().unwrap_or(""),
            hit.text.as_deref().unwrap_or("")
        )?;
    }
    writeln!(out, "Found {} results", result.hits.len())?;
    if verbosity > 1 {
        writeln!(
            out,
            "{} total matches for '{}' in {}ms",
            result.total_hits, result.query, result.duration_ms
        )?;
    }
    writeln!(out, "{SEPARATOR}")?;
    Ok(())
}

fn write_json<T: Serialize, W: Write>(result: &T, pretty: bool, out: &mut W) -> Result<()> {
    if pretty {
        serde_json::to_writer_pretty(&mut *out, result)?;
    } else {
        serde_json::to_writer(&mut *out, result)?;
    }
    writeln!(out)?;
    Ok(())
}
