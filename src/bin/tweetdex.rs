//! tweetdex CLI binary.

use std::io::Write;
use std::process;

use anyhow::Context;
use clap::Parser;
use env_logger::Builder;
use log::LevelFilter;

use tweetdex::cli::args::*;
use tweetdex::cli::commands::*;

fn main() {
    // Parse command line arguments using clap
    let args = TweetdexArgs::parse();

    let log_level = match args.verbosity() {
        0 => LevelFilter::Error, // Quiet mode
        1 => LevelFilter::Warn,  // Default
        2 => LevelFilter::Info,  // Verbose
        _ => LevelFilter::Debug, // Very verbose (3+)
    };

    Builder::new()
        .filter_level(log_level)
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .init();

    let usage = args.command.usage();
    if let Err(e) = run(args) {
        eprintln!("Error: {e:#}");
        eprintln!("{usage}");
        process::exit(1);
    }
}

fn run(args: TweetdexArgs) -> anyhow::Result<()> {
    let context = match &args.command {
        Command::Index(index_args) => format!(
            "failed to index {} into {}",
            index_args.data_file.display(),
            index_args.index_dir.display()
        ),
        Command::Search(search_args) => {
            format!("failed to search {}", search_args.index_dir.display())
        }
    };
    execute_command(args).context(context)
}
