use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use tracing::info;

use top_urls::utils::{format_bytes, setup_logging};
use top_urls::{Aggregator, AggregatorConfig};

#[derive(Parser)]
#[command(name = "top-urls")]
#[command(about = "External-memory top-K URL frequency aggregator")]
struct Args {
    #[arg(short, long, help = "Input file with one URL per line")]
    input: PathBuf,

    #[arg(short, long, help = "Output file for the top URLs")]
    output: PathBuf,

    #[arg(short, long, help = "Configuration file (JSON)")]
    config: Option<PathBuf>,

    #[arg(short, long, help = "Memory limit in bytes for the shuffle batch")]
    mem_limit: Option<u64>,

    #[arg(short, long, help = "Number of most frequent URLs to output")]
    top_entries: Option<usize>,

    #[arg(short, long, help = "Parent directory for the shard working directory")]
    working_dir: Option<PathBuf>,

    #[arg(short, long, help = "Verbose output")]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    setup_logging(if args.verbose { "verbose" } else { "normal" })?;

    let mut config = match &args.config {
        Some(path) => AggregatorConfig::from_file(path)?,
        None => AggregatorConfig::default(),
    };
    if let Some(mem_limit) = args.mem_limit {
        config.memory_limit_bytes = mem_limit;
    }
    if let Some(top_entries) = args.top_entries {
        config.top_entries = top_entries;
    }
    if let Some(working_dir) = args.working_dir {
        config.working_dir = working_dir;
    }

    let input = File::open(&args.input)
        .with_context(|| format!("unable to open input file '{}'", args.input.display()))?;
    let output = File::create(&args.output)
        .with_context(|| format!("unable to create output file '{}'", args.output.display()))?;

    let input_size = input.metadata()?.len();
    info!(
        "input {} has {}; memory limit {}; expected to use {} shards; output to {} for {} most frequent URLs",
        args.input.display(),
        format_bytes(input_size),
        format_bytes(config.memory_limit_bytes),
        input_size / config.memory_limit_bytes + 1,
        args.output.display(),
        config.top_entries
    );

    let mut aggregator = Aggregator::new(config)?;
    let stats = aggregator.run(BufReader::new(input), output)?;

    info!(
        "done: {} lines read, {} URLs counted, {} distinct, {} shards, {} entries written",
        stats.lines_read, stats.urls_accepted, stats.distinct_urls, stats.shards_written, stats.emitted
    );

    Ok(())
}
