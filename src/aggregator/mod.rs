pub mod config;
pub mod constants;
pub mod error;
pub mod line_source;
pub mod merger;
pub mod processor;
pub mod shard;
pub mod shuffle;
pub mod stat;
pub mod top;
pub mod workdir;


pub use config::AggregatorConfig;
pub use error::{AggregateError, Result};
pub use processor::Aggregator;
pub use stat::Stat;

use std::io::{BufRead, Write};

/// Counters reported after a pipeline run.
#[derive(Debug, Default, Clone)]
pub struct AggregateStats {
    pub lines_read: u64,
    pub urls_accepted: u64,
    pub oversized_skipped: u64,
    pub shards_written: usize,
    pub distinct_urls: u64,
    pub emitted: usize,
}

/// Counts URL frequencies in `input` and writes the top entries to `output`.
pub fn aggregate_top_urls<R: BufRead, W: Write>(
    input: R,
    output: W,
    config: AggregatorConfig,
) -> Result<AggregateStats> {
    let mut aggregator = Aggregator::new(config)?;
    aggregator.run(input, output)
}
