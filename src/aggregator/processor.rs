use std::fs;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::aggregator::config::AggregatorConfig;
use crate::aggregator::constants::SHARD_FILE_PREFIX;
use crate::aggregator::error::{AggregateError, Result};
use crate::aggregator::line_source::LineSource;
use crate::aggregator::merger::MergeIterator;
use crate::aggregator::shard::ShardReader;
use crate::aggregator::shuffle::ShuffleWriter;
use crate::aggregator::top::{Emitter, TopKSelector};
use crate::aggregator::workdir::ScopedWorkDir;
use crate::aggregator::AggregateStats;

/// Drives the two-phase pipeline: shuffle the input into sorted shard
/// files, then merge the shards and emit the top entries.
pub struct Aggregator {
    config: AggregatorConfig,
}

impl Aggregator {
    pub fn new(config: AggregatorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn run<R: BufRead, W: Write>(&mut self, input: R, output: W) -> Result<AggregateStats> {
        let mut stats = AggregateStats::default();
        let workdir = ScopedWorkDir::create(&self.config.working_dir)?;
        info!("working directory: {}", workdir.path().display());

        let shard_count = self.shuffle(input, workdir.path(), &mut stats)?;
        self.aggregate_top(workdir.path(), shard_count, output, &mut stats)?;

        Ok(stats)
    }

    /// Phase 1: stream the input into sorted, deduplicated shard files.
    fn shuffle<R: BufRead>(
        &self,
        input: R,
        shard_dir: &Path,
        stats: &mut AggregateStats,
    ) -> Result<usize> {
        let mut source = LineSource::new(input);
        let mut writer = ShuffleWriter::new(
            shard_dir,
            self.config.memory_limit_bytes,
            self.config.write_buffer_size_bytes(),
        );

        while let Some(url) = source.next_url()? {
            stats.urls_accepted += 1;
            writer.push(url)?;
        }

        stats.lines_read = source.lines_read();
        stats.oversized_skipped = source.oversized_skipped();
        let shard_count = writer.finish()?;
        stats.shards_written = shard_count;

        info!(
            "shuffle complete: {} URLs from {} lines into {} shards ({} oversized skipped)",
            stats.urls_accepted, stats.lines_read, shard_count, stats.oversized_skipped
        );
        Ok(shard_count)
    }

    /// Phase 2: merge all shards and emit the top entries by count.
    fn aggregate_top<W: Write>(
        &self,
        shard_dir: &Path,
        shard_count: usize,
        output: W,
        stats: &mut AggregateStats,
    ) -> Result<()> {
        let mut readers = Vec::with_capacity(shard_count);
        for path in list_shard_files(shard_dir, shard_count)? {
            readers.push(ShardReader::open(&path, self.config.io_buffer_size_bytes())?);
        }

        let mut merge = MergeIterator::new(readers)?;
        let mut top = TopKSelector::new(self.config.top_entries);
        while merge.advance()? {
            if let Some(stat) = merge.current() {
                stats.distinct_urls += 1;
                top.offer(stat.clone());
            }
        }

        let top_stats = top.into_sorted_stats();
        stats.emitted = top_stats.len();
        Emitter::new(output, self.config.write_buffer_size_bytes()).emit(&top_stats)?;

        info!(
            "aggregation complete: {} distinct URLs, {} emitted",
            stats.distinct_urls, stats.emitted
        );
        Ok(())
    }
}

/// Lists the shard files in name order. The working directory is dedicated:
/// a foreign file name or a count that disagrees with the number of shards
/// written is an invariant violation.
pub(super) fn list_shard_files(shard_dir: &Path, expected: usize) -> Result<Vec<PathBuf>> {
    let mut names = Vec::with_capacity(expected);
    for entry in fs::read_dir(shard_dir)? {
        let name = entry?.file_name();
        let name = name.to_string_lossy().into_owned();
        if !name.starts_with(SHARD_FILE_PREFIX) {
            return Err(AggregateError::Invariant(format!(
                "unexpected file in working directory: {}",
                name
            )));
        }
        names.push(name);
    }
    if names.len() != expected {
        return Err(AggregateError::Invariant(format!(
            "expected {} shard files in working directory, found {}",
            expected,
            names.len()
        )));
    }
    names.sort_unstable();
    Ok(names.into_iter().map(|name| shard_dir.join(name)).collect())
}
