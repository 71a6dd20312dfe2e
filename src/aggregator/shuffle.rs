use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::aggregator::constants::SHARD_FILE_PREFIX;
use crate::aggregator::error::Result;

/// Accumulates URLs in memory and spills them to sorted shard files once
/// the batch reaches the memory limit.
pub struct ShuffleWriter {
    shard_dir: PathBuf,
    memory_limit: u64,
    write_buffer_size: usize,
    batch: Vec<String>,
    batch_bytes: u64,
    shard_index: usize,
}

impl ShuffleWriter {
    pub fn new(shard_dir: &Path, memory_limit: u64, write_buffer_size: usize) -> Self {
        Self {
            shard_dir: shard_dir.to_path_buf(),
            memory_limit,
            write_buffer_size,
            batch: Vec::new(),
            batch_bytes: 0,
            shard_index: 0,
        }
    }

    /// Appends a URL to the current batch, flushing a shard once the
    /// accumulated URL bytes reach the memory limit.
    pub fn push(&mut self, url: String) -> Result<()> {
        self.batch_bytes += url.len() as u64;
        self.batch.push(url);
        if self.batch_bytes >= self.memory_limit {
            self.flush()?;
        }
        Ok(())
    }

    /// Flushes any remaining batch and returns the number of shards written.
    pub fn finish(mut self) -> Result<usize> {
        if !self.batch.is_empty() {
            self.flush()?;
        }
        Ok(self.shard_index)
    }

    pub fn shards_written(&self) -> usize {
        self.shard_index
    }

    /// Sorts the batch, collapses runs of equal URLs into `<url> <count>`
    /// lines and writes them to a fresh shard file.
    fn flush(&mut self) -> Result<()> {
        let mut batch = std::mem::take(&mut self.batch);
        self.batch_bytes = 0;
        batch.sort_unstable();

        let path = self
            .shard_dir
            .join(format!("{}{:06}", SHARD_FILE_PREFIX, self.shard_index));
        let file = File::create(&path)?;
        let mut out = BufWriter::with_capacity(self.write_buffer_size, file);
        self.shard_index += 1;

        let mut last: Option<&String> = None;
        let mut count: i64 = 0;
        for url in &batch {
            match last {
                Some(prev) if prev == url => count += 1,
                Some(prev) => {
                    writeln!(out, "{} {}", prev, count)?;
                    last = Some(url);
                    count = 1;
                }
                None => {
                    last = Some(url);
                    count = 1;
                }
            }
        }
        if let Some(prev) = last {
            writeln!(out, "{} {}", prev, count)?;
        }

        out.flush()?;
        Ok(())
    }
}
