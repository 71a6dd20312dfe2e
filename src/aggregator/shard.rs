use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::aggregator::error::{AggregateError, Result};
use crate::aggregator::stat::Stat;

/// Forward, single-pass reader over one shard file. The file is expected
/// to hold `<url> <count>` lines in strictly ascending URL order; any
/// violation is reported as a corrupt shard.
#[derive(Debug)]
pub struct ShardReader {
    reader: BufReader<File>,
    file: String,
    line: String,
    current: Option<Stat>,
    done: bool,
}

impl ShardReader {
    pub fn open(path: &Path, io_buffer_size: usize) -> Result<Self> {
        let file = File::open(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self {
            reader: BufReader::with_capacity(io_buffer_size, file),
            file: name,
            line: String::new(),
            current: None,
            done: false,
        })
    }

    /// Advances to the next record. Returns false at end of file; once
    /// done, further calls are no-ops returning false.
    pub fn advance(&mut self) -> Result<bool> {
        if self.done {
            return Ok(false);
        }
        self.line.clear();
        let read = match self.reader.read_line(&mut self.line) {
            Ok(n) => n,
            Err(err) => {
                self.done = true;
                return Err(err.into());
            }
        };
        if read == 0 {
            self.done = true;
            return Ok(false);
        }
        if self.line.ends_with('\n') {
            self.line.pop();
        }

        let idx = match self.line.rfind(' ') {
            Some(idx) => idx,
            None => {
                self.done = true;
                return Err(AggregateError::Parse {
                    file: self.file.clone(),
                    message: format!("line has no count separator: {}", self.line),
                });
            }
        };
        let url = &self.line[..idx];

        if let Some(prev) = &self.current {
            if url <= prev.url.as_str() {
                self.done = true;
                return Err(AggregateError::CorruptShard {
                    file: self.file.clone(),
                    message: format!(
                        "URLs are not strictly ascending; previous '{}', next '{}'",
                        prev.url, url
                    ),
                });
            }
        }

        let count = match self.line[idx + 1..].parse::<i64>() {
            Ok(count) if count >= 0 => count,
            Ok(count) => {
                self.done = true;
                return Err(AggregateError::Parse {
                    file: self.file.clone(),
                    message: format!("negative count {} for URL '{}'", count, url),
                });
            }
            Err(err) => {
                self.done = true;
                return Err(AggregateError::Parse {
                    file: self.file.clone(),
                    message: format!("invalid count '{}': {}", &self.line[idx + 1..], err),
                });
            }
        };

        self.current = Some(Stat::new(url.to_string(), count));
        Ok(true)
    }

    /// The record at the current position, if any.
    pub fn current(&self) -> Option<&Stat> {
        self.current.as_ref()
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn file(&self) -> &str {
        &self.file
    }
}
