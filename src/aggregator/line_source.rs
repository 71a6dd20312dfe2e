use std::io::BufRead;
use tracing::warn;

use crate::aggregator::constants::{MAX_URL_BYTES, URL_DIAGNOSTIC_PREFIX_BYTES};
use crate::aggregator::error::Result;

/// Line-oriented reader over the input stream. Yields non-empty URLs with
/// the line terminator stripped; empty lines are dropped silently and
/// oversized lines are dropped with a diagnostic.
pub struct LineSource<R> {
    reader: R,
    line: String,
    lines_read: u64,
    oversized_skipped: u64,
}

impl<R: BufRead> LineSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
            lines_read: 0,
            oversized_skipped: 0,
        }
    }

    /// Returns the next URL, or `None` at end of input.
    pub fn next_url(&mut self) -> Result<Option<String>> {
        loop {
            self.line.clear();
            if self.reader.read_line(&mut self.line)? == 0 {
                return Ok(None);
            }
            self.lines_read += 1;

            if self.line.ends_with('\n') {
                self.line.pop();
                if self.line.ends_with('\r') {
                    self.line.pop();
                }
            }

            if self.line.is_empty() {
                continue;
            }
            if self.line.len() > MAX_URL_BYTES {
                warn!(
                    "URL is too long, skipping: {} ...",
                    str_prefix(&self.line, URL_DIAGNOSTIC_PREFIX_BYTES)
                );
                self.oversized_skipped += 1;
                continue;
            }

            return Ok(Some(self.line.clone()));
        }
    }

    pub fn lines_read(&self) -> u64 {
        self.lines_read
    }

    pub fn oversized_skipped(&self) -> u64 {
        self.oversized_skipped
    }
}

/// Longest prefix of `s` that is at most `max_bytes` long and ends on a
/// char boundary.
fn str_prefix(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
