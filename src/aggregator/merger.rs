use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::aggregator::error::{AggregateError, Result};
use crate::aggregator::shard::ShardReader;
use crate::aggregator::stat::Stat;

/// One shard's current record inside the merge heap. Ordered by URL only;
/// equal URLs across shards commute under count addition, so no further
/// tie-break is needed.
#[derive(Debug)]
struct MergeEntry {
    stat: Stat,
    shard: usize,
}

impl PartialEq for MergeEntry {
    fn eq(&self, other: &Self) -> bool {
        self.stat.url == other.stat.url
    }
}

impl Eq for MergeEntry {}

impl PartialOrd for MergeEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MergeEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.stat.url.cmp(&other.stat.url)
    }
}

/// K-way merge over all shard readers. Emits exactly one record per
/// distinct URL, with counts summed across shards, in ascending URL order.
#[derive(Debug)]
pub struct MergeIterator {
    readers: Vec<ShardReader>,
    heap: BinaryHeap<Reverse<MergeEntry>>,
    current: Option<Stat>,
}

impl MergeIterator {
    /// Primes every reader once. Readers that are exhausted without error
    /// are discarded (empty shards are permitted); a reader that was
    /// already advanced is an invariant violation.
    pub fn new(mut readers: Vec<ShardReader>) -> Result<Self> {
        let mut heap = BinaryHeap::with_capacity(readers.len());
        for (shard, reader) in readers.iter_mut().enumerate() {
            if reader.current().is_some() {
                return Err(AggregateError::Invariant(format!(
                    "shard reader for {} was advanced before the merge started",
                    reader.file()
                )));
            }
            if reader.advance()? {
                if let Some(stat) = reader.current() {
                    heap.push(Reverse(MergeEntry {
                        stat: stat.clone(),
                        shard,
                    }));
                }
            }
        }
        Ok(Self {
            readers,
            heap,
            current: None,
        })
    }

    /// Advances to the next distinct URL, summing its counts from every
    /// shard whose head matches. Returns false once all shards are drained.
    pub fn advance(&mut self) -> Result<bool> {
        let url = match self.heap.peek() {
            Some(Reverse(entry)) => entry.stat.url.clone(),
            None => {
                self.current = None;
                return Ok(false);
            }
        };

        let mut total: i64 = 0;
        while let Some(Reverse(top)) = self.heap.peek() {
            if top.stat.url != url {
                break;
            }
            let Some(Reverse(entry)) = self.heap.pop() else {
                break;
            };
            total += entry.stat.count;
            let reader = &mut self.readers[entry.shard];
            if reader.advance()? {
                if let Some(stat) = reader.current() {
                    self.heap.push(Reverse(MergeEntry {
                        stat: stat.clone(),
                        shard: entry.shard,
                    }));
                }
            }
        }

        self.current = Some(Stat::new(url, total));
        Ok(true)
    }

    /// The aggregated record at the current position, if any.
    pub fn current(&self) -> Option<&Stat> {
        self.current.as_ref()
    }

    pub fn is_done(&self) -> bool {
        self.heap.is_empty()
    }
}
