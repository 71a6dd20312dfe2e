use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::io::{BufWriter, Write};

use crate::aggregator::error::Result;
use crate::aggregator::stat::Stat;

/// Bounded min-heap keeping the K records with the highest counts seen on
/// the merge stream. The root is the weakest record under the composite
/// (count, URL) order, so boundary collisions are resolved exactly as the
/// final output order resolves them.
pub struct TopKSelector {
    heap: BinaryHeap<Reverse<Stat>>,
    capacity: usize,
}

impl TopKSelector {
    pub fn new(capacity: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(capacity.saturating_add(1)),
            capacity,
        }
    }

    pub fn offer(&mut self, stat: Stat) {
        if self.capacity == 0 {
            return;
        }
        if self.heap.len() < self.capacity {
            self.heap.push(Reverse(stat));
            return;
        }
        if let Some(Reverse(weakest)) = self.heap.peek() {
            if *weakest <= stat {
                self.heap.push(Reverse(stat));
                while self.heap.len() > self.capacity {
                    self.heap.pop();
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Drains the heap into output order: count descending, then URL
    /// ascending.
    pub fn into_sorted_stats(self) -> Vec<Stat> {
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|Reverse(stat)| stat)
            .collect()
    }
}

/// Writes the final records as `<url> <count>` lines through a large
/// buffer, flushing at the end.
pub struct Emitter<W: Write> {
    out: BufWriter<W>,
}

impl<W: Write> Emitter<W> {
    pub fn new(sink: W, write_buffer_size: usize) -> Self {
        Self {
            out: BufWriter::with_capacity(write_buffer_size, sink),
        }
    }

    pub fn emit(mut self, stats: &[Stat]) -> Result<()> {
        for stat in stats {
            writeln!(self.out, "{} {}", stat.url, stat.count)?;
        }
        self.out.flush()?;
        Ok(())
    }
}
