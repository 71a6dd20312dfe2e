use rand::Rng;
use std::collections::HashMap;
use std::fs;
use std::io::{self, BufReader, Cursor, Read};
use tempfile::TempDir;

use top_urls::{aggregate_top_urls, AggregateError, AggregateStats, AggregatorConfig};

fn test_config(parent: &TempDir, top_entries: usize, memory_limit: u64) -> AggregatorConfig {
    let mut config = AggregatorConfig::default();
    config.memory_limit_bytes = memory_limit;
    config.top_entries = top_entries;
    config.working_dir = parent.path().to_path_buf();
    config
}

/// Runs the pipeline over `input` and returns the output text, asserting
/// that the working directory is gone afterwards.
fn run_pipeline(input: &str, top_entries: usize, memory_limit: u64) -> (String, AggregateStats) {
    let parent = TempDir::new().unwrap();
    let config = test_config(&parent, top_entries, memory_limit);

    let mut output = Vec::new();
    let stats = aggregate_top_urls(Cursor::new(input.to_string()), &mut output, config).unwrap();

    assert_eq!(
        fs::read_dir(parent.path()).unwrap().count(),
        0,
        "working directory should be removed after a successful run"
    );
    (String::from_utf8(output).unwrap(), stats)
}

/// Reference counter: top `k` of the non-empty, non-oversized lines,
/// ordered by count descending then URL ascending.
fn expected_top(input: &str, k: usize) -> String {
    let mut counts: HashMap<&str, i64> = HashMap::new();
    for line in input.lines() {
        if line.is_empty() || line.len() > 1024 {
            continue;
        }
        *counts.entry(line).or_insert(0) += 1;
    }
    let mut stats: Vec<(&str, i64)> = counts.into_iter().collect();
    stats.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    stats
        .iter()
        .take(k)
        .map(|(url, count)| format!("{} {}\n", url, count))
        .collect()
}

#[test]
fn test_tiny_input_top_two() {
    let (output, stats) = run_pipeline("a\nb\na\nc\nb\na\n", 2, 1 << 20);
    assert_eq!(output, "a 3\nb 2\n");
    assert_eq!(stats.urls_accepted, 6);
    assert_eq!(stats.distinct_urls, 3);
    assert_eq!(stats.emitted, 2);
}

#[test]
fn test_equal_counts_break_ties_by_url() {
    let (output, _) = run_pipeline("z\ny\nx\nz\ny\nx\n", 2, 1 << 20);
    assert_eq!(output, "x 2\ny 2\n");
}

#[test]
fn test_oversized_url_is_filtered() {
    let input = format!("{}\nb\nb\n", "a".repeat(2048));
    let (output, stats) = run_pipeline(&input, 1, 1 << 20);
    assert_eq!(output, "b 2\n");
    assert_eq!(stats.oversized_skipped, 1);
}

#[test]
fn test_forced_multi_shard_run() {
    let sample = ["p", "q", "r", "s", "t"];
    let mut rng = rand::thread_rng();
    let mut input = String::new();
    for _ in 0..10_000 {
        input.push_str(sample[rng.gen_range(0..sample.len())]);
        input.push('\n');
    }

    // 10,000 one-byte URLs against a 400-byte limit forces >= 20 shards.
    let (output, stats) = run_pipeline(&input, 3, 400);
    assert!(stats.shards_written >= 20, "got {} shards", stats.shards_written);
    assert_eq!(output, expected_top(&input, 3));
}

#[test]
fn test_empty_input_yields_empty_output() {
    let (output, stats) = run_pipeline("", 100, 1 << 20);
    assert_eq!(output, "");
    assert_eq!(stats.shards_written, 0);
    assert_eq!(stats.emitted, 0);
}

#[test]
fn test_url_with_embedded_space() {
    let (output, _) = run_pipeline("hello world\nhello world\nhello\n", 2, 1 << 20);
    assert_eq!(output, "hello world 2\nhello 1\n");
}

#[test]
fn test_top_zero_yields_empty_output() {
    let (output, _) = run_pipeline("a\nb\na\n", 0, 1 << 20);
    assert_eq!(output, "");
}

#[test]
fn test_top_exceeding_distinct_urls_emits_all() {
    let (output, _) = run_pipeline("b\na\nb\n", 100, 1 << 20);
    assert_eq!(output, "b 2\na 1\n");
}

#[test]
fn test_memory_limit_one_byte_still_correct() {
    let (output, stats) = run_pipeline("a\nb\na\nc\nb\na\n", 2, 1);
    assert_eq!(output, "a 3\nb 2\n");
    // Every push reaches the one-byte limit, so each line becomes a shard.
    assert_eq!(stats.shards_written, 6);
}

#[test]
fn test_url_length_boundary() {
    let kept = "x".repeat(1024);
    let dropped = "y".repeat(1025);
    let input = format!("{kept}\n{kept}\n{dropped}\nb\n");

    let (output, stats) = run_pipeline(&input, 2, 1 << 20);
    assert_eq!(output, format!("{kept} 2\nb 1\n"));
    assert_eq!(stats.oversized_skipped, 1);
}

#[test]
fn test_memory_limit_does_not_change_output() {
    let sample = ["p", "q", "r", "s", "t"];
    let mut rng = rand::thread_rng();
    let mut input = String::new();
    for _ in 0..2_000 {
        input.push_str(sample[rng.gen_range(0..sample.len())]);
        input.push('\n');
    }

    let (baseline, _) = run_pipeline(&input, 3, 1 << 20);
    for memory_limit in [1, 7, 64, 1000] {
        let (output, _) = run_pipeline(&input, 3, memory_limit);
        assert_eq!(output, baseline, "memory_limit = {}", memory_limit);
    }
}

#[test]
fn test_repeated_runs_are_byte_identical() {
    let input = "z\ny\nx\nz\ny\nx\na\n";
    let (first, _) = run_pipeline(input, 4, 4);
    let (second, _) = run_pipeline(input, 4, 4);
    assert_eq!(first, second);
}

#[test]
fn test_randomized_against_in_memory_counter() {
    let sample_urls = [
        "https://pingcap.com/",
        "https://www.bilibili.com/",
        "https://www.github.com/",
        "https://www.amazon.com/",
        "https://store.steampowered.com/",
        "http://a.z/",
        "http://maps.google.com/",
        "http://www.facebook.com/",
        "http://www.instagram.com/",
        "http://www.apple.com/",
        "http://www.sina.com.cn/",
    ];

    let mut rng = rand::thread_rng();
    let entries = 200 + rng.gen_range(0..2000);
    let mut input = String::new();
    for _ in 0..entries {
        input.push_str(sample_urls[rng.gen_range(0..sample_urls.len())]);
        input.push('\n');
    }

    // Keep the shard count bounded the same way a capped-fd deployment would.
    let mut memory_limit = 2000 + rng.gen_range(0..6000);
    if memory_limit < input.len() as u64 / 200 {
        memory_limit = input.len() as u64 / 200;
    }
    let top_entries = 1 + rng.gen_range(0..sample_urls.len() - 1);

    let (output, _) = run_pipeline(&input, top_entries, memory_limit);
    assert_eq!(output, expected_top(&input, top_entries));
}

/// Serves a few URL lines, then fails with an I/O error.
struct FailingReader {
    served: usize,
    limit: usize,
}

impl Read for FailingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.served >= self.limit {
            return Err(io::Error::new(io::ErrorKind::Other, "simulated input failure"));
        }
        let chunk = b"url\n";
        let n = chunk.len().min(buf.len());
        buf[..n].copy_from_slice(&chunk[..n]);
        self.served += n;
        Ok(n)
    }
}

#[test]
fn test_workdir_removed_when_input_fails_mid_stream() {
    let parent = TempDir::new().unwrap();
    // A tiny memory limit guarantees shards already exist when the input fails.
    let config = test_config(&parent, 10, 8);

    let input = BufReader::new(FailingReader {
        served: 0,
        limit: 64,
    });
    let mut output = Vec::new();
    let err = aggregate_top_urls(input, &mut output, config).unwrap_err();
    assert!(matches!(err, AggregateError::Io(_)), "{err}");

    assert_eq!(
        fs::read_dir(parent.path()).unwrap().count(),
        0,
        "working directory should be removed after a failed run"
    );
}
