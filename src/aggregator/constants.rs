pub const DEFAULT_MEMORY_LIMIT_BYTES: u64 = 768 * BYTES_PER_MB as u64;
pub const DEFAULT_TOP_ENTRIES: usize = 100;
pub const DEFAULT_IO_BUFFER_SIZE_KB: usize = 64;
pub const DEFAULT_WRITE_BUFFER_SIZE_KB: usize = 1024;

pub const MIN_MEMORY_LIMIT_BYTES: u64 = 1;
pub const MIN_BUFFER_SIZE_KB: usize = 1;

pub const BYTES_PER_KB: usize = 1024;
pub const BYTES_PER_MB: usize = 1024 * 1024;

/// URLs longer than this are dropped during shuffle.
pub const MAX_URL_BYTES: usize = 1024;
/// How much of an oversized URL is echoed in the diagnostic.
pub const URL_DIAGNOSTIC_PREFIX_BYTES: usize = 512;

pub const SHARD_FILE_PREFIX: &str = "shard-";
pub const WORKDIR_PREFIX: &str = "tmp-";
