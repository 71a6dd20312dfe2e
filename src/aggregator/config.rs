use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::aggregator::constants::*;
use crate::aggregator::error::{AggregateError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatorConfig {
    pub memory_limit_bytes: u64,
    pub top_entries: usize,
    pub working_dir: PathBuf,
    pub io_buffer_size_kb: usize,
    pub write_buffer_size_kb: usize,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            memory_limit_bytes: DEFAULT_MEMORY_LIMIT_BYTES,
            top_entries: DEFAULT_TOP_ENTRIES,
            working_dir: PathBuf::from("."),
            io_buffer_size_kb: DEFAULT_IO_BUFFER_SIZE_KB,
            write_buffer_size_kb: DEFAULT_WRITE_BUFFER_SIZE_KB,
        }
    }
}

impl AggregatorConfig {
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content).map_err(|err| {
            AggregateError::Config(format!("cannot parse {}: {}", path.display(), err))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_file(&self, path: &std::path::Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|err| AggregateError::Config(format!("cannot serialize config: {}", err)))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.memory_limit_bytes < MIN_MEMORY_LIMIT_BYTES {
            return Err(AggregateError::Config(format!(
                "memory limit must be at least {} byte",
                MIN_MEMORY_LIMIT_BYTES
            )));
        }
        if self.io_buffer_size_kb < MIN_BUFFER_SIZE_KB
            || self.write_buffer_size_kb < MIN_BUFFER_SIZE_KB
        {
            return Err(AggregateError::Config(format!(
                "buffer sizes must be at least {} KB",
                MIN_BUFFER_SIZE_KB
            )));
        }
        Ok(())
    }

    pub fn io_buffer_size_bytes(&self) -> usize {
        self.io_buffer_size_kb * BYTES_PER_KB
    }

    pub fn write_buffer_size_bytes(&self) -> usize {
        self.write_buffer_size_kb * BYTES_PER_KB
    }
}
