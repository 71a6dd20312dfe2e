pub mod aggregator;
pub mod utils;

// Re-export main types for easier access
pub use aggregator::config::AggregatorConfig;
pub use aggregator::error::AggregateError;
pub use aggregator::processor::Aggregator;
pub use aggregator::stat::Stat;
pub use aggregator::{aggregate_top_urls, AggregateStats};
