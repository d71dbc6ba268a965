//! Configuration module for the pair trader.

pub mod analysis;
pub mod intervals;

pub mod debug;

pub mod persistence;

// Re-export commonly used items
pub use analysis::STRATEGY;
pub use intervals::{IntervalParams, IntervalTable};
pub use persistence::{PRICE_CACHE_VERSION, PRICE_DATA_PATH, REPORT_PATH, price_cache_filename};
