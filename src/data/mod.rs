// Price loading, caching, synthetic data and report output
pub mod cache_file;
pub mod price_table;
pub mod report_file;
pub mod synthetic;

// Re-export commonly used types
pub use cache_file::CacheFile;
pub use price_table::PriceTable;
pub use report_file::BatchReport;
pub use synthetic::SyntheticMarket;
