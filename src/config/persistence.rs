//! File persistence and serialization configuration

/// Directory path for storing price table caches
pub const PRICE_DATA_PATH: &str = "price_data";

/// Base filename for price cache files (without extension)
pub const PRICE_FILENAME_WITHOUT_EXT: &str = "prices";

/// Current version of the price cache serialization format
pub const PRICE_CACHE_VERSION: f64 = 1.0;

/// Default path for the JSON batch report
pub const REPORT_PATH: &str = "pair_reports.json";

/// Generate interval-specific cache filename
/// Example: "prices_1d_v1.bin"
pub fn price_cache_filename(interval: &str) -> String {
    format!(
        "{}_{}_v{}.bin",
        PRICE_FILENAME_WITHOUT_EXT, interval, PRICE_CACHE_VERSION
    )
}
