use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config::{PRICE_CACHE_VERSION, PRICE_DATA_PATH, price_cache_filename};
use crate::data::price_table::PriceTable;

/// Binary price cache: a `PriceTable` stamped with format version and write time.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CacheFile {
    pub version: f64,
    pub timestamp_ms: i64,
    pub data: PriceTable,
}

impl CacheFile {
    pub fn new(data: PriceTable) -> Self {
        Self {
            version: PRICE_CACHE_VERSION,
            timestamp_ms: Utc::now().timestamp_millis(),
            data,
        }
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let file = File::open(path).context(format!("Failed to open cache file: {:?}", path))?;
        let mut reader = BufReader::new(file);
        let cache: CacheFile = bincode::deserialize_from(&mut reader)
            .context(format!("Failed to deserialize cache: {:?}", path))?;
        if cache.version != PRICE_CACHE_VERSION {
            log::warn!(
                "Cache {:?} has version {} (current {}); reading it anyway",
                path,
                cache.version,
                PRICE_CACHE_VERSION
            );
        }
        Ok(cache)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .context(format!("Failed to create directory: {}", parent.display()))?;
        }
        let file =
            File::create(path).context(format!("Failed to create file: {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        bincode::serialize_into(&mut writer, self)
            .context(format!("Failed to serialize cache to: {}", path.display()))
    }

    pub fn default_cache_path(interval: &str) -> PathBuf {
        PathBuf::from(PRICE_DATA_PATH).join(price_cache_filename(interval))
    }
}
