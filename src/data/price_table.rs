use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::config::debug;
use crate::data::cache_file::CacheFile;
use crate::domain::{CandidatePair, PriceSeries};
use crate::error::{PairError, PairResult};

/// Close prices for a universe of symbols sampled at one interval.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct PriceTable {
    pub name: String,
    /// Sampling interval label, e.g. "1d" (looked up in the `IntervalTable`).
    pub interval: String,
    pub series: BTreeMap<String, PriceSeries>,
}

impl PriceTable {
    pub fn new(name: impl Into<String>, interval: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            interval: interval.into(),
            series: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, symbol: impl Into<String>, series: PriceSeries) {
        self.series.insert(symbol.into(), series);
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    pub fn get(&self, symbol: &str) -> Option<&PriceSeries> {
        self.series.get(symbol)
    }

    /// One symbol's prices within `[start_ms, end_ms)`.
    /// An unknown symbol and an empty window are both `MissingSymbolData`.
    pub fn window(&self, symbol: &str, start_ms: i64, end_ms: i64) -> PairResult<PriceSeries> {
        let missing = || PairError::MissingSymbolData {
            symbol: symbol.to_string(),
            start_ms,
            end_ms,
        };
        let window = self
            .get(symbol)
            .ok_or_else(missing)?
            .slice_by_time(start_ms, end_ms);
        if window.is_empty() {
            return Err(missing());
        }
        Ok(window)
    }

    /// Both legs of `pair` within `[start_ms, end_ms)`, restricted to the
    /// timestamps they share so every downstream series lines up.
    pub fn aligned_window(
        &self,
        pair: &CandidatePair,
        start_ms: i64,
        end_ms: i64,
    ) -> PairResult<(PriceSeries, PriceSeries)> {
        let a = self.window(&pair.symbol_a, start_ms, end_ms)?;
        let b = self.window(&pair.symbol_b, start_ms, end_ms)?;
        if a.timestamps_ms() == b.timestamps_ms() {
            return Ok((a, b));
        }

        // Inner join: both timestamp columns are sorted, so walk them together.
        let (mut ts, mut pa, mut pb) = (Vec::new(), Vec::new(), Vec::new());
        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            let (ta, tb) = (a.timestamps_ms()[i], b.timestamps_ms()[j]);
            if ta == tb {
                ts.push(ta);
                pa.push(a.prices()[i]);
                pb.push(b.prices()[j]);
                i += 1;
                j += 1;
            } else if ta < tb {
                i += 1;
            } else {
                j += 1;
            }
        }
        log::debug!(
            "{}: kept {} shared timestamps ({} and {} before the join)",
            pair,
            ts.len(),
            a.len(),
            b.len()
        );
        if ts.is_empty() {
            return Err(PairError::misaligned(format!(
                "{} and {} share no timestamps in [{}, {})",
                pair.symbol_a, pair.symbol_b, start_ms, end_ms
            )));
        }
        Ok((
            PriceSeries::new(ts.clone(), pa)?,
            PriceSeries::new(ts, pb)?,
        ))
    }

    /// Reads a `.json` table or a bincode `.bin` cache file.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let table: PriceTable = match extension {
            "json" => {
                let file =
                    File::open(path).context(format!("Failed to open price file: {:?}", path))?;
                serde_json::from_reader(BufReader::new(file))
                    .context(format!("Failed to parse price table: {:?}", path))?
            }
            "bin" => CacheFile::load_from_path(path)?.data,
            other => bail!(
                "Unsupported price file extension {:?} for {:?} (expected .json or .bin)",
                other,
                path
            ),
        };
        if debug::PRINT_SERDE {
            log::info!(
                "Loaded price table {:?} ({}) with {} symbols from {:?}",
                table.name,
                table.interval,
                table.series.len(),
                path
            );
        }
        Ok(table)
    }

    pub fn save_json(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .context(format!("Failed to create directory: {}", parent.display()))?;
        }
        let file =
            File::create(path).context(format!("Failed to create file: {}", path.display()))?;
        serde_json::to_writer(std::io::BufWriter::new(file), self)
            .context(format!("Failed to write prices to: {}", path.display()))
    }
}
