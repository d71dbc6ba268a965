use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;

use crate::analysis::{BacktestConfig, PairOutcome};

/// Everything a batch run produced, written out as one JSON document.
/// Undefined floats (warm-up z-scores, a degenerate ADF statistic) serialize as `null`.
#[derive(Serialize, Debug, Clone)]
pub struct BatchReport {
    pub generated_at_ms: i64,
    pub price_table: String,
    pub config: BacktestConfig,
    pub evaluated: usize,
    pub not_cointegrated: usize,
    pub failed: usize,
    pub outcomes: Vec<PairOutcome>,
}

impl BatchReport {
    pub fn new(
        price_table: impl Into<String>,
        config: BacktestConfig,
        outcomes: Vec<PairOutcome>,
    ) -> Self {
        let (mut evaluated, mut not_cointegrated, mut failed) = (0, 0, 0);
        for outcome in &outcomes {
            match outcome {
                PairOutcome::Evaluated(_) => evaluated += 1,
                PairOutcome::NotCointegrated { .. } => not_cointegrated += 1,
                PairOutcome::Failed { .. } => failed += 1,
            }
        }
        Self {
            generated_at_ms: Utc::now().timestamp_millis(),
            price_table: price_table.into(),
            config,
            evaluated,
            not_cointegrated,
            failed,
            outcomes,
        }
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .context(format!("Failed to create directory: {}", parent.display()))?;
        }
        let file =
            File::create(path).context(format!("Failed to create file: {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)
            .context(format!("Failed to write report to: {}", path.display()))
    }
}
