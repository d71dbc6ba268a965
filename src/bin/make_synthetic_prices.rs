use anyhow::{Context, Result};
use clap::Parser;
use pair_trader::config::PRICE_DATA_PATH;
use pair_trader::data::{CacheFile, PriceTable, SyntheticMarket};
use pair_trader::utils::TimeUtils;
use pair_trader::utils::time_utils::date_to_epoch_ms;
use std::path::PathBuf;

/// Writes a demo price table: two cointegrated pairs plus two unrelated random walks.
#[derive(Parser, Debug)]
struct Args {
    /// Number of daily bars per symbol
    #[arg(long, default_value_t = 1000)]
    bars: usize,

    #[arg(long, default_value = "2020-01-01")]
    start_date: String,

    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Also write the table as JSON next to the bincode cache
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();
    build_synthetic_prices(&Args::parse())
}

fn build_synthetic_prices(args: &Args) -> Result<()> {
    let start_ms = date_to_epoch_ms(&args.start_date)?;
    let mut market = SyntheticMarket::new(args.seed, start_ms, TimeUtils::MS_IN_D, args.bars);
    let interval = TimeUtils::interval_ms_to_string(TimeUtils::MS_IN_D);
    let mut table = PriceTable::new("synthetic-demo", interval);

    for (symbol_a, symbol_b, price_a, hedge, scale_b) in [
        ("AAA", "BBB", 40.0, 0.9, 1.5),
        ("CCC", "DDD", 120.0, 1.2, 0.4),
    ] {
        let (a, b) = market
            .cointegrated_pair(price_a, 0.012, hedge, scale_b, 0.8, 0.01)
            .with_context(|| format!("Failed to simulate {}/{}", symbol_a, symbol_b))?;
        table.insert(symbol_a, a);
        table.insert(symbol_b, b);
    }
    for (symbol, price) in [("WALK1", 75.0), ("WALK2", 20.0)] {
        table.insert(symbol, market.random_walk(price, 0.02)?);
    }

    let output_path = CacheFile::default_cache_path(&table.interval);
    let symbols = table.series.len();
    CacheFile::new(table.clone()).save_to_path(&output_path)?;
    println!(
        "✅ Synthetic cache written to {:?} with {} symbols x {} bars.",
        output_path, symbols, args.bars
    );

    if args.json {
        let json_path = PathBuf::from(PRICE_DATA_PATH).join("synthetic_prices.json");
        table.save_json(&json_path)?;
        println!("✅ JSON copy written to {:?}.", json_path);
    }
    Ok(())
}
