use anyhow::{Context, Result};
use clap::Parser;

use pair_trader::{
    Cli,       // The struct from lib.rs
    run_batch, // The function from lib.rs
};

fn main() -> Result<()> {
    // A. Init Logging
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panicked: {:?}", panic_info);
    }));
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    // B. Parse Args
    let args = Cli::parse();
    #[cfg(debug_assertions)]
    log::info!("Parsed arguments: {:?}", args);

    // C. Evaluate
    let report = run_batch(&args)?;
    log::info!(
        "Done: {} evaluated, {} not cointegrated, {} failed",
        report.evaluated,
        report.not_cointegrated,
        report.failed
    );

    // D. Write Report
    report
        .save_to_path(&args.output)
        .with_context(|| format!("Failed to save report to {:?}", args.output))?;
    log::info!("✅ Report written to {:?}", args.output);
    Ok(())
}
