//! Debugging feature flags.
//!
//! Toggle individual diagnostics here; keep them `false` by default so batch
//! runs over many pairs stay quiet.

/// Emit one line per position open/close while simulating.
pub const PRINT_TRADE_EVENTS: bool = false;

/// Emit the AIC of every candidate lag during ADF lag selection.
pub const PRINT_ADF_LAG_SELECTION: bool = false;

/// If non-empty, emit detailed pipeline output only for this pair name.
/// Example: "KO/PEP". Use "" to disable.
pub const PRINT_PIPELINE_FOR_PAIR: &str = "";

/// Emit a one-line performance summary for each evaluated pair.
pub const PRINT_PAIR_SUMMARY: bool = true;

/// Emit detailed serialization/deserialization logs.
pub const PRINT_SERDE: bool = false;
