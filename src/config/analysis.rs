//! Strategy and statistics configuration

/// Z-score thresholds used when no override is supplied.
pub struct SignalDefaults {
    // Open a position once |z| rises above this
    pub entry_threshold: f64,
    // Close once z falls back inside (-exit, +exit)
    pub exit_threshold: f64,
}

/// Trading frictions, as fractions of price (0.001 = 10 bps).
pub struct CostDefaults {
    // Charged once per leg per side: four times per round trip
    pub fee_rate: f64,
    // Applied against the trader on every fill of both legs
    pub slippage: f64,
}

/// Settings for the Engle-Granger test
pub struct CointegrationSettings {
    // p-value below which a pair counts as cointegrated (caller-side decision)
    pub significance: f64,
    // Fewer aligned observations than this and the OLS + ADF lags are unreliable
    pub min_observations: usize,
    // Relative size below which a regression residual is treated as constant
    pub degenerate_spread_tolerance: f64,
    // Reciprocal condition number of XᵗX below which OLS reports a singular matrix
    pub min_reciprocal_condition: f64,
}

/// The Master Strategy Configuration
pub struct StrategyConfig {
    pub signal: SignalDefaults,
    pub costs: CostDefaults,
    pub cointegration: CointegrationSettings,
    // Annual risk-free rate subtracted (per period) before computing Sharpe
    pub risk_free_rate: f64,
}

pub const STRATEGY: StrategyConfig = StrategyConfig {
    signal: SignalDefaults {
        entry_threshold: 2.0,
        exit_threshold: 0.5,
    },

    costs: CostDefaults {
        fee_rate: 0.0,
        slippage: 0.0,
    },

    cointegration: CointegrationSettings {
        significance: 0.05,
        min_observations: 20,
        degenerate_spread_tolerance: 1e-10,
        min_reciprocal_condition: 1e-12,
    },

    risk_free_rate: 0.0,
};
