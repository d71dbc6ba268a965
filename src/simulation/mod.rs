// Trade simulation: cost model, position state machine, metrics
pub mod costs;
pub mod metrics;
pub mod position;
pub mod simulator;
pub mod trade;

// Re-export commonly used types
pub use costs::{CostModel, Side};
pub use metrics::PerformanceReport;
pub use position::{OpenPosition, PositionState};
pub use simulator::{EquityCurve, SimulationParams, SimulationResult, TradeSimulator};
pub use trade::{Trade, TradeDirection};
