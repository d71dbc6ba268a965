// Domain types and value objects
pub mod candidate_pair;
pub mod price_series;

// Re-export commonly used types
pub use candidate_pair::CandidatePair;
pub use price_series::{PriceSeries, ensure_same_index};
