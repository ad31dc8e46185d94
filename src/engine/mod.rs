// ============================================================================
// Engine Module
// Contains the core matching engine business logic
// ============================================================================

mod matching_engine;
mod price_time;

pub mod factory;

#[cfg(test)]
mod properties;

pub use factory::{create_from_config, MatchingEngineBuilder};
pub use matching_engine::MatchingEngine;
pub use price_time::{Execution, PriceTimePriority};
