// ============================================================================
// Matching Engine Factory
// Creates matching engines with proper configuration
// ============================================================================

use crate::domain::{ConfigError, OrderBookConfig, Quantity};
use crate::engine::MatchingEngine;
use crate::interfaces::EventHandler;
use rust_decimal::Decimal;
use std::sync::Arc;

/// Creates a matching engine from configuration
///
/// # Example
/// ```
/// use limit_order_book::prelude::*;
/// use std::sync::Arc;
///
/// let config = OrderBookConfig::new("AAPL");
/// let engine = create_from_config(config, Arc::new(NoOpEventHandler)).unwrap();
/// assert_eq!(engine.size(), 0);
/// ```
pub fn create_from_config(
    config: OrderBookConfig,
    event_handler: Arc<dyn EventHandler>,
) -> Result<MatchingEngine, ConfigError> {
    config.validate()?;

    tracing::debug!(instrument = %config.instrument, "creating matching engine");
    Ok(MatchingEngine::with_config(config, event_handler))
}

/// Builder for creating matching engines with fluent API
///
/// # Example
/// ```
/// use limit_order_book::prelude::*;
/// use rust_decimal::Decimal;
/// use std::sync::Arc;
///
/// let engine = MatchingEngineBuilder::new("BTC-USD")
///     .with_tick_size(Decimal::new(1, 2))
///     .with_lot_size(1)
///     .build(Arc::new(NoOpEventHandler))
///     .unwrap();
/// assert_eq!(engine.get_instrument(), "BTC-USD");
/// ```
pub struct MatchingEngineBuilder {
    config: OrderBookConfig,
}

impl MatchingEngineBuilder {
    /// Create a new builder for the specified instrument
    pub fn new(instrument: impl Into<String>) -> Self {
        Self {
            config: OrderBookConfig::new(instrument),
        }
    }

    /// Start from an existing configuration
    pub fn from_config(config: OrderBookConfig) -> Self {
        Self { config }
    }

    pub fn with_tick_size(mut self, tick: Decimal) -> Self {
        self.config = self.config.with_tick_size(tick);
        self
    }

    pub fn with_lot_size(mut self, lot: Quantity) -> Self {
        self.config = self.config.with_lot_size(lot);
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.config = self.config.with_max_depth(depth);
        self
    }

    pub fn with_expected_orders(mut self, expected_orders: usize) -> Self {
        self.config = self.config.with_expected_orders(expected_orders);
        self
    }

    /// Get the current configuration (for inspection)
    pub fn config(&self) -> &OrderBookConfig {
        &self.config
    }

    /// Validate the configuration and build the engine
    pub fn build(self, event_handler: Arc<dyn EventHandler>) -> Result<MatchingEngine, ConfigError> {
        create_from_config(self.config, event_handler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interfaces::NoOpEventHandler;

    #[test]
    fn test_create_from_config() {
        let config = OrderBookConfig::new("AAPL").with_max_depth(20);
        let engine = create_from_config(config, Arc::new(NoOpEventHandler)).unwrap();

        assert_eq!(engine.get_instrument(), "AAPL");
        assert_eq!(engine.config().snapshot_depth(), 20);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = create_from_config(OrderBookConfig::new(""), Arc::new(NoOpEventHandler));
        assert!(matches!(result, Err(ConfigError::EmptyInstrument)));

        let result = MatchingEngineBuilder::new("ES")
            .with_lot_size(0)
            .build(Arc::new(NoOpEventHandler));
        assert!(matches!(result, Err(ConfigError::ZeroLotSize)));
    }

    #[test]
    fn test_builder() {
        let builder = MatchingEngineBuilder::new("ETH-USD")
            .with_tick_size(Decimal::new(5, 2))
            .with_lot_size(10)
            .with_expected_orders(64);

        assert_eq!(builder.config().lot_size, Some(10));

        let engine = builder.build(Arc::new(NoOpEventHandler)).unwrap();
        assert_eq!(engine.config().tick_size, Some(Decimal::new(5, 2)));
    }
}
