// ============================================================================
// Order Book Configuration
// ============================================================================

use rust_decimal::Decimal;

use super::errors::ConfigError;
use super::order::Quantity;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default number of levels per side in a snapshot
pub const DEFAULT_SNAPSHOT_DEPTH: usize = 10;

/// Configuration for creating an order book
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrderBookConfig {
    /// The trading instrument (e.g., "BTC-USD", "AAPL")
    pub instrument: String,

    /// Optional: Price tick size (value of one price tick).
    /// Only used to express snapshot mid prices in instrument units.
    #[cfg_attr(feature = "serde", serde(default))]
    pub tick_size: Option<Decimal>,

    /// Optional: Lot size (order quantities must be a multiple of it)
    #[cfg_attr(feature = "serde", serde(default))]
    pub lot_size: Option<Quantity>,

    /// Optional: Levels per side returned by snapshots when no depth is given
    #[cfg_attr(feature = "serde", serde(default))]
    pub max_depth: Option<usize>,

    /// Initial capacity of the order arena
    #[cfg_attr(feature = "serde", serde(default))]
    pub expected_orders: usize,
}

impl OrderBookConfig {
    /// Create a new configuration with required parameters
    pub fn new(instrument: impl Into<String>) -> Self {
        Self {
            instrument: instrument.into(),
            tick_size: None,
            lot_size: None,
            max_depth: None,
            expected_orders: 0,
        }
    }

    /// Builder method: Set price tick size
    pub fn with_tick_size(mut self, tick: Decimal) -> Self {
        self.tick_size = Some(tick);
        self
    }

    /// Builder method: Set lot size
    pub fn with_lot_size(mut self, lot: Quantity) -> Self {
        self.lot_size = Some(lot);
        self
    }

    /// Builder method: Set default snapshot depth
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Builder method: Pre-size the order arena
    pub fn with_expected_orders(mut self, expected_orders: usize) -> Self {
        self.expected_orders = expected_orders;
        self
    }

    pub fn effective_tick_size(&self) -> Decimal {
        self.tick_size.unwrap_or(Decimal::ONE)
    }

    pub fn snapshot_depth(&self) -> usize {
        self.max_depth.unwrap_or(DEFAULT_SNAPSHOT_DEPTH)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.instrument.trim().is_empty() {
            return Err(ConfigError::EmptyInstrument);
        }

        if let Some(tick) = self.tick_size {
            if tick <= Decimal::ZERO {
                return Err(ConfigError::NonPositiveTickSize);
            }
        }

        if self.lot_size == Some(0) {
            return Err(ConfigError::ZeroLotSize);
        }

        if self.max_depth == Some(0) {
            return Err(ConfigError::ZeroMaxDepth);
        }

        Ok(())
    }

    /// Parse and validate a JSON configuration document
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_creation() {
        let config = OrderBookConfig::new("BTC-USD");

        assert_eq!(config.instrument, "BTC-USD");
        assert_eq!(config.effective_tick_size(), Decimal::ONE);
        assert_eq!(config.snapshot_depth(), DEFAULT_SNAPSHOT_DEPTH);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = OrderBookConfig::new("AAPL")
            .with_tick_size(Decimal::new(1, 2))
            .with_lot_size(100)
            .with_max_depth(5)
            .with_expected_orders(1024);

        assert_eq!(config.tick_size, Some(Decimal::new(1, 2)));
        assert_eq!(config.lot_size, Some(100));
        assert_eq!(config.snapshot_depth(), 5);
        assert_eq!(config.expected_orders, 1024);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        assert_eq!(
            OrderBookConfig::new("  ").validate(),
            Err(ConfigError::EmptyInstrument)
        );
        assert_eq!(
            OrderBookConfig::new("AAPL")
                .with_tick_size(Decimal::ZERO)
                .validate(),
            Err(ConfigError::NonPositiveTickSize)
        );
        assert_eq!(
            OrderBookConfig::new("AAPL").with_lot_size(0).validate(),
            Err(ConfigError::ZeroLotSize)
        );
        assert_eq!(
            OrderBookConfig::new("AAPL").with_max_depth(0).validate(),
            Err(ConfigError::ZeroMaxDepth)
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_from_json() {
        let config =
            OrderBookConfig::from_json(r#"{"instrument":"ES-202503","lot_size":5}"#).unwrap();
        assert_eq!(config.instrument, "ES-202503");
        assert_eq!(config.lot_size, Some(5));
        assert_eq!(config.tick_size, None);

        assert!(matches!(
            OrderBookConfig::from_json(r#"{"instrument":""}"#),
            Err(ConfigError::EmptyInstrument)
        ));
        assert!(matches!(
            OrderBookConfig::from_json("not json"),
            Err(ConfigError::Parse(_))
        ));
    }
}
