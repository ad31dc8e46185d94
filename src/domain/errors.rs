// ============================================================================
// Order Book Errors
// Error types for order book and configuration operations
// ============================================================================

use thiserror::Error;

use super::order::{OrderId, Price, Quantity};

/// Errors raised by the order book.
///
/// Only [`OrderBookError::InvalidFill`] and [`OrderBookError::Inconsistent`]
/// are fatal: they mean the matching loop computed something it should not
/// have and the current operation was aborted. The remaining variants are
/// business outcomes that the engine turns into no-ops.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderBookError {
    #[error("order {order_id} cannot be filled for {requested}, only {remaining} remaining")]
    InvalidFill {
        order_id: OrderId,
        requested: Quantity,
        remaining: Quantity,
    },

    #[error("order book is inconsistent: {0}")]
    Inconsistent(&'static str),

    #[error("order {0} is not resting in the book")]
    UnknownOrder(OrderId),

    #[error("order {0} is already resting in the book")]
    DuplicateOrder(OrderId),

    #[error("resting quantity at price {price} would exceed {max}", max = Quantity::MAX)]
    QuantityOverflow { price: Price },
}

impl OrderBookError {
    /// True for protocol violations that abort an operation.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            OrderBookError::InvalidFill { .. } | OrderBookError::Inconsistent(_)
        )
    }
}

/// Result type alias for order book operations
pub type OrderBookResult<T> = Result<T, OrderBookError>;

/// Configuration validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("instrument cannot be empty")]
    EmptyInstrument,

    #[error("tick size must be positive")]
    NonPositiveTickSize,

    #[error("lot size must be positive")]
    ZeroLotSize,

    #[error("max depth must be positive")]
    ZeroMaxDepth,

    #[cfg(feature = "serde")]
    #[error("invalid configuration document: {0}")]
    Parse(String),
}
