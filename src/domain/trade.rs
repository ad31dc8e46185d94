// ============================================================================
// Trade Domain Model
// ============================================================================

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::order::{OrderId, Price, Quantity};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One side of an execution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TradeInfo {
    pub order_id: OrderId,
    /// The leg's own limit price
    pub price: Price,
    pub quantity: Quantity,
}

impl TradeInfo {
    /// Notional value of the leg in ticks × lots
    pub fn notional_value(&self) -> i128 {
        i128::from(self.price) * i128::from(self.quantity)
    }
}

/// Represents a matched trade between a bid and an ask
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Trade {
    /// Unique trade identifier
    pub id: Uuid,

    /// Buy-side leg
    pub bid: TradeInfo,

    /// Sell-side leg
    pub ask: TradeInfo,

    /// Trade timestamp
    pub timestamp: DateTime<Utc>,
}

impl Trade {
    pub fn new(bid: TradeInfo, ask: TradeInfo) -> Self {
        Self {
            id: Uuid::new_v4(),
            bid,
            ask,
            timestamp: Utc::now(),
        }
    }

    /// Executed quantity (identical on both legs)
    pub fn quantity(&self) -> Quantity {
        self.bid.quantity
    }
}
