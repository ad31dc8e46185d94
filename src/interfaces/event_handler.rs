// ============================================================================
// Event Handler Interface
// Defines the contract for handling order and trade events
// ============================================================================

use crate::domain::{OrderId, Price, Quantity, Side, Trade};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Why a submission was turned away without touching the book
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RejectReason {
    /// An order with this id is already resting
    DuplicateOrderId,
    /// Not enough opposing liquidity to fill the whole order at once
    FillOrKillUnsatisfiable,
    ZeroQuantity,
    /// Quantity is not a multiple of the configured lot size
    InvalidLotSize { lot_size: Quantity },
    /// Resting quantity at the order's price level would overflow
    QuantityOverflow,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::DuplicateOrderId => write!(f, "duplicate order id"),
            RejectReason::FillOrKillUnsatisfiable => {
                write!(f, "fill-or-kill order cannot be filled in full")
            },
            RejectReason::ZeroQuantity => write!(f, "quantity must be positive"),
            RejectReason::InvalidLotSize { lot_size } => {
                write!(f, "quantity must be a multiple of the lot size {}", lot_size)
            },
            RejectReason::QuantityOverflow => {
                write!(f, "resting quantity at this price would overflow")
            },
        }
    }
}

/// Events emitted by the matching engine
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OrderEvent {
    /// Order passed validation and admission checks
    OrderAccepted {
        order_id: OrderId,
        timestamp: DateTime<Utc>,
    },

    /// Order rejected with reason
    OrderRejected {
        order_id: OrderId,
        reason: RejectReason,
        timestamp: DateTime<Utc>,
    },

    /// Order added to book
    OrderAddedToBook {
        order_id: OrderId,
        side: Side,
        price: Price,
        quantity: Quantity,
        timestamp: DateTime<Utc>,
    },

    /// Order matched, trade generated
    OrderMatched {
        trade: Trade,
        timestamp: DateTime<Utc>,
    },

    /// Order fully filled and removed from the book
    OrderFilled {
        order_id: OrderId,
        timestamp: DateTime<Utc>,
    },

    /// Order removed from the book with quantity left
    OrderCancelled {
        order_id: OrderId,
        remaining_quantity: Quantity,
        timestamp: DateTime<Utc>,
    },

    /// Resting order replaced; a fresh submission follows
    OrderModified {
        order_id: OrderId,
        side: Side,
        price: Price,
        quantity: Quantity,
        timestamp: DateTime<Utc>,
    },
}

impl OrderEvent {
    pub fn order_id(&self) -> Option<OrderId> {
        match self {
            OrderEvent::OrderAccepted { order_id, .. }
            | OrderEvent::OrderRejected { order_id, .. }
            | OrderEvent::OrderAddedToBook { order_id, .. }
            | OrderEvent::OrderFilled { order_id, .. }
            | OrderEvent::OrderCancelled { order_id, .. }
            | OrderEvent::OrderModified { order_id, .. } => Some(*order_id),
            OrderEvent::OrderMatched { .. } => None,
        }
    }
}

/// Event handler trait for processing matching engine events
/// Implementations can handle logging, metrics, notifications, etc.
pub trait EventHandler: Send + Sync {
    /// Handle an order event
    fn on_event(&self, event: OrderEvent);

    /// Batch event handler (optional optimization)
    fn on_events(&self, events: Vec<OrderEvent>) {
        for event in events {
            self.on_event(event);
        }
    }
}

/// No-op event handler for testing
pub struct NoOpEventHandler;

impl EventHandler for NoOpEventHandler {
    fn on_event(&self, _event: OrderEvent) {
        // Do nothing
    }
}

/// Logging event handler
pub struct LoggingEventHandler;

impl EventHandler for LoggingEventHandler {
    fn on_event(&self, event: OrderEvent) {
        match &event {
            OrderEvent::OrderMatched { trade, .. } => tracing::debug!(
                bid = %trade.bid.order_id,
                ask = %trade.ask.order_id,
                quantity = trade.quantity(),
                "trade"
            ),
            OrderEvent::OrderRejected {
                order_id, reason, ..
            } => tracing::debug!(%order_id, %reason, "order rejected"),
            _ => tracing::debug!("Matching engine event: {:?}", event),
        }
    }
}

/// Keeps every event in memory, in arrival order
#[derive(Default)]
pub struct RecordingEventHandler {
    events: Mutex<Vec<OrderEvent>>,
}

impl RecordingEventHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain the recorded events
    pub fn take(&self) -> Vec<OrderEvent> {
        std::mem::take(&mut *self.events.lock())
    }
}

impl EventHandler for RecordingEventHandler {
    fn on_event(&self, event: OrderEvent) {
        self.events.lock().push(event);
    }
}
