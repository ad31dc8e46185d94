// ============================================================================
// Limit Order Book Library
// Single-instrument price/time priority matching engine
// ============================================================================

//! # Limit Order Book
//!
//! An in-memory, single-instrument limit order book that matches crossing
//! orders with price/time priority.
//!
//! ## Features
//!
//! - **Price/time priority**: better prices first, then arrival order
//! - **Good-Till-Cancel and Fill-or-Kill** orders; Fill-or-Kill orders are
//!   admitted only when resting liquidity covers their full quantity
//! - **O(1) cancellation** through an arena of resting orders and intrusive
//!   per-level FIFO queues
//! - **Event hooks** for accepted, rejected, matched, filled, cancelled and
//!   modified orders
//!
//! ## Example
//!
//! ```rust
//! use limit_order_book::prelude::*;
//! use std::sync::Arc;
//!
//! let mut engine = MatchingEngine::new("BTC-USD", Arc::new(NoOpEventHandler));
//!
//! engine
//!     .submit_order(Order::good_till_cancel(OrderId::new(1), Side::Buy, 100, 10))
//!     .unwrap();
//! let trades = engine
//!     .submit_order(Order::good_till_cancel(OrderId::new(2), Side::Sell, 100, 4))
//!     .unwrap();
//!
//! assert_eq!(trades.len(), 1);
//! assert_eq!(trades[0].quantity(), 4);
//! assert_eq!(engine.size(), 1);
//!
//! let levels = engine.levels();
//! assert_eq!(levels.bids[0].quantity, 6);
//! ```

pub mod domain;
pub mod engine;
pub mod interfaces;

// Re-exports for convenience
pub mod prelude {
    pub use crate::domain::{
        ConfigError, LevelInfo, Order, OrderBook, OrderBookConfig, OrderBookError,
        OrderBookLevelInfos, OrderBookResult, OrderBookSnapshot, OrderId, OrderModify, OrderType,
        Price, Quantity, Side, Trade, TradeInfo,
    };
    pub use crate::engine::{
        create_from_config, MatchingEngine, MatchingEngineBuilder, PriceTimePriority,
    };
    pub use crate::interfaces::{
        EventHandler, LoggingEventHandler, NoOpEventHandler, OrderEvent, RecordingEventHandler,
        RejectReason,
    };
}
