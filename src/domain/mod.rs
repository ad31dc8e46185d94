// ============================================================================
// Domain Models Module
// Contains all core domain entities and value objects
// ============================================================================

pub mod config;
pub mod errors;
pub mod order;
pub mod order_book;
pub mod trade;

pub use config::{OrderBookConfig, DEFAULT_SNAPSHOT_DEPTH};
pub use errors::{ConfigError, OrderBookError, OrderBookResult};
pub use order::{Order, OrderId, OrderModify, OrderType, Price, Quantity, Side};
pub use order_book::{
    LevelInfo, OrderBook, OrderBookLevel, OrderBookLevelInfos, OrderBookSide, OrderBookSnapshot,
};
pub use trade::{Trade, TradeInfo};
