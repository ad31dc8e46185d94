// ============================================================================
// Matching Engine
// Core business logic for order matching
// ============================================================================

use crate::domain::{
    Order, OrderBook, OrderBookConfig, OrderBookError, OrderBookLevelInfos, OrderBookResult,
    OrderBookSnapshot, OrderId, OrderModify, OrderType, Price, Side, Trade,
};
use crate::engine::price_time::PriceTimePriority;
use crate::interfaces::{EventHandler, OrderEvent, RejectReason};
use chrono::Utc;
use std::sync::Arc;

/// Single-instrument limit order book with price/time matching.
///
/// Every operation runs to completion on the caller's thread; there is no
/// internal locking. Callers with several producers must funnel them through
/// one owner of the engine.
pub struct MatchingEngine {
    config: OrderBookConfig,

    /// Resting orders, both sides
    book: OrderBook,

    algorithm: PriceTimePriority,

    /// Event handler for processing events
    event_handler: Arc<dyn EventHandler>,
}

impl MatchingEngine {
    /// Create a new matching engine
    pub fn new(instrument: impl Into<String>, event_handler: Arc<dyn EventHandler>) -> Self {
        Self::with_config(OrderBookConfig::new(instrument), event_handler)
    }

    /// Create an engine from an already validated configuration
    pub fn with_config(config: OrderBookConfig, event_handler: Arc<dyn EventHandler>) -> Self {
        Self {
            book: OrderBook::with_capacity(config.expected_orders),
            config,
            algorithm: PriceTimePriority::new(),
            event_handler,
        }
    }

    /// Submit an order and match it against resting liquidity.
    ///
    /// Rejected submissions (duplicate id, unsatisfiable Fill-or-Kill, bad
    /// quantity) leave the book untouched and return no trades; the reason
    /// is reported through the event handler.
    ///
    /// # Errors
    /// Only fatal [`OrderBookError`]s, which mean the book is corrupt.
    pub fn submit_order(&mut self, order: Order) -> OrderBookResult<Vec<Trade>> {
        let mut events = Vec::new();
        let result = self.process_order(order, &mut events);
        self.event_handler.on_events(events);
        result
    }

    /// Cancel a resting order, handing it back. Unknown ids are a no-op.
    ///
    /// # Errors
    /// Only fatal [`OrderBookError`]s, which mean the book is corrupt.
    pub fn cancel_order(&mut self, order_id: OrderId) -> OrderBookResult<Option<Order>> {
        match self.book.remove(order_id) {
            Ok(order) => {
                self.event_handler.on_event(OrderEvent::OrderCancelled {
                    order_id,
                    remaining_quantity: order.get_remaining_quantity(),
                    timestamp: Utc::now(),
                });
                Ok(Some(order))
            },
            Err(OrderBookError::UnknownOrder(_)) => Ok(None),
            Err(err) => {
                tracing::error!(%order_id, error = %err, "cancel failed");
                Err(err)
            },
        }
    }

    /// Replace a resting order. The replacement keeps the id and the
    /// original order type but queues behind everything already resting at
    /// its new price. Unknown ids are a no-op.
    ///
    /// # Errors
    /// Only fatal [`OrderBookError`]s.
    pub fn modify_order(&mut self, modify: OrderModify) -> OrderBookResult<Vec<Trade>> {
        let order_type = match self.book.get(modify.order_id) {
            Some(order) => order.order_type,
            None => return Ok(Vec::new()),
        };

        let mut events = Vec::new();
        let result = self.replace_order(modify, order_type, &mut events);
        self.event_handler.on_events(events);
        result
    }

    /// Number of resting orders
    pub fn size(&self) -> usize {
        self.book.len()
    }

    /// Aggregate quantity per price level for both sides
    pub fn levels(&self) -> OrderBookLevelInfos {
        self.book.level_infos()
    }

    /// Get order book snapshot
    pub fn get_snapshot(&self, depth: usize) -> OrderBookSnapshot {
        OrderBookSnapshot::with_depth(
            self.config.instrument.clone(),
            self.book.bids().get_depth(depth),
            self.book.asks().get_depth(depth),
            self.config.effective_tick_size(),
        )
    }

    /// Snapshot at the configured depth
    pub fn snapshot(&self) -> OrderBookSnapshot {
        self.get_snapshot(self.config.snapshot_depth())
    }

    pub fn best_bid(&self) -> Option<Price> {
        self.book.best_bid()
    }

    pub fn best_ask(&self) -> Option<Price> {
        self.book.best_ask()
    }

    /// Get spread in ticks; `None` for a one-sided book or a spread wider
    /// than a `Price` can hold
    pub fn get_spread(&self) -> Option<Price> {
        match (self.book.best_bid(), self.book.best_ask()) {
            (Some(bid), Some(ask)) => ask.checked_sub(bid),
            _ => None,
        }
    }

    pub fn get_order(&self, order_id: OrderId) -> Option<&Order> {
        self.book.get(order_id)
    }

    pub fn contains(&self, order_id: OrderId) -> bool {
        self.book.contains(order_id)
    }

    /// Read-only view of the resting book
    pub fn book(&self) -> &OrderBook {
        &self.book
    }

    /// Get the instrument name
    pub fn get_instrument(&self) -> &str {
        &self.config.instrument
    }

    pub fn config(&self) -> &OrderBookConfig {
        &self.config
    }

    // ========================================================================
    // Private methods
    // ========================================================================

    fn process_order(
        &mut self,
        order: Order,
        events: &mut Vec<OrderEvent>,
    ) -> OrderBookResult<Vec<Trade>> {
        let order_id = order.id;

        if let Err(reason) = self.admit(&order) {
            tracing::debug!(%order_id, %reason, "submission rejected");
            events.push(OrderEvent::OrderRejected {
                order_id,
                reason,
                timestamp: Utc::now(),
            });
            return Ok(Vec::new());
        }

        events.push(OrderEvent::OrderAccepted {
            order_id,
            timestamp: Utc::now(),
        });

        let side = order.side;
        let price = order.price;
        let quantity = order.get_remaining_quantity();
        self.book.insert(order)?;
        events.push(OrderEvent::OrderAddedToBook {
            order_id,
            side,
            price,
            quantity,
            timestamp: Utc::now(),
        });

        let executions = self.algorithm.match_book(&mut self.book)?;

        let mut trades = Vec::with_capacity(executions.len());
        for execution in executions {
            let timestamp = Utc::now();
            let bid_id = execution.trade.bid.order_id;
            let ask_id = execution.trade.ask.order_id;

            events.push(OrderEvent::OrderMatched {
                trade: execution.trade.clone(),
                timestamp,
            });
            if execution.bid_filled {
                events.push(OrderEvent::OrderFilled {
                    order_id: bid_id,
                    timestamp,
                });
            }
            if execution.ask_filled {
                events.push(OrderEvent::OrderFilled {
                    order_id: ask_id,
                    timestamp,
                });
            }
            trades.push(execution.trade);
        }

        self.purge_fill_or_kill(order_id, events)?;

        Ok(trades)
    }

    fn replace_order(
        &mut self,
        modify: OrderModify,
        order_type: OrderType,
        events: &mut Vec<OrderEvent>,
    ) -> OrderBookResult<Vec<Trade>> {
        self.book.remove(modify.order_id)?;
        events.push(OrderEvent::OrderModified {
            order_id: modify.order_id,
            side: modify.side,
            price: modify.price,
            quantity: modify.quantity,
            timestamp: Utc::now(),
        });

        self.process_order(modify.to_order(order_type), events)
    }

    fn admit(&self, order: &Order) -> Result<(), RejectReason> {
        let quantity = order.get_remaining_quantity();

        if quantity == 0 {
            return Err(RejectReason::ZeroQuantity);
        }

        if let Some(lot_size) = self.config.lot_size {
            if quantity % lot_size != 0 {
                return Err(RejectReason::InvalidLotSize { lot_size });
            }
        }

        if self.book.contains(order.id) {
            return Err(RejectReason::DuplicateOrderId);
        }

        if !self.book.side(order.side).can_rest(order.price, quantity) {
            return Err(RejectReason::QuantityOverflow);
        }

        if order.is_fill_or_kill() && !self.algorithm.can_fill_completely(&self.book, order) {
            return Err(RejectReason::FillOrKillUnsatisfiable);
        }

        Ok(())
    }

    /// No Fill-or-Kill order may survive a submission. The admission check
    /// makes this unreachable; reaching it means the loop under-filled.
    fn purge_fill_or_kill(
        &mut self,
        incoming: OrderId,
        events: &mut Vec<OrderEvent>,
    ) -> OrderBookResult<()> {
        let mut candidates = [Some(incoming), None, None];
        for (slot, side) in candidates[1..].iter_mut().zip([Side::Buy, Side::Sell]) {
            if let Some(key) = self.book.front(side) {
                *slot = Some(self.book.order_at(key)?.id);
            }
        }

        for order_id in candidates.into_iter().flatten() {
            let resting_fok = self
                .book
                .get(order_id)
                .is_some_and(Order::is_fill_or_kill);
            if !resting_fok {
                continue;
            }

            let order = self.book.remove(order_id)?;
            tracing::warn!(
                %order_id,
                remaining = order.get_remaining_quantity(),
                "fill-or-kill order left resting after matching; cancelled"
            );
            events.push(OrderEvent::OrderCancelled {
                order_id,
                remaining_quantity: order.get_remaining_quantity(),
                timestamp: Utc::now(),
            });
        }

        Ok(())
    }
}
