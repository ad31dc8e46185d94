// ============================================================================
// Price/Time Priority Matching Algorithm (FIFO)
// ============================================================================

use crate::domain::{Order, OrderBook, OrderBookError, OrderBookResult, Side, Trade, TradeInfo};

/// A trade plus which of its two orders it completed
#[derive(Debug, Clone)]
pub struct Execution {
    pub trade: Trade,
    pub bid_filled: bool,
    pub ask_filled: bool,
}

/// Price/Time Priority (FIFO) matching algorithm
///
/// Better prices match first; orders at the same price level are matched in
/// arrival order. Each leg of a trade records its own order's limit price.
///
/// # Example
/// ```text
/// Book:  Sell 100 @ 3 (Order A, t=1)
///        Sell 100 @ 5 (Order B, t=2)
///
/// Incoming: Buy 4 @ 100
/// Result: Match 3 with A, then 1 with B
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct PriceTimePriority;

impl PriceTimePriority {
    pub fn new() -> Self {
        Self
    }

    /// Whether the opposite side holds enough quantity at acceptable prices
    /// to fill `order` in full right now
    pub fn can_fill_completely(&self, book: &OrderBook, order: &Order) -> bool {
        book.side(order.side.opposite())
            .can_fill(order.price, order.get_remaining_quantity())
    }

    /// Match the oldest best bid against the oldest best ask until the book
    /// no longer crosses. Filled orders and emptied levels are removed as
    /// they occur.
    ///
    /// # Errors
    /// Only fatal errors: an over-fill or a broken book structure.
    pub fn match_book(&self, book: &mut OrderBook) -> OrderBookResult<Vec<Execution>> {
        let mut executions = Vec::new();

        while book.is_crossed() {
            let (bid_key, ask_key) = match (book.front(Side::Buy), book.front(Side::Sell)) {
                (Some(bid), Some(ask)) => (bid, ask),
                _ => return Err(OrderBookError::Inconsistent("best level holds no orders")),
            };

            let (bid_leg, ask_leg) = {
                let bid = book.order_at(bid_key)?;
                let ask = book.order_at(ask_key)?;
                let quantity = bid
                    .get_remaining_quantity()
                    .min(ask.get_remaining_quantity());

                (
                    TradeInfo {
                        order_id: bid.id,
                        price: bid.price,
                        quantity,
                    },
                    TradeInfo {
                        order_id: ask.id,
                        price: ask.price,
                        quantity,
                    },
                )
            };

            let bid_filled = book.fill(bid_key, bid_leg.quantity)?;
            let ask_filled = book.fill(ask_key, ask_leg.quantity)?;

            if bid_filled {
                book.remove_key(bid_key)?;
            }
            if ask_filled {
                book.remove_key(ask_key)?;
            }

            tracing::trace!(
                bid = %bid_leg.order_id,
                ask = %ask_leg.order_id,
                quantity = bid_leg.quantity,
                "matched"
            );

            executions.push(Execution {
                trade: Trade::new(bid_leg, ask_leg),
                bid_filled,
                ask_filled,
            });
        }

        Ok(executions)
    }

    pub fn name(&self) -> &str {
        "PriceTime"
    }
}
