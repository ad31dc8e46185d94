// ============================================================================
// Order Book Domain Model
// ============================================================================

use rust_decimal::Decimal;
use slab::Slab;
use std::collections::btree_map::{BTreeMap, Entry};
use std::collections::HashMap;

use super::errors::{OrderBookError, OrderBookResult};
use super::order::{Order, OrderId, Price, Quantity, Side};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ============================================================================
// Order Arena
// ============================================================================

/// Arena slot for a resting order. Each price level threads its orders
/// through `prev`/`next` so any order can be unlinked in O(1).
#[derive(Debug)]
struct OrderNode {
    order: Order,
    prev: Option<usize>,
    next: Option<usize>,
}

fn node_mut(orders: &mut Slab<OrderNode>, key: usize) -> OrderBookResult<&mut OrderNode> {
    orders
        .get_mut(key)
        .ok_or(OrderBookError::Inconsistent("dangling order handle"))
}

// ============================================================================
// Order Book Level
// ============================================================================

/// All resting orders at one price on one side, oldest first
#[derive(Debug, Clone)]
pub struct OrderBookLevel {
    pub price: Price,
    head: Option<usize>,
    tail: Option<usize>,
    order_count: usize,
    total_quantity: Quantity,
}

impl OrderBookLevel {
    fn new(price: Price) -> Self {
        Self {
            price,
            head: None,
            tail: None,
            order_count: 0,
            total_quantity: 0,
        }
    }

    /// Aggregate remaining quantity at this price
    pub fn get_total_quantity(&self) -> Quantity {
        self.total_quantity
    }

    pub fn order_count(&self) -> usize {
        self.order_count
    }

    pub fn is_empty(&self) -> bool {
        self.order_count == 0
    }
}

// ============================================================================
// Order Book Side
// ============================================================================

/// One side of the book (bids or asks), price levels sorted by price
#[derive(Debug)]
pub struct OrderBookSide {
    levels: BTreeMap<Price, OrderBookLevel>,
    pub side: Side,
}

impl OrderBookSide {
    pub fn new(side: Side) -> Self {
        Self {
            levels: BTreeMap::new(),
            side,
        }
    }

    /// Get the best (top-of-book) price
    pub fn best_price(&self) -> Option<Price> {
        self.best_level().map(|level| level.price)
    }

    /// Get the best price level
    pub fn best_level(&self) -> Option<&OrderBookLevel> {
        match self.side {
            // Highest bid (last in sorted order)
            Side::Buy => self.levels.values().next_back(),
            // Lowest ask (first in sorted order)
            Side::Sell => self.levels.values().next(),
        }
    }

    pub fn level(&self, price: Price) -> Option<&OrderBookLevel> {
        self.levels.get(&price)
    }

    /// Whether `quantity` more can rest at `price` without the level total
    /// overflowing
    pub fn can_rest(&self, price: Price, quantity: Quantity) -> bool {
        self.levels
            .get(&price)
            .map_or(true, |level| level.total_quantity.checked_add(quantity).is_some())
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Price levels in matching priority order
    pub fn iter(&self) -> Box<dyn Iterator<Item = &OrderBookLevel> + '_> {
        match self.side {
            Side::Buy => Box::new(self.levels.values().rev()),
            Side::Sell => Box::new(self.levels.values()),
        }
    }

    /// Get depth at N levels
    pub fn get_depth(&self, num_levels: usize) -> Vec<LevelInfo> {
        self.iter()
            .take(num_levels)
            .map(|level| LevelInfo {
                price: level.price,
                quantity: level.total_quantity,
            })
            .collect()
    }

    /// Levels an opposing order limited at `limit` would trade against
    fn marketable_levels(&self, limit: Price) -> Box<dyn Iterator<Item = &OrderBookLevel> + '_> {
        match self.side {
            // A sell limited at `limit` takes bids priced at or above it
            Side::Buy => Box::new(self.levels.range(limit..).rev().map(|(_, level)| level)),
            // A buy limited at `limit` takes asks priced at or below it
            Side::Sell => Box::new(self.levels.range(..=limit).map(|(_, level)| level)),
        }
    }

    /// Total resting quantity an opposing order limited at `limit` could reach
    pub fn quantity_available(&self, limit: Price) -> Quantity {
        self.marketable_levels(limit)
            .fold(0, |acc: Quantity, level| acc.saturating_add(level.total_quantity))
    }

    /// Whether an opposing order limited at `limit` could be filled for
    /// `quantity` right now. Stops walking levels once enough is found.
    pub fn can_fill(&self, limit: Price, quantity: Quantity) -> bool {
        let mut available: Quantity = 0;
        for level in self.marketable_levels(limit) {
            available = available.saturating_add(level.total_quantity);
            if available >= quantity {
                return true;
            }
        }
        quantity == 0
    }
}

// ============================================================================
// Order Book
// ============================================================================

/// Resting liquidity for one instrument.
///
/// Orders live in a single arena; price levels and the id index hold arena
/// handles only. This type keeps the structural invariants (no empty levels,
/// index and queues agree) but does not match anything itself.
#[derive(Debug)]
pub struct OrderBook {
    bids: OrderBookSide,
    asks: OrderBookSide,
    orders: Slab<OrderNode>,
    index: HashMap<OrderId, usize>,
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderBook {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bids: OrderBookSide::new(Side::Buy),
            asks: OrderBookSide::new(Side::Sell),
            orders: Slab::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    /// Number of resting orders
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn contains(&self, order_id: OrderId) -> bool {
        self.index.contains_key(&order_id)
    }

    pub fn get(&self, order_id: OrderId) -> Option<&Order> {
        let key = *self.index.get(&order_id)?;
        self.orders.get(key).map(|node| &node.order)
    }

    pub fn bids(&self) -> &OrderBookSide {
        &self.bids
    }

    pub fn asks(&self) -> &OrderBookSide {
        &self.asks
    }

    pub fn side(&self, side: Side) -> &OrderBookSide {
        match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        }
    }

    pub fn best_bid(&self) -> Option<Price> {
        self.bids.best_price()
    }

    pub fn best_ask(&self) -> Option<Price> {
        self.asks.best_price()
    }

    /// True when the best bid meets or exceeds the best ask
    pub fn is_crossed(&self) -> bool {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => bid >= ask,
            _ => false,
        }
    }

    /// Resting orders at one price, oldest first
    pub fn orders_at(&self, side: Side, price: Price) -> Vec<&Order> {
        let mut orders = Vec::new();
        let mut cursor = self.side(side).level(price).and_then(|level| level.head);
        while let Some(key) = cursor {
            match self.orders.get(key) {
                Some(node) => {
                    orders.push(&node.order);
                    cursor = node.next;
                },
                None => break,
            }
        }
        orders
    }

    /// Aggregate quantity per level for both sides, in priority order
    pub fn level_infos(&self) -> OrderBookLevelInfos {
        OrderBookLevelInfos {
            bids: self.bids.get_depth(usize::MAX),
            asks: self.asks.get_depth(usize::MAX),
        }
    }

    /// Append an order to the back of its price level.
    ///
    /// # Errors
    /// [`OrderBookError::DuplicateOrder`] if the id is already resting,
    /// [`OrderBookError::QuantityOverflow`] if the level total would not fit
    /// in a [`Quantity`]. Neither changes the book.
    pub fn insert(&mut self, order: Order) -> OrderBookResult<()> {
        if self.index.contains_key(&order.id) {
            return Err(OrderBookError::DuplicateOrder(order.id));
        }
        if order.is_filled() {
            return Err(OrderBookError::Inconsistent("filled order cannot rest"));
        }

        let order_id = order.id;
        let price = order.price;
        let quantity = order.get_remaining_quantity();

        let levels = match order.side {
            Side::Buy => &mut self.bids.levels,
            Side::Sell => &mut self.asks.levels,
        };

        // Everything that can fail is checked before the book is touched
        let (prev_tail, total_quantity) = match levels.get(&price) {
            Some(level) => {
                if let Some(tail) = level.tail {
                    if !self.orders.contains(tail) {
                        return Err(OrderBookError::Inconsistent("dangling order handle"));
                    }
                }
                let total = level
                    .total_quantity
                    .checked_add(quantity)
                    .ok_or(OrderBookError::QuantityOverflow { price })?;
                (level.tail, total)
            },
            None => (None, quantity),
        };

        let key = self.orders.insert(OrderNode {
            order,
            prev: prev_tail,
            next: None,
        });

        let level = levels
            .entry(price)
            .or_insert_with(|| OrderBookLevel::new(price));
        level.tail = Some(key);
        if level.head.is_none() {
            level.head = Some(key);
        }
        level.order_count += 1;
        level.total_quantity = total_quantity;

        if let Some(tail) = prev_tail {
            node_mut(&mut self.orders, tail)?.next = Some(key);
        }
        self.index.insert(order_id, key);

        Ok(())
    }

    /// Remove a resting order and hand it back.
    ///
    /// # Errors
    /// [`OrderBookError::UnknownOrder`] if the id is not resting.
    pub fn remove(&mut self, order_id: OrderId) -> OrderBookResult<Order> {
        let key = self
            .index
            .get(&order_id)
            .copied()
            .ok_or(OrderBookError::UnknownOrder(order_id))?;
        self.remove_key(key)
    }

    // ========================================================================
    // Handle-level access for the matching loop
    // ========================================================================

    /// Arena handle of the oldest order at the best level of `side`
    pub(crate) fn front(&self, side: Side) -> Option<usize> {
        self.side(side).best_level().and_then(|level| level.head)
    }

    pub(crate) fn order_at(&self, key: usize) -> OrderBookResult<&Order> {
        self.orders
            .get(key)
            .map(|node| &node.order)
            .ok_or(OrderBookError::Inconsistent("dangling order handle"))
    }

    /// Fill a resting order in place. Returns whether it is now filled.
    pub(crate) fn fill(&mut self, key: usize, quantity: Quantity) -> OrderBookResult<bool> {
        let node = node_mut(&mut self.orders, key)?;
        node.order.fill(quantity)?;

        let side = node.order.side;
        let price = node.order.price;
        let filled = node.order.is_filled();

        let levels = match side {
            Side::Buy => &mut self.bids.levels,
            Side::Sell => &mut self.asks.levels,
        };
        let level = levels
            .get_mut(&price)
            .ok_or(OrderBookError::Inconsistent("resting order has no price level"))?;
        level.total_quantity -= quantity;

        Ok(filled)
    }

    /// Drop a price level while leaving its orders in the arena
    #[cfg(test)]
    pub(crate) fn forget_level(&mut self, side: Side, price: Price) {
        match side {
            Side::Buy => self.bids.levels.remove(&price),
            Side::Sell => self.asks.levels.remove(&price),
        };
    }

    /// Unlink an order from its level, dropping the level if it empties
    pub(crate) fn remove_key(&mut self, key: usize) -> OrderBookResult<Order> {
        if !self.orders.contains(key) {
            return Err(OrderBookError::Inconsistent("dangling order handle"));
        }
        let node = self.orders.remove(key);

        if let Some(prev) = node.prev {
            node_mut(&mut self.orders, prev)?.next = node.next;
        }
        if let Some(next) = node.next {
            node_mut(&mut self.orders, next)?.prev = node.prev;
        }

        // Always the order's own side
        let levels = match node.order.side {
            Side::Buy => &mut self.bids.levels,
            Side::Sell => &mut self.asks.levels,
        };
        match levels.entry(node.order.price) {
            Entry::Occupied(mut entry) => {
                let level = entry.get_mut();
                if level.head == Some(key) {
                    level.head = node.next;
                }
                if level.tail == Some(key) {
                    level.tail = node.prev;
                }
                level.order_count -= 1;
                level.total_quantity -= node.order.get_remaining_quantity();

                if level.order_count == 0 {
                    entry.remove();
                }
            },
            Entry::Vacant(_) => {
                return Err(OrderBookError::Inconsistent(
                    "resting order has no price level",
                ));
            },
        }

        self.index.remove(&node.order.id);
        Ok(node.order)
    }
}

// ============================================================================
// Level Infos
// ============================================================================

/// Aggregate view of one price level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LevelInfo {
    pub price: Price,
    pub quantity: Quantity,
}

/// Every level of both sides; bids descending, asks ascending
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrderBookLevelInfos {
    pub bids: Vec<LevelInfo>,
    pub asks: Vec<LevelInfo>,
}

impl OrderBookLevelInfos {
    pub fn get_bids(&self) -> &[LevelInfo] {
        &self.bids
    }

    pub fn get_asks(&self) -> &[LevelInfo] {
        &self.asks
    }
}

// ============================================================================
// Order Book Snapshot
// ============================================================================

/// Immutable snapshot of the top of the book
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrderBookSnapshot {
    pub instrument: String,
    pub bids: Vec<LevelInfo>,
    pub asks: Vec<LevelInfo>,
    /// Current spread in ticks (ask - bid), `None` if it does not fit in a `Price`
    pub spread: Option<Price>,
    /// Mid price scaled by the tick size
    pub mid_price: Option<Decimal>,
}

impl OrderBookSnapshot {
    pub fn new(instrument: String) -> Self {
        Self {
            instrument,
            bids: Vec::new(),
            asks: Vec::new(),
            spread: None,
            mid_price: None,
        }
    }

    pub fn with_depth(
        instrument: String,
        bids: Vec<LevelInfo>,
        asks: Vec<LevelInfo>,
        tick_size: Decimal,
    ) -> Self {
        let (spread, mid_price) = match (bids.first(), asks.first()) {
            (Some(bid), Some(ask)) => {
                let mid = (Decimal::from(bid.price) + Decimal::from(ask.price)) / Decimal::TWO;
                (ask.price.checked_sub(bid.price), mid.checked_mul(tick_size))
            },
            _ => (None, None),
        };

        Self {
            instrument,
            bids,
            asks,
            spread,
            mid_price,
        }
    }

    pub fn best_bid(&self) -> Option<Price> {
        self.bids.first().map(|level| level.price)
    }

    pub fn best_ask(&self) -> Option<Price> {
        self.asks.first().map(|level| level.price)
    }

    /// Summed in `u128`; each level alone may already hold up to `Quantity::MAX`
    pub fn total_bid_quantity(&self) -> u128 {
        self.bids.iter().map(|level| u128::from(level.quantity)).sum()
    }

    pub fn total_ask_quantity(&self) -> u128 {
        self.asks.iter().map(|level| u128::from(level.quantity)).sum()
    }
}
