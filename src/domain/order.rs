// ============================================================================
// Order Domain Model
// ============================================================================

use chrono::{DateTime, Utc};
use std::fmt;

use super::errors::{OrderBookError, OrderBookResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Limit price in ticks (smallest price increment)
pub type Price = i64;

/// Order quantity in lots
pub type Quantity = u64;

// ============================================================================
// Value Objects
// ============================================================================

/// Caller-assigned order identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrderId(u64);

impl OrderId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn value(self) -> u64 {
        self.0
    }
}

impl From<u64> for OrderId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OrderType {
    /// Good Till Cancel - rests until filled or cancelled
    GoodTillCancel,
    /// Fill Or Kill - fill entire order immediately or discard it
    FillOrKill,
}

// ============================================================================
// Order Entity
// ============================================================================

/// A limit order. Everything except the remaining quantity is fixed at
/// creation; the remaining quantity only ever goes down through [`Order::fill`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Order {
    pub id: OrderId,
    pub side: Side,
    pub order_type: OrderType,
    pub price: Price,
    pub quantity: Quantity,
    pub timestamp: DateTime<Utc>,

    remaining_quantity: Quantity,
}

impl Order {
    pub fn new(
        order_type: OrderType,
        id: OrderId,
        side: Side,
        price: Price,
        quantity: Quantity,
    ) -> Self {
        Self {
            id,
            side,
            order_type,
            price,
            quantity,
            timestamp: Utc::now(),
            remaining_quantity: quantity,
        }
    }

    pub fn good_till_cancel(id: OrderId, side: Side, price: Price, quantity: Quantity) -> Self {
        Self::new(OrderType::GoodTillCancel, id, side, price, quantity)
    }

    pub fn fill_or_kill(id: OrderId, side: Side, price: Price, quantity: Quantity) -> Self {
        Self::new(OrderType::FillOrKill, id, side, price, quantity)
    }

    // ========================================================================
    // Getters
    // ========================================================================

    pub fn get_remaining_quantity(&self) -> Quantity {
        self.remaining_quantity
    }

    pub fn get_filled_quantity(&self) -> Quantity {
        self.quantity - self.remaining_quantity
    }

    pub fn is_filled(&self) -> bool {
        self.remaining_quantity == 0
    }

    pub fn is_fill_or_kill(&self) -> bool {
        matches!(self.order_type, OrderType::FillOrKill)
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Reduce the remaining quantity by `quantity`.
    ///
    /// # Errors
    /// Returns [`OrderBookError::InvalidFill`] if `quantity` exceeds the
    /// remaining quantity. The order is left untouched in that case.
    pub fn fill(&mut self, quantity: Quantity) -> OrderBookResult<()> {
        if quantity > self.remaining_quantity {
            return Err(OrderBookError::InvalidFill {
                order_id: self.id,
                requested: quantity,
                remaining: self.remaining_quantity,
            });
        }

        self.remaining_quantity -= quantity;
        Ok(())
    }
}

// ============================================================================
// Order Modification Request
// ============================================================================

/// Replacement parameters for a resting order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrderModify {
    pub order_id: OrderId,
    pub side: Side,
    pub price: Price,
    pub quantity: Quantity,
}

impl OrderModify {
    pub fn new(order_id: OrderId, side: Side, price: Price, quantity: Quantity) -> Self {
        Self {
            order_id,
            side,
            price,
            quantity,
        }
    }

    /// Build the fresh order that replaces the resting one
    pub fn to_order(&self, order_type: OrderType) -> Order {
        Order::new(order_type, self.order_id, self.side, self.price, self.quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_creation() {
        let order = Order::good_till_cancel(OrderId::new(1), Side::Buy, 100, 10);

        assert_eq!(order.get_remaining_quantity(), 10);
        assert_eq!(order.get_filled_quantity(), 0);
        assert!(!order.is_filled());
        assert!(!order.is_fill_or_kill());
    }

    #[test]
    fn test_fill() {
        let mut order = Order::good_till_cancel(OrderId::new(1), Side::Buy, 100, 10);

        order.fill(3).unwrap();
        assert_eq!(order.get_filled_quantity(), 3);
        assert_eq!(order.get_remaining_quantity(), 7);

        order.fill(7).unwrap();
        assert!(order.is_filled());
    }

    #[test]
    fn test_overfill_protection() {
        let mut order = Order::good_till_cancel(OrderId::new(9), Side::Sell, 100, 5);

        let err = order.fill(10).unwrap_err();
        assert_eq!(
            err,
            OrderBookError::InvalidFill {
                order_id: OrderId::new(9),
                requested: 10,
                remaining: 5,
            }
        );
        assert_eq!(order.get_remaining_quantity(), 5);
    }

    #[test]
    fn test_zero_fill_is_allowed() {
        let mut order = Order::fill_or_kill(OrderId::new(2), Side::Sell, 100, 5);
        order.fill(0).unwrap();
        assert_eq!(order.get_remaining_quantity(), 5);
    }

    #[test]
    fn test_modify_keeps_identity() {
        let modify = OrderModify::new(OrderId::new(4), Side::Sell, 105, 3);
        let order = modify.to_order(OrderType::FillOrKill);

        assert_eq!(order.id, OrderId::new(4));
        assert_eq!(order.side, Side::Sell);
        assert_eq!(order.price, 105);
        assert_eq!(order.get_remaining_quantity(), 3);
        assert!(order.is_fill_or_kill());
    }

    #[test]
    fn test_side_opposite() {
        assert_eq!(Side::Buy.opposite(), Side::Sell);
        assert_eq!(Side::Sell.opposite(), Side::Buy);
    }
}
