// ============================================================================
// Property Tests
// Book invariants under random order flow
// ============================================================================

use crate::domain::{Order, OrderId, OrderModify, Price, Quantity, Side, Trade};
use crate::engine::MatchingEngine;
use crate::interfaces::NoOpEventHandler;
use proptest::prelude::*;
use quickcheck::quickcheck;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone)]
enum Op {
    Submit {
        id: u64,
        side: Side,
        fill_or_kill: bool,
        price: Price,
        quantity: Quantity,
    },
    Cancel {
        id: u64,
    },
    Modify {
        id: u64,
        side: Side,
        price: Price,
        quantity: Quantity,
    },
}

fn side_strategy() -> impl Strategy<Value = Side> {
    prop_oneof![Just(Side::Buy), Just(Side::Sell)]
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        6 => (0u64..24, side_strategy(), prop::bool::weighted(0.25), 95i64..106, 1u64..20).prop_map(
            |(id, side, fill_or_kill, price, quantity)| Op::Submit {
                id,
                side,
                fill_or_kill,
                price,
                quantity,
            }
        ),
        2 => (0u64..24).prop_map(|id| Op::Cancel { id }),
        2 => (0u64..24, side_strategy(), 95i64..106, 1u64..20).prop_map(
            |(id, side, price, quantity)| Op::Modify {
                id,
                side,
                price,
                quantity,
            }
        ),
    ]
}

fn resting_quantity(engine: &MatchingEngine) -> Quantity {
    let levels = engine.levels();
    levels
        .bids
        .iter()
        .chain(levels.asks.iter())
        .map(|level| level.quantity)
        .sum()
}

fn matched_quantity(trades: &[Trade]) -> Quantity {
    trades.iter().map(|trade| trade.quantity()).sum()
}

/// Structural invariants that must hold between any two calls
fn check_book(engine: &MatchingEngine, arrivals: &HashMap<OrderId, u64>) {
    let book = engine.book();

    if let (Some(bid), Some(ask)) = (engine.best_bid(), engine.best_ask()) {
        assert!(bid < ask, "crossed book: bid {} >= ask {}", bid, ask);
    }

    let levels = engine.levels();
    assert!(levels.bids.windows(2).all(|w| w[0].price > w[1].price));
    assert!(levels.asks.windows(2).all(|w| w[0].price < w[1].price));

    let mut resting = 0;
    for (side, infos) in [(Side::Buy, &levels.bids), (Side::Sell, &levels.asks)] {
        for info in infos.iter() {
            let orders = book.orders_at(side, info.price);
            assert!(!orders.is_empty(), "empty level at {}", info.price);

            let total: Quantity = orders.iter().map(|o| o.get_remaining_quantity()).sum();
            assert_eq!(total, info.quantity);

            for order in &orders {
                assert!(!order.is_filled());
                assert!(!order.is_fill_or_kill(), "fill-or-kill order {} resting", order.id);
                assert_eq!(order.side, side);
            }

            // Arrival order within the level
            let seqs: Vec<u64> = orders.iter().map(|o| arrivals[&o.id]).collect();
            assert!(seqs.windows(2).all(|w| w[0] < w[1]), "queue out of order: {:?}", seqs);

            resting += orders.len();
        }
    }
    assert_eq!(resting, engine.size());
}

fn check_trades(trades: &[Trade]) {
    for trade in trades {
        assert_eq!(trade.bid.quantity, trade.ask.quantity);
        assert!(trade.quantity() > 0);
        assert!(trade.bid.price >= trade.ask.price);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn random_order_flow_keeps_invariants(ops in prop::collection::vec(op_strategy(), 1..120)) {
        let mut engine = MatchingEngine::new("TEST", Arc::new(NoOpEventHandler));
        let mut arrivals: HashMap<OrderId, u64> = HashMap::new();
        let mut clock = 0u64;

        for op in ops {
            let before = resting_quantity(&engine);
            let levels_before = engine.levels();

            match op {
                Op::Submit { id, side, fill_or_kill, price, quantity } => {
                    let order_id = OrderId::new(id);
                    let duplicate = engine.contains(order_id);
                    let order = if fill_or_kill {
                        Order::fill_or_kill(order_id, side, price, quantity)
                    } else {
                        Order::good_till_cancel(order_id, side, price, quantity)
                    };
                    if !duplicate {
                        clock += 1;
                        arrivals.insert(order_id, clock);
                    }

                    let trades = engine.submit_order(order).unwrap();
                    check_trades(&trades);
                    let matched = matched_quantity(&trades);
                    let after = resting_quantity(&engine);

                    if duplicate {
                        prop_assert!(trades.is_empty());
                        prop_assert_eq!(engine.levels(), levels_before);
                    } else if fill_or_kill {
                        prop_assert!(matched == 0 || matched == quantity);
                        prop_assert!(!engine.contains(order_id));
                        if matched == 0 {
                            prop_assert_eq!(engine.levels(), levels_before);
                        } else {
                            prop_assert_eq!(after + matched, before);
                        }
                    } else {
                        prop_assert_eq!(after + 2 * matched, before + quantity);
                    }
                },
                Op::Cancel { id } => {
                    let order_id = OrderId::new(id);
                    let known = engine.contains(order_id);
                    let cancelled = engine.cancel_order(order_id).unwrap();

                    prop_assert_eq!(cancelled.is_some(), known);
                    prop_assert!(!engine.contains(order_id));
                    let removed = cancelled.map_or(0, |o| o.get_remaining_quantity());
                    prop_assert_eq!(resting_quantity(&engine) + removed, before);
                },
                Op::Modify { id, side, price, quantity } => {
                    let order_id = OrderId::new(id);
                    let previous = engine.get_order(order_id).map(|o| o.get_remaining_quantity());
                    if previous.is_some() {
                        clock += 1;
                        arrivals.insert(order_id, clock);
                    }

                    let trades = engine
                        .modify_order(OrderModify::new(order_id, side, price, quantity))
                        .unwrap();
                    check_trades(&trades);
                    let matched = matched_quantity(&trades);

                    match previous {
                        None => {
                            prop_assert!(trades.is_empty());
                            prop_assert_eq!(engine.levels(), levels_before);
                        },
                        Some(old) => {
                            prop_assert_eq!(
                                resting_quantity(&engine) + 2 * matched + old,
                                before + quantity
                            );
                        },
                    }
                },
            }

            check_book(&engine, &arrivals);
        }
    }

    #[test]
    fn equal_price_orders_fill_in_arrival_order(
        sizes in prop::collection::vec(1u64..10, 2..8),
        taker in 1u64..60,
    ) {
        let mut engine = MatchingEngine::new("TEST", Arc::new(NoOpEventHandler));
        for (i, size) in sizes.iter().enumerate() {
            engine
                .submit_order(Order::good_till_cancel(OrderId::new(i as u64), Side::Sell, 100, *size))
                .unwrap();
        }

        let trades = engine
            .submit_order(Order::good_till_cancel(OrderId::new(1000), Side::Buy, 100, taker))
            .unwrap();

        // Makers are consumed front to back, each fully before the next
        let makers: Vec<u64> = trades.iter().map(|t| t.ask.order_id.value()).collect();
        let expected: Vec<u64> = (0..makers.len() as u64).collect();
        prop_assert_eq!(makers, expected);
        for (i, trade) in trades.iter().enumerate() {
            if i + 1 < trades.len() {
                prop_assert_eq!(trade.quantity(), sizes[i]);
            }
        }
        prop_assert_eq!(matched_quantity(&trades), taker.min(sizes.iter().sum::<u64>()));
    }
}

quickcheck! {
    fn cancel_twice_is_idempotent(bid_sizes: Vec<u8>, target: u8) -> bool {
        let mut engine = MatchingEngine::new("TEST", Arc::new(NoOpEventHandler));
        for (i, size) in bid_sizes.iter().enumerate() {
            let order = Order::good_till_cancel(
                OrderId::new(i as u64),
                Side::Buy,
                100 - (i % 5) as Price,
                u64::from(*size) + 1,
            );
            engine.submit_order(order).unwrap();
        }

        let order_id = OrderId::new(u64::from(target));
        let first = engine.cancel_order(order_id).unwrap();
        let levels = engine.levels();
        let size = engine.size();

        let second = engine.cancel_order(order_id).unwrap();

        first.is_some() == ((target as usize) < bid_sizes.len())
            && second.is_none()
            && engine.levels() == levels
            && engine.size() == size
    }
}
