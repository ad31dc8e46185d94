// ============================================================================
// Basic Usage Example
// ============================================================================

use limit_order_book::prelude::*;
use rust_decimal::Decimal;
use std::sync::Arc;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    println!("=== Limit Order Book Example ===\n");

    let mut engine = MatchingEngineBuilder::new("BTC-USD")
        .with_tick_size(Decimal::new(1, 2))
        .with_max_depth(5)
        .build(Arc::new(LoggingEventHandler))?;

    // Rest one order, then cancel it
    let order_id = OrderId::new(1);
    engine.submit_order(Order::good_till_cancel(order_id, Side::Buy, 100, 10))?;
    println!("Resting orders: {}", engine.size());
    engine.cancel_order(order_id)?;
    println!("Resting orders: {}\n", engine.size());

    // Build a small ladder on both sides
    println!("Adding orders...");
    for i in 0..5u64 {
        let offset = i as Price;
        engine.submit_order(Order::good_till_cancel(
            OrderId::new(10 + i),
            Side::Sell,
            5_000_000 + offset * 100,
            1,
        ))?;
        engine.submit_order(Order::good_till_cancel(
            OrderId::new(20 + i),
            Side::Buy,
            4_999_900 - offset * 100,
            1,
        ))?;
    }

    let snapshot = engine.snapshot();
    println!("\nBids:");
    for level in &snapshot.bids {
        println!("  {} @ {}", level.quantity, level.price);
    }
    println!("\nAsks:");
    for level in &snapshot.asks {
        println!("  {} @ {}", level.quantity, level.price);
    }
    println!("\nSpread (ticks): {:?}", snapshot.spread);
    println!("Mid Price: {:?}", snapshot.mid_price);

    // Fill-or-Kill buy crossing the first three ask levels
    println!("\n=== Submitting Fill-or-Kill Order ===");
    let trades = engine.submit_order(Order::fill_or_kill(
        OrderId::new(99),
        Side::Buy,
        5_000_200,
        2,
    ))?;
    for trade in &trades {
        println!(
            "  Trade {}: bid {} @ {} / ask {} @ {} (qty: {})",
            trade.id,
            trade.bid.order_id,
            trade.bid.price,
            trade.ask.order_id,
            trade.ask.price,
            trade.quantity()
        );
    }

    let levels = engine.levels();
    println!("\n=== Final Order Book ===");
    println!("Bids: {} levels", levels.bids.len());
    println!("Asks: {} levels", levels.asks.len());
    println!("Spread: {:?}", engine.get_spread());

    Ok(())
}
