//! Batched logging example
//!
//! Demonstrates size- and time-triggered flushing, and shows what each
//! flush hands to the sinks.
//!
//! Run with: cargo run --example batched_logging

use rust_batch_logger::core::FlushTrigger;
use rust_batch_logger::info;
use rust_batch_logger::prelude::*;
use std::thread;
use std::time::Duration;

fn batch_printer(name: &'static str) -> impl Sink + 'static {
    FnSink::new(name, move |batch: &[String]| {
        println!("   [{}] flushed {} line(s)", name, batch.len());
        for line in batch {
            print!("      {}", line);
        }
        Ok(())
    })
}

fn main() -> Result<()> {
    println!("=== Rust Batch Logger - Batched Logging Example ===\n");

    println!("1. Size trigger: a batch every 3 lines");
    {
        let logger = Logger::builder()
            .formatter(TextFormatter::new("[%lvl%] %args%").with_styled(false))
            .sink(batch_printer("size"))
            .buffer_size(3)
            .build()?;
        for i in 1..=7 {
            info!(logger, "event", i);
        }
        println!("   dropping logger with {} buffered", logger.buffered());
    }

    println!("\n2. Timer trigger: whatever is buffered every 100ms");
    {
        let logger = Logger::builder()
            .formatter(TextFormatter::new("[%lvl%] %args%").with_styled(false))
            .sink(batch_printer("timer"))
            .flush_interval(Duration::from_millis(100))
            .build()?;
        for i in 1..=5 {
            info!(logger, "tick", i);
            thread::sleep(Duration::from_millis(40));
        }
        thread::sleep(Duration::from_millis(150));

        let metrics = logger.metrics();
        println!(
            "   timer flushes: {}, empty: {}",
            metrics.flushes(FlushTrigger::Timer),
            metrics.empty_flushes()
        );
    }

    println!("\n3. Both triggers: size 4 or every 250ms, whichever comes first");
    {
        let logger = Logger::builder()
            .formatter(Formatter::named("json"))
            .sink(batch_printer("both"))
            .buffer_size(4)
            .flush_interval(Duration::from_millis(250))
            .capture_caller(false)
            .build()?;
        for i in 1..=6 {
            info!(logger, "job", i, "ok", true);
        }
        thread::sleep(Duration::from_millis(300));
        println!("   lines dispatched: {}", logger.metrics().lines_dispatched());
    }

    println!("\n=== Example completed successfully! ===");

    Ok(())
}
