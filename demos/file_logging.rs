//! File logging example
//!
//! Demonstrates logging JSON lines to a file and plain text to the console
//! at the same time.
//!
//! Run with: cargo run --example file_logging

use rust_batch_logger::prelude::*;
use rust_batch_logger::sinks::{FileSink, OpenMode};
use rust_batch_logger::{debug, error, info, warn};

fn main() -> Result<()> {
    println!("=== Rust Batch Logger - File Logging Example ===\n");

    {
        let logger = Logger::builder()
            .min_level(LogLevel::Debug)
            .formatter(JsonFormatter::new().with_ts_format("YYYY-MM-DDTHH:mm:ss.SSSZ"))
            .sink(FileSink::new("application.log", OpenMode::Truncate)?)
            .sink(ConsoleSink::stdout())
            .context(Context::new().with_field("service", "inventory"))
            .buffer_size(4)
            .on_error(|e| eprintln!("log delivery failed: {}", e))
            .build()?;

        println!("1. Logging to both console and file:");
        info!(logger, "Application started");
        debug!(logger, "stage", "config", "source", "defaults");
        warn!(logger, "Using default settings for some options");
        info!(logger, "db", Value::object([("host", "localhost"), ("pool", "8")]));
        error!(logger, "plugin", "metrics", "loaded", false);
        info!(logger, "Application initialization complete");

        println!("\n2. Dropping the logger flushes the partial batch");
    }

    let content = std::fs::read_to_string("application.log")?;
    println!("\n3. application.log now holds {} lines:", content.lines().count());
    print!("{}", content);

    println!("\n=== Example completed successfully! ===");

    Ok(())
}
