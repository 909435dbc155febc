//! Basic logger usage example
//!
//! Demonstrates the text formatter, level filtering, structured payloads and
//! child loggers with a console sink.
//!
//! Run with: cargo run --example basic_usage

use rust_batch_logger::prelude::*;
use rust_batch_logger::{debug, error, info, trace, warn};

fn main() -> Result<()> {
    println!("=== Rust Batch Logger - Basic Usage Example ===\n");

    let logger = Logger::builder()
        .min_level(LogLevel::Trace)
        .formatter(TextFormatter::new("[%lvl%] %date.format(HH:mm:ss.SSS)% (%caller%) %ctx% %args%"))
        .sink(ConsoleSink::stdout())
        .context(Context::new().with_field("app", "demo"))
        .exit_on_fatal(false)
        .build()?;

    println!("1. Logging at different levels:");
    trace!(logger, "This is a trace message");
    debug!(logger, "This is a debug message");
    info!(logger, "This is an info message");
    warn!(logger, "This is a warning message");
    error!(logger, "This is an error message");
    logger.fatal(&["This is a fatal message (exit disabled)".into()]);

    println!("\n2. Key/value arguments and nested payloads:");
    info!(logger, "user", "ada", "attempt", 3);
    info!(
        logger,
        "request",
        Value::object([
            ("path", Value::from("/checkout")),
            ("status", Value::from(200)),
            ("tags", Value::from(vec!["web", "eu"])),
        ])
    );

    println!("\n3. Cyclic payloads are rendered safely:");
    let node = Object::new();
    node.insert("name", "root");
    node.insert("self", Value::Object(node.clone()));
    info!(logger, "graph", Value::Object(node));

    println!("\n4. Child loggers inherit and extend context:");
    let child = logger.child(Context::new().with_field("request_id", 42))?;
    info!(child, "handled by child");

    println!("\n5. Minimum level WARN hides info:");
    let quiet = Logger::builder()
        .min_level(LogLevel::Warn)
        .formatter(TextFormatter::new("[%lvl%] %args%"))
        .build()?;
    info!(quiet, "Info message (hidden)");
    warn!(quiet, "Warning message (visible)");

    println!("\n=== Example completed successfully! ===");

    Ok(())
}
