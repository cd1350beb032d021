//! Basic facade usage example
//!
//! Demonstrates hierarchical configuration, level filtering and a serialized
//! console sink.
//!
//! Run with: cargo run --example basic_usage

use rust_log_facade::prelude::*;
use rust_log_facade::{debug, info, warn};

fn main() -> Result<()> {
    println!("=== Rust Log Facade - Basic Usage Example ===\n");

    let registry = Registry::new();
    let console = SerializedSink::new(ConsoleBackend::new())?.shared();

    // Root only lets warnings through; "app.net" opens up to debug
    registry.configure_root(LogLevel::Warn, vec![console.clone()])?;
    registry.configure("app.net", Some(LogLevel::Debug), None)?;

    println!("1. Logging at different levels through the root:");
    let app = registry.get_logger("app");
    app.trace("Trace message (hidden)");
    app.debug("Debug message (hidden)");
    app.info("Info message (hidden)");
    app.warn("Warning message (visible)");
    app.error("Error message (visible)");
    registry.flush()?;

    println!("\n2. Inherited configuration for app.net.http:");
    let http = registry.get_logger("app.net.http");
    debug!(http, "GET {} took {}ms", "/health", 3);
    info!(http, category: "app.net.http.access", "200 OK");
    registry.flush()?;

    println!("\n3. Reconfiguring at runtime:");
    registry.configure("app", Some(LogLevel::Info), None)?;
    info!(app, "Info message (now visible)");
    warn!(app, "Still visible");
    registry.flush()?;

    println!("\n=== Example completed successfully! ===");

    Ok(())
}
