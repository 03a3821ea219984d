//! Logger module
//!
//! Provides logging utilities for the asset gateway including:
//! - Server lifecycle logging
//! - Access logging with multiple formats
//! - Ledger call tracing
//! - Error and warning logging

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use crate::config::Config;
use std::net::SocketAddr;
use std::time::Duration;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
        &config.logging.level,
    )
}

/// Write to info log
fn write_info(message: &str) {
    match writer::get() {
        Some(w) => w.write_info(message),
        None => println!("{message}"),
    }
}

/// Write to error log
fn write_error(message: &str) {
    match writer::get() {
        Some(w) => w.write_error(message),
        None => eprintln!("{message}"),
    }
}

/// Write to access log specifically
fn write_access(message: &str) {
    match writer::get() {
        Some(w) => w.write_access(message),
        None => println!("{message}"),
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    write_info("======================================");
    write_info("Asset Transfer API started successfully");
    write_info(&format!("Listening on: http://{addr}"));
    write_info(&format!("Log level: {}", config.logging.level));
    if let Some(workers) = config.server.workers {
        write_info(&format!("Worker threads: {workers}"));
    }
    if let Some(ref path) = config.logging.access_log_file {
        write_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("Error log: {path}"));
    }
    write_info(&format!(
        "Ledger: {:?} backend, channel '{}', contract '{}'",
        config.ledger.backend, config.ledger.channel, config.ledger.contract
    ));
    write_info("Available endpoints:");
    write_info("  POST   /assets           - Create asset (admin only)");
    write_info("  GET    /assets/:id       - Get asset by ID");
    write_info("  GET    /assets           - Get all assets (auditor) or user assets");
    write_info("  PUT    /assets/:id       - Update asset");
    write_info("  DELETE /assets/:id       - Delete asset (admin only)");
    write_info("  GET    /health           - Health check");
    write_info("  GET    /user-info        - Get user permissions");
    write_info("======================================\n");
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    write_info(&format!("[Connection] Accepted from: {peer_addr}"));
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write_error(&format!("[ERROR] Failed to serve connection: {err:?}"));
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(&format!("[WARN] {message}"));
}

pub fn log_headers_count(count: usize, show: bool) {
    if show {
        write_info(&format!("[Headers] Count: {count}"));
    }
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    write_access(&entry.format(format));
}

pub fn log_ledger_call(role: &str, operation: &str, elapsed: Duration) {
    write_info(&format!(
        "[Ledger] {operation} as '{role}' completed in {}ms",
        elapsed.as_millis()
    ));
}

pub fn log_ledger_failure(context: &str, err: &impl std::fmt::Display) {
    write_error(&format!("[LEDGER] {context}: {err}"));
}

pub fn log_shutdown_requested(signal: &str) {
    write_info(&format!("\n[Shutdown] {signal} received, no longer accepting connections"));
}

pub fn log_shutdown_complete(remaining: usize) {
    if remaining == 0 {
        write_info("[Shutdown] All connections closed");
    } else {
        log_warning(&format!(
            "[Shutdown] Exiting with {remaining} connection(s) still open"
        ));
    }
}
