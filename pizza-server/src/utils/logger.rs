//! Logging Infrastructure
//!
//! `RUST_LOG` wins over the configured level. With a log directory the
//! output goes to a daily rolling file instead of stdout.

use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Initialize the logger
pub fn init_logger() {
    init_logger_with_file(None, false, None);
}

fn env_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("pizza_server={log_level},tower_http={log_level},{log_level}"))
    })
}

/// Initialize the logger with optional JSON format and file output
pub fn init_logger_with_file(log_level: Option<&str>, json: bool, log_dir: Option<&str>) {
    let level = log_level.unwrap_or("info");

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(level))
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    let appender = log_dir.and_then(|dir| {
        let path = Path::new(dir);
        if let Err(e) = std::fs::create_dir_all(path) {
            eprintln!("Cannot create log dir {dir}: {e}, logging to stdout");
            return None;
        }
        Some(tracing_appender::rolling::daily(path, "pizza-server"))
    });

    match (appender, json) {
        (Some(file), true) => builder.json().with_writer(file).init(),
        (Some(file), false) => builder.with_ansi(false).with_writer(file).init(),
        (None, true) => builder.json().init(),
        (None, false) => builder.init(),
    }
}
