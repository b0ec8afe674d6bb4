//! Logging Infrastructure
//!
//! `RUST_LOG` wins when set; otherwise `LOG_LEVEL` applies to this crate and
//! tower-http. With a `LOG_DIR` that exists, output goes to a daily rolling file.

use std::path::Path;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "diag_server=info,tower_http=info";

fn build_filter(log_level: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| match log_level {
        Some(level) => EnvFilter::new(format!(
            "diag_server={level},tower_http={level},security={level}"
        )),
        None => EnvFilter::new(DEFAULT_FILTER),
    })
}

/// Initialize the global subscriber
pub fn init_logger(log_level: Option<&str>, log_dir: Option<&str>) {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(build_filter(log_level))
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false);

    if let Some(dir) = log_dir {
        let log_path = Path::new(dir);
        if log_path.exists()
            && let Some(dir_str) = log_path.to_str()
        {
            let file_appender = tracing_appender::rolling::daily(dir_str, "diag-server");
            subscriber.with_ansi(false).with_writer(file_appender).init();
            return;
        }
        eprintln!("LOG_DIR {dir} does not exist, logging to stdout");
    }

    subscriber.init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_from_level() {
        // RUST_LOG is not set under cargo test unless the developer sets it
        if std::env::var("RUST_LOG").is_err() {
            let filter = build_filter(Some("debug"));
            assert!(filter.to_string().contains("diag_server=debug"));
            let default = build_filter(None).to_string();
            assert!(default.contains("diag_server=info"));
            assert!(default.contains("tower_http=info"));
        }
    }
}
