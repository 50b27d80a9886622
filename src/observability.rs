//! Logging and observability helpers.
//!
//! Card numbers, names, expiry dates and CVVs never appear in log fields;
//! only ids, card type and last four digits do.

use std::fs;
use std::path::PathBuf;

use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

const LOG_FILE_PREFIX: &str = "cardvault.log";
const DEFAULT_FILTER: &str = "cardvault=info";

/// Installs a daily rolling file subscriber. Calling it twice is harmless.
pub fn init_tracing() {
    let log_dir = log_directory();
    let _ = fs::create_dir_all(&log_dir);

    let file_appender: RollingFileAppender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(file_appender)
        .with_ansi(false)
        .with_span_events(FmtSpan::CLOSE)
        .try_init();
}

/// `RUST_LOG` when set and valid, `cardvault=info` otherwise
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

pub fn log_directory() -> PathBuf {
    if let Some(custom) = std::env::var_os("CARDVAULT_LOG_DIR").filter(|v| !v.is_empty()) {
        return PathBuf::from(custom);
    }

    if cfg!(windows) {
        let appdata = std::env::var_os("APPDATA")
            .unwrap_or_else(|| std::env::var_os("USERPROFILE").unwrap_or_default());
        let mut path = PathBuf::from(appdata);
        path.push("CardVault");
        path.push("logs");
        path
    } else {
        let home = std::env::var_os("HOME").unwrap_or_default();
        let mut path = PathBuf::from(home);
        path.push(".cardvault");
        path.push("logs");
        path
    }
}
