/*!
 * Logging and tracing initialization
 */

use std::fs::File;
use std::path::Path;

use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::config::FetchConfig;
use crate::error::{Error, Result};

/// Initialize structured logging based on configuration
pub fn init_logging(config: &FetchConfig) -> Result<()> {
    let log_level = if config.verbose {
        Level::DEBUG
    } else {
        config.log_level.to_tracing_level()
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("starstat={}", log_level)))
        .map_err(|e| Error::Config(format!("failed to create log filter: {}", e)))?;

    if let Some(ref log_path) = config.log_file {
        init_file_logging(log_path, env_filter)?;
    } else {
        init_stderr_logging(env_filter);
    }

    Ok(())
}

/// Log to stderr so table output on stdout stays pipeable
fn init_stderr_logging(env_filter: EnvFilter) {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_span_events(FmtSpan::NONE)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

/// Initialize logging to a file
fn init_file_logging(log_path: &Path, env_filter: EnvFilter) -> Result<()> {
    let file = File::create(log_path)
        .map_err(|e| Error::Config(format!("failed to create log file: {}", e)))?;

    let fmt_layer = fmt::layer()
        .with_writer(file)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(false)
        .json();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogLevel;

    #[test]
    fn test_verbose_overrides_log_level() {
        let config = FetchConfig {
            log_level: LogLevel::Error,
            verbose: true,
            ..Default::default()
        };

        // When verbose is true, init uses DEBUG regardless of log_level
        assert!(config.verbose);
        assert_eq!(config.log_level, LogLevel::Error);
    }

    #[test]
    fn test_log_file_config() {
        let config = FetchConfig {
            log_file: Some("scan.log".into()),
            ..Default::default()
        };
        assert!(config.log_file.is_some());
    }
}
