use anyhow::{Context, Result, anyhow};
use tracing_appender::{
    non_blocking,
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{EnvFilter, Layer, fmt, prelude::*};

use crate::config::{EnvLookup, env_flag};

const QUIET_DEPENDENCIES: &str = "h2=warn,hyper=warn,hyper_util=warn,tower=warn,tonic=warn";

#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    pub is_dev: bool,
    pub log_dir: Option<String>,
    pub level: Option<String>,
}

impl LogConfig {
    pub fn from_lookup(lookup: EnvLookup<'_>) -> Self {
        Self {
            is_dev: env_flag(lookup, "DEV_MODE"),
            log_dir: lookup("LOG_DIR").filter(|dir| !dir.trim().is_empty()),
            level: lookup("RUST_LOG"),
        }
    }
}

fn build_filter(level: Option<&str>) -> EnvFilter {
    let level = level.filter(|l| !l.trim().is_empty()).unwrap_or("info");
    EnvFilter::new(format!("{level},{QUIET_DEPENDENCIES}"))
}

/// Daily rolling `<component>.<date>.log` files under `dir`. The directory is
/// created when missing.
fn file_appender(component: &str, dir: &str) -> Result<RollingFileAppender> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(component)
        .filename_suffix("log")
        .build(dir)
        .with_context(|| format!("failed to open log directory {dir}"))
}

/// Installs the global subscriber. The returned guard flushes the file writer
/// and must live until the process exits.
pub fn init_logger(component: &str, config: &LogConfig) -> Result<Option<WorkerGuard>> {
    let console_layer = if config.is_dev {
        fmt::layer()
            .pretty()
            .with_thread_names(true)
            .with_ansi(true)
            .boxed()
    } else {
        fmt::layer()
            .json()
            .with_current_span(false)
            .with_target(true)
            .boxed()
    };

    let (file_layer, guard) = match config.log_dir.as_deref() {
        Some(dir) => {
            let (file_writer, guard) = non_blocking(file_appender(component, dir)?);

            let layer = fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false)
                .json();

            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(build_filter(config.level.as_deref()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to install logger for {component}: {e}"))?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        let lookup = |key: &str| match key {
            "DEV_MODE" => Some("true".to_string()),
            "LOG_DIR" => Some("/var/log/app".to_string()),
            _ => None,
        };
        let config = LogConfig::from_lookup(&lookup);

        assert!(config.is_dev);
        assert_eq!(config.log_dir.as_deref(), Some("/var/log/app"));
        assert_eq!(config.level, None);
    }

    #[test]
    fn test_unusable_log_dir_is_an_error() {
        let blocker = std::env::temp_dir().join(format!("log-dir-blocker-{}", std::process::id()));
        std::fs::write(&blocker, b"not a directory").unwrap();
        let dir = blocker.join("logs");

        let err = file_appender("emailservice", dir.to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("failed to open log directory"));

        std::fs::remove_file(&blocker).unwrap();
    }

    #[test]
    fn test_log_dir_is_created() {
        let dir = std::env::temp_dir().join(format!("recommendation-logs-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);

        let appender = file_appender("recommendationservice", dir.to_str().unwrap()).unwrap();
        assert!(dir.is_dir());

        let (_writer, guard) = non_blocking(appender);
        drop(guard);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_filter_keeps_requested_level() {
        let filter = build_filter(Some("debug")).to_string();
        assert!(filter.contains("debug"));
        assert!(filter.contains("h2=warn"));
    }

    #[test]
    fn test_filter_defaults_to_info() {
        for filter in [build_filter(None), build_filter(Some(" "))] {
            let rendered = filter.to_string();
            assert!(rendered.contains("info"));
            assert!(!rendered.contains("debug"));
        }
    }
}
