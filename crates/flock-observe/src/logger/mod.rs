mod config;
mod error;
mod log;
mod object;

pub use config::{LOG_FILTER_ENV, LOG_FORMAT_ENV, LoggerConfig};
pub use error::{LoggerError, LoggerResult};
pub use object::{LoggerFormat, LoggerLevel, LoggerRfc3339, LoggerTimeZone, init_local_offset};

/// Install the global tracing subscriber described by `cfg`.
///
/// Call once at startup. With [`LoggerTimeZone::Local`], call
/// [`init_local_offset`] first, before the async runtime spawns threads.
///
/// ```rust
/// use flock_observe::{LoggerConfig, init_logger};
///
/// let config = LoggerConfig::default().with_env_overrides().unwrap();
/// init_logger(&config).expect("logger");
/// tracing::info!("ready");
/// ```
pub fn init_logger(cfg: &LoggerConfig) -> LoggerResult<()> {
    match cfg.format {
        LoggerFormat::Text => log::logger_text(cfg),
        LoggerFormat::Json => log::logger_json(cfg),
        LoggerFormat::Journald => log::logger_journald(cfg),
    }
}
