use std::io::IsTerminal;

use serde::{Deserialize, Serialize};

use super::{
    LoggerResult,
    object::{LoggerFormat, LoggerLevel, LoggerTimeZone},
};

/// Environment variable overriding [`LoggerConfig::level`].
pub const LOG_FILTER_ENV: &str = "FLOCK_LOG";

/// Environment variable overriding [`LoggerConfig::format`].
pub const LOG_FORMAT_ENV: &str = "FLOCK_LOG_FORMAT";

/// Logger configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    pub format: LoggerFormat,
    /// Filter expression, e.g. `"info"` or `"flock_core=debug,info"`.
    pub level: LoggerLevel,
    /// Timezone of log timestamps.
    pub tz: LoggerTimeZone,
    /// Include module targets in output.
    pub with_targets: bool,
    /// Colored output; only honored when stdout is a terminal.
    pub use_color: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            format: LoggerFormat::default(),
            level: LoggerLevel::default(),
            tz: LoggerTimeZone::default(),
            with_targets: true,
            use_color: true,
        }
    }
}

impl LoggerConfig {
    pub fn should_use_color(&self) -> bool {
        self.use_color && std::io::stdout().is_terminal()
    }

    /// Apply [`LOG_FILTER_ENV`] and [`LOG_FORMAT_ENV`] when set.
    pub fn with_env_overrides(self) -> LoggerResult<Self> {
        let filter = std::env::var(LOG_FILTER_ENV).ok();
        let format = std::env::var(LOG_FORMAT_ENV).ok();
        self.with_overrides(filter.as_deref(), format.as_deref())
    }

    /// Replace level and format with the given raw values; blank values are ignored.
    pub fn with_overrides(mut self, filter: Option<&str>, format: Option<&str>) -> LoggerResult<Self> {
        if let Some(filter) = filter.filter(|v| !v.trim().is_empty()) {
            self.level = filter.parse()?;
        }
        if let Some(format) = format.filter(|v| !v.trim().is_empty()) {
            self.format = format.parse()?;
        }
        Ok(self)
    }
}
