//! Append-only activity log contract.
//!
//! The engine writes exactly one record per operation call. Records are lines of the
//! form `[YYYY-MM-DD HH:MM:SS] <text>`; embedded line breaks are stripped from `<text>`.
mod memory;
pub use memory::MemoryActivityLog;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use time::{OffsetDateTime, macros::format_description};

#[derive(Debug, Error)]
pub enum ActivityError {
    #[error("activity log io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to format timestamp: {0}")]
    Timestamp(String),
}

/// Append-only record of completed operations.
#[async_trait]
pub trait ActivityLog: Send + Sync + 'static {
    /// Append one timestamped record.
    async fn append(&self, text: &str) -> Result<(), ActivityError>;

    /// Return the whole log as text; an absent log reads as empty.
    async fn read_all(&self) -> Result<String, ActivityError>;
}

/// Shared handle to an activity log.
pub type ActivityHandle = Arc<dyn ActivityLog>;

/// Render one log line (newline-terminated) for `text` stamped at `at`.
pub fn format_entry(at: OffsetDateTime, text: &str) -> Result<String, ActivityError> {
    let stamp = at
        .format(format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second]"
        ))
        .map_err(|e| ActivityError::Timestamp(e.to_string()))?;
    let text: String = text.chars().filter(|c| !matches!(c, '\n' | '\r')).collect();
    Ok(format!("[{stamp}] {text}\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn entry_has_bracketed_timestamp_and_single_line() {
        let at = datetime!(2024-03-09 07:05:01 UTC);
        let line = format_entry(at, "Unit web-1 started\nfrom image alpine").unwrap();
        assert_eq!(line, "[2024-03-09 07:05:01] Unit web-1 startedfrom image alpine\n");
    }
}
