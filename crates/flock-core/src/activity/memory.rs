use async_trait::async_trait;
use parking_lot::Mutex;
use time::OffsetDateTime;

use super::{ActivityError, ActivityLog, format_entry};

/// Activity log kept in process memory (UTC timestamps).
///
/// Useful for tests and for ephemeral agents that do not need a log file.
#[derive(Debug, Default)]
pub struct MemoryActivityLog {
    lines: Mutex<Vec<String>>,
}

impl MemoryActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded lines without trailing newlines, oldest first.
    pub fn entries(&self) -> Vec<String> {
        self.lines
            .lock()
            .iter()
            .map(|l| l.trim_end_matches('\n').to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lines.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.lock().is_empty()
    }
}

#[async_trait]
impl ActivityLog for MemoryActivityLog {
    async fn append(&self, text: &str) -> Result<(), ActivityError> {
        let line = format_entry(OffsetDateTime::now_utc(), text)?;
        self.lines.lock().push(line);
        Ok(())
    }

    async fn read_all(&self) -> Result<String, ActivityError> {
        Ok(self.lines.lock().concat())
    }
}
