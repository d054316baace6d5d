//! Append-only activity log stored in a text file.
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use flock_core::{ActivityError, ActivityLog, format_entry};
use time::OffsetDateTime;
use tokio::{fs, io::AsyncWriteExt, sync::Mutex};
use tracing::trace;

use crate::LoggerTimeZone;

/// Default activity log location, relative to the working directory.
pub const DEFAULT_ACTIVITY_LOG: &str = "log.txt";

/// File-backed [`ActivityLog`].
///
/// Records are appended one line at a time under an async mutex, so concurrent
/// callers never interleave partial lines.
#[derive(Debug)]
pub struct FileActivityLog {
    path: PathBuf,
    tz: LoggerTimeZone,
    lock: Mutex<()>,
}

impl FileActivityLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            tz: LoggerTimeZone::Local,
            lock: Mutex::new(()),
        }
    }

    /// Timezone of record timestamps (local by default).
    pub fn with_time_zone(mut self, tz: LoggerTimeZone) -> Self {
        self.tz = tz;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn ensure_parent(&self) -> Result<(), ActivityError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

impl Default for FileActivityLog {
    fn default() -> Self {
        Self::new(DEFAULT_ACTIVITY_LOG)
    }
}

#[async_trait]
impl ActivityLog for FileActivityLog {
    async fn append(&self, text: &str) -> Result<(), ActivityError> {
        let now = OffsetDateTime::now_utc().to_offset(self.tz.offset());
        let line = format_entry(now, text)?;

        let _guard = self.lock.lock().await;
        self.ensure_parent().await?;
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        trace!(path = %self.path.display(), "activity record appended");
        Ok(())
    }

    async fn read_all(&self) -> Result<String, ActivityError> {
        let _guard = self.lock.lock().await;
        match fs::read_to_string(&self.path).await {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                self.ensure_parent().await?;
                fs::write(&self.path, b"").await?;
                Ok(String::new())
            }
            Err(e) => Err(e.into()),
        }
    }
}
