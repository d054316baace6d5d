use std::sync::{
    OnceLock,
    atomic::{AtomicU64, Ordering},
};

use time::OffsetDateTime;

/// Process-wide monotonically increasing sequence for run identifiers.
static RUN_SEQ: AtomicU64 = AtomicU64::new(1);

/// Per-process component of every run id, fixed on first use.
static PROCESS_TAG: OnceLock<String> = OnceLock::new();

fn next_seq() -> u64 {
    RUN_SEQ.fetch_add(1, Ordering::Relaxed)
}

/// Start time in milliseconds plus the pid, both hex.
///
/// Units outlive the agent, so a restarted process must not reuse the names of
/// an earlier one.
fn process_tag() -> &'static str {
    PROCESS_TAG.get_or_init(|| {
        let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
        format!("{:x}{:x}", millis as u64 & 0xffff_ffff_ffff, std::process::id())
    })
}

fn format_run_id(prefix: &str, tag: &str, seq: u64) -> String {
    format!("{prefix}-{tag}-{seq:x}")
}

/// Build a run id used as the base name of units provisioned by one call.
///
/// Format: `{prefix}-{tag}-{seq:x}`, where `tag` identifies the process and
/// `seq` is a per-process hex sequence. Partition units append `-{index}`.
pub fn make_run_id(prefix: &str) -> String {
    format_run_id(prefix, process_tag(), next_seq())
}
