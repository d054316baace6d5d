use serde::{Deserialize, Serialize};

/// Raw result of running a command inside a unit.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExecOutput {
    /// Exit code reported by the runtime.
    pub exit_code: i64,
    /// Captured output bytes (stdout followed by stderr).
    #[serde(default)]
    pub output: Vec<u8>,
}

impl ExecOutput {
    pub fn new(exit_code: i64, output: impl Into<Vec<u8>>) -> Self {
        Self {
            exit_code,
            output: output.into(),
        }
    }

    /// Successful exit with the given output.
    pub fn ok(output: impl Into<Vec<u8>>) -> Self {
        Self::new(0, output)
    }

    #[inline]
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Output decoded as UTF-8 (lossy).
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }

    /// Output collapsed to a single line, see [`normalize_output`].
    pub fn normalized(&self) -> String {
        normalize_output(&String::from_utf8_lossy(&self.output))
    }
}

/// Collapse command output into one transport-friendly line.
///
/// Every line is trimmed on both sides, blank lines are skipped and the remaining
/// lines are joined by a single space. Whitespace inside a line is kept.
pub fn normalize_output(raw: &str) -> String {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
