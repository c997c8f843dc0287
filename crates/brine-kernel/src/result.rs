//! The structured result every command returns.

use std::process::ExitStatus;

/// Outcome of one executed line: exit code plus whatever output the
/// engine captured on the way. A non-zero `code` is data, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExecResult {
    /// Exit code of the last stage (or builtin). -1 when the process was
    /// killed by a signal and has no code.
    pub code: i64,
    /// Captured stdout of the final stage, empty when redirected.
    pub out: String,
    /// Diagnostic text for the caller to show on stderr.
    pub err: String,
}

impl ExecResult {
    pub fn success(out: impl Into<String>) -> Self {
        Self {
            code: 0,
            out: out.into(),
            err: String::new(),
        }
    }

    pub fn failure(code: i64, err: impl Into<String>) -> Self {
        Self {
            code,
            out: String::new(),
            err: err.into(),
        }
    }

    pub fn from_status(status: ExitStatus, out: String) -> Self {
        Self {
            code: exit_code(status),
            out,
            err: String::new(),
        }
    }

    pub fn ok(&self) -> bool {
        self.code == 0
    }
}

/// Map an [`ExitStatus`] to a plain code, -1 for signal deaths.
pub fn exit_code(status: ExitStatus) -> i64 {
    status.code().unwrap_or(-1) as i64
}
