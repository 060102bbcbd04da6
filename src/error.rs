//! Process exit codes and machine-readable error reports.

use serde::Serialize;

/// Exit codes for the `distinctpics` binary.
///
/// - 0: the command completed (for `scan`, duplicates were found)
/// - 1: the command failed
/// - 2: `scan` completed and found no duplicates
/// - 3: the command completed but some files were skipped or failed
/// - 130: interrupted by Ctrl+C
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Completed; duplicates found or every file organized.
    Success = 0,
    /// An error stopped the command.
    GeneralError = 1,
    /// Scan completed without finding any duplicate cluster.
    NoDuplicates = 2,
    /// Completed, but unreadable or failed files were left behind.
    PartialSuccess = 3,
    /// Interrupted by the user.
    Interrupted = 130,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "DP000",
            Self::GeneralError => "DP001",
            Self::NoDuplicates => "DP002",
            Self::PartialSuccess => "DP003",
            Self::Interrupted => "DP130",
        }
    }

    /// Pick the exit code for a fatal error.
    ///
    /// Interruptions anywhere in the error chain map to [`ExitCode::Interrupted`].
    #[must_use]
    pub fn for_error(err: &anyhow::Error) -> Self {
        let interrupted = err.chain().any(|cause| {
            matches!(
                cause.downcast_ref::<crate::duplicates::FinderError>(),
                Some(crate::duplicates::FinderError::Interrupted)
            ) || matches!(
                cause.downcast_ref::<crate::organize::OrganizeError>(),
                Some(crate::organize::OrganizeError::Interrupted)
            )
        });
        if interrupted {
            Self::Interrupted
        } else {
            Self::GeneralError
        }
    }
}

/// Error report written to stderr with `--json-errors`.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// Machine-readable code, e.g. "DP001"
    pub code: String,
    /// The process exit code
    pub exit_code: i32,
    /// Human-readable message including its causes
    pub message: String,
    /// Whether the command was interrupted
    pub interrupted: bool,
}

impl StructuredError {
    /// Build a report from an error and the exit code chosen for it.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: format!("{err:#}"),
            interrupted: exit_code == ExitCode::Interrupted,
        }
    }
}
