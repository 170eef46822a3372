//! Response records and exit statuses.
//!
//! Exactly one record is written to stdout per target. The untagged
//! [`HookResponse`] keeps each record shape flat, the way the host agent
//! expects it.

use crate::core::error::Error;
use crate::core::runner::CheckOutcome;
use serde::Serialize;
use std::process::ExitCode;

/// Process exit status understood by the host agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum ExitStatus {
    /// Carry on.
    Continue = 0,
    /// Something went wrong; not a verdict on the edit.
    Failure = 1,
    /// Reject the edit until the reported issues are fixed.
    Block = 2,
}

impl ExitStatus {
    /// Numeric exit code.
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        Self::from(status.code())
    }
}

/// Verdict field of a decision record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    /// The edit stands.
    Allow,
    /// The edit must be fixed.
    Block,
}

impl Decision {
    /// Block exactly when a tool failed.
    #[must_use]
    pub const fn for_outcome(outcome: &CheckOutcome) -> Self {
        if outcome.success {
            Self::Allow
        } else {
            Self::Block
        }
    }
}

/// The single JSON document written to stdout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum HookResponse {
    /// Nothing was checked.
    Skip(SkipRecord),
    /// Tools ran; carries the full outcome.
    Check(CheckRecord),
    /// Dependencies missing or a tool could not be started.
    Failure(FailureRecord),
    /// The request itself could not be handled.
    Error(ErrorRecord),
    /// Block verdict for the host agent.
    Decision(DecisionRecord),
}

/// `{tool?, target?, skipped: true, reason}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkipRecord {
    /// Host tool name, hook mode only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
    /// Target as given; absent when the whole request was skipped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// Always true.
    pub skipped: bool,
    /// Why nothing was checked.
    pub reason: String,
}

/// `{tool?, target, success, total_errors, total_warnings, per_tool}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckRecord {
    /// Host tool name, hook mode only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
    /// Target as given.
    pub target: String,
    /// Aggregated tool results.
    #[serde(flatten)]
    pub outcome: CheckOutcome,
}

/// `{tool?, target, success: false, error}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureRecord {
    /// Host tool name, hook mode only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
    /// Target as given.
    pub target: String,
    /// Always false.
    pub success: bool,
    /// What is missing or broken.
    pub error: String,
}

/// `{error}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorRecord {
    /// What went wrong.
    pub error: String,
}

/// `{decision, reason?}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecisionRecord {
    /// The verdict.
    pub decision: Decision,
    /// Instructions for the agent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl HookResponse {
    /// Error record.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(ErrorRecord {
            error: message.into(),
        })
    }

    /// Serializes the response. Pretty output for humans, compact for the
    /// host agent.
    #[must_use]
    pub fn to_json(&self, pretty: bool) -> String {
        let encoded = if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        };

        encoded.unwrap_or_else(|e| {
            let error = Error::Internal {
                message: format!("Failed to serialize response: {e}"),
            };
            serde_json::json!({ "error": error.to_string() }).to_string()
        })
    }
}
