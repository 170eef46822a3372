//! Turns pipeline reports into responses and exit statuses.

use crate::core::error::Error;
use crate::core::runner::{CheckOutcome, Report, ToolRunResult};
use crate::protocol::response::{
    CheckRecord, Decision, DecisionRecord, ExitStatus, FailureRecord, HookResponse, SkipRecord,
};
use std::fmt;

/// Skip reason for tools that do not edit files.
pub const SKIP_NON_EDIT_TOOL: &str = "not a file editing tool";

const BLOCK_PREAMBLE: &str = "The file has errors that must be fixed before continuing.\n\
Please fix ALL the following issues (even if they existed before your changes):\n\n";

const BLOCK_EPILOGUE: &str = "\n\nFix these issues and try again.";

/// One failing tool, as shown to the agent and on stderr.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    /// `Type checking (tsc) found 2 errors and 0 warnings:`
    pub heading: String,
    /// Output excerpt, when there was one.
    pub excerpt: Option<String>,
}

impl From<&ToolRunResult> for Finding {
    fn from(result: &ToolRunResult) -> Self {
        Self {
            heading: format!(
                "{} ({}) found {} errors and {} warnings:",
                result.tool.purpose(),
                result.tool,
                result.error_count,
                result.warning_count
            ),
            excerpt: result.excerpt.clone(),
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.heading)?;
        if let Some(ref excerpt) = self.excerpt {
            write!(f, "\n{excerpt}")?;
        }
        Ok(())
    }
}

/// Human-readable text for stderr.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A single message.
    Message(String),
    /// Per-tool findings behind a block decision.
    Findings(Vec<Finding>),
}

/// Everything the dispatcher emits for one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    /// Document for stdout.
    pub response: HookResponse,
    /// Exit status contribution.
    pub status: ExitStatus,
    /// Text for stderr, if any.
    pub diagnostic: Option<Diagnostic>,
}

impl Rendered {
    fn quiet(response: HookResponse, status: ExitStatus) -> Self {
        Self {
            response,
            status,
            diagnostic: None,
        }
    }

    /// Error record with exit 1. Errors go to the log, not stderr.
    #[must_use]
    pub fn error(error: &Error) -> Self {
        Self::quiet(HookResponse::error(error.to_string()), ExitStatus::Failure)
    }

    /// Pass-through for a host tool that does not edit files.
    #[must_use]
    pub fn non_edit_tool(tool_name: &str) -> Self {
        Self::quiet(
            HookResponse::Skip(SkipRecord {
                tool: Some(tool_name.to_string()),
                target: None,
                skipped: true,
                reason: SKIP_NON_EDIT_TOOL.to_string(),
            }),
            ExitStatus::Continue,
        )
    }
}

/// Renders a report for CLI and interactive modes. Failing checks exit 1
/// but never block.
#[must_use]
pub fn render_cli(report: Report) -> Rendered {
    render(report, None)
}

/// Renders a report for hook mode. Failing checks become a block decision.
#[must_use]
pub fn render_hook(tool_name: &str, report: Report) -> Rendered {
    if let Report::Checked { ref outcome, .. } = report {
        if Decision::for_outcome(outcome) == Decision::Block {
            return block(outcome);
        }
    }

    render(report, Some(tool_name.to_string()))
}

fn render(report: Report, tool: Option<String>) -> Rendered {
    match report {
        Report::Skipped { target, reason } => Rendered::quiet(
            HookResponse::Skip(SkipRecord {
                tool,
                target: Some(target),
                skipped: true,
                reason: reason.to_string(),
            }),
            ExitStatus::Continue,
        ),
        Report::DependencyMissing { target, message }
        | Report::InvocationFailed { target, message } => Rendered {
            response: HookResponse::Failure(FailureRecord {
                tool,
                target,
                success: false,
                error: message.clone(),
            }),
            status: ExitStatus::Failure,
            diagnostic: Some(Diagnostic::Message(message)),
        },
        Report::Checked { target, outcome } => {
            let status = if outcome.success {
                ExitStatus::Continue
            } else {
                ExitStatus::Failure
            };
            Rendered::quiet(
                HookResponse::Check(CheckRecord {
                    tool,
                    target,
                    outcome,
                }),
                status,
            )
        },
    }
}

fn block(outcome: &CheckOutcome) -> Rendered {
    let findings: Vec<Finding> = outcome.failed_tools().map(Finding::from).collect();

    Rendered {
        response: HookResponse::Decision(DecisionRecord {
            decision: Decision::Block,
            reason: Some(block_reason(&findings)),
        }),
        status: ExitStatus::Block,
        diagnostic: Some(Diagnostic::Findings(findings)),
    }
}

/// The instruction text sent back with a block decision.
#[must_use]
pub fn block_reason(findings: &[Finding]) -> String {
    let details = findings
        .iter()
        .map(Finding::to_string)
        .collect::<Vec<_>>()
        .join("\n\n");

    format!("{BLOCK_PREAMBLE}{details}{BLOCK_EPILOGUE}")
}
