//! The check pipeline.
//!
//! Preflight, classification, tool invocation and aggregation for one
//! target. Tools run one after another; each run is a suspension point.

use crate::checks::{PlannedRun, Tool, Toolchain};
use crate::core::error::Error;
use crate::core::executor::{CommandOutput, CommandRunner};
use crate::core::preflight::{DependencyCache, Preflight, MISSING_PREFIX};
use crate::core::target::{Classification, Target};
use serde::Serialize;
use std::time::Instant;

/// Result of running a single tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolRunResult {
    /// Which tool ran.
    pub tool: Tool,
    /// Exit code of the tool.
    pub exit_code: i32,
    /// Errors found in the output.
    pub error_count: usize,
    /// Warnings found in the output.
    pub warning_count: usize,
    /// Context around the first errors, only when the tool failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    /// Combined stdout and stderr.
    pub raw_output: String,
}

impl ToolRunResult {
    /// Parses a finished tool run.
    #[must_use]
    pub fn from_output(tool: Tool, output: &CommandOutput) -> Self {
        let raw_output = output.combined_output();
        let parsed = tool.parser().parse(&raw_output);

        let excerpt = if output.success() {
            None
        } else {
            parsed
                .excerpt
                .or_else(|| crate::checks::excerpt::head(&raw_output))
        };

        Self {
            tool,
            exit_code: output.exit_code,
            error_count: parsed.error_count,
            warning_count: parsed.warning_count,
            excerpt,
            raw_output,
        }
    }

    /// Returns true if the tool exited zero.
    #[must_use]
    pub const fn passed(&self) -> bool {
        self.exit_code == 0
    }
}

/// Aggregate of every tool run for one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckOutcome {
    /// Every tool exited zero.
    pub success: bool,
    /// Sum of per-tool error counts.
    pub total_errors: usize,
    /// Sum of per-tool warning counts.
    pub total_warnings: usize,
    /// Individual tool results, in run order.
    pub per_tool: Vec<ToolRunResult>,
}

impl CheckOutcome {
    /// Merges tool results. Success is decided by exit codes alone; the
    /// counts are informational.
    #[must_use]
    pub fn aggregate(per_tool: Vec<ToolRunResult>) -> Self {
        Self {
            success: per_tool.iter().all(ToolRunResult::passed),
            total_errors: per_tool.iter().map(|r| r.error_count).sum(),
            total_warnings: per_tool.iter().map(|r| r.warning_count).sum(),
            per_tool,
        }
    }

    /// Returns the tools that failed.
    pub fn failed_tools(&self) -> impl Iterator<Item = &ToolRunResult> {
        self.per_tool.iter().filter(|r| !r.passed())
    }
}

/// What happened to one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    /// The target was not checked.
    Skipped {
        /// Target as given.
        target: String,
        /// Why it was skipped.
        reason: &'static str,
    },
    /// A required tool is not installed.
    DependencyMissing {
        /// Target as given.
        target: String,
        /// Remediation message.
        message: String,
    },
    /// A tool could not be started.
    InvocationFailed {
        /// Target as given.
        target: String,
        /// What went wrong.
        message: String,
    },
    /// The tools ran.
    Checked {
        /// Target as given.
        target: String,
        /// Aggregated results.
        outcome: CheckOutcome,
    },
}

impl Report {
    /// Returns the target as given.
    #[must_use]
    pub fn target(&self) -> &str {
        match self {
            Self::Skipped { target, .. }
            | Self::DependencyMissing { target, .. }
            | Self::InvocationFailed { target, .. }
            | Self::Checked { target, .. } => target,
        }
    }

    /// Returns false for anything that should fail a CLI run.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        match self {
            Self::Skipped { .. } => true,
            Self::Checked { outcome, .. } => outcome.success,
            Self::DependencyMissing { .. } | Self::InvocationFailed { .. } => false,
        }
    }
}

/// Runner for the check pipeline.
#[derive(Debug)]
pub struct Runner<R> {
    executor: R,
    toolchain: Toolchain,
    preflight: Preflight,
}

impl<R: CommandRunner> Runner<R> {
    /// Creates a runner that spawns processes through `executor`.
    #[must_use]
    pub fn new(executor: R, toolchain: Toolchain) -> Self {
        let preflight = Preflight::new(toolchain.requirements());
        Self {
            executor,
            toolchain,
            preflight,
        }
    }

    /// Runs the whole pipeline for one target.
    pub async fn check(&self, raw: &str, cache: &mut DependencyCache) -> Report {
        let status = self
            .preflight
            .verify(&self.executor, cache, Instant::now())
            .await;

        if !status.ok {
            return Report::DependencyMissing {
                target: raw.to_string(),
                message: status
                    .message
                    .unwrap_or_else(|| MISSING_PREFIX.to_string()),
            };
        }

        let target = Target::resolve(raw, self.toolchain.root());
        let shape = match target.classify() {
            Classification::Skip(reason) => {
                tracing::info!(path = raw, reason, "Skipping target");
                return Report::Skipped {
                    target: raw.to_string(),
                    reason,
                };
            },
            Classification::Check(shape) => shape,
        };

        tracing::info!(path = raw, shape = ?shape, "Checking target");

        let mut results = Vec::new();
        for planned in self.toolchain.plan(&shape) {
            match self.run_tool(&planned).await {
                Ok(result) => results.push(result),
                Err(message) => {
                    return Report::InvocationFailed {
                        target: raw.to_string(),
                        message,
                    };
                },
            }
        }

        let outcome = CheckOutcome::aggregate(results);
        tracing::info!(
            path = raw,
            success = outcome.success,
            errors = outcome.total_errors,
            warnings = outcome.total_warnings,
            "Checks finished"
        );

        Report::Checked {
            target: raw.to_string(),
            outcome,
        }
    }

    /// Runs one tool. `Err` carries the message for an invocation failure.
    async fn run_tool(&self, planned: &PlannedRun) -> std::result::Result<ToolRunResult, String> {
        let tool = planned.tool;
        let output = match self.executor.run(&planned.invocation).await {
            Ok(output) => output,
            Err(e) => {
                tracing::error!(tool = %tool, error = %e, "Failed to start tool");
                return Err(self.invocation_message(tool, &e));
            },
        };

        if output.command_not_found() {
            tracing::error!(
                tool = %tool,
                exit_code = output.exit_code,
                stderr = %output.stderr.trim(),
                "Tool not found by the package manager"
            );
            return Err(self.missing_tool_message(tool));
        }

        let result = ToolRunResult::from_output(tool, &output);
        if result.passed() {
            tracing::info!(tool = %tool, "Check passed");
        } else {
            tracing::warn!(
                tool = %tool,
                exit_code = result.exit_code,
                errors = result.error_count,
                warnings = result.warning_count,
                "Check found issues"
            );
        }

        Ok(result)
    }

    fn invocation_message(&self, tool: Tool, error: &Error) -> String {
        if error.is_environment_error() {
            format!(
                "{MISSING_PREFIX}: could not run {tool} ({error}). Install {} from {}",
                self.toolchain.manager(),
                self.toolchain.manager().install_url()
            )
        } else {
            format!("Failed to run {tool}: {error}")
        }
    }

    fn missing_tool_message(&self, tool: Tool) -> String {
        format!(
            "{MISSING_PREFIX}: {tool} could not be executed. Install it with: {}",
            self.toolchain.manager().install_hint(tool.package())
        )
    }
}
