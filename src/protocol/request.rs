//! Hook payload read from stdin.

use crate::core::error::{Error, Result};
use serde::Deserialize;
use serde_json::Value;
use std::path::PathBuf;

/// Tool names that write files and therefore trigger a check.
pub const EDIT_TOOLS: &[&str] = &["Write", "Edit", "MultiEdit"];

/// The payload the host agent sends on stdin after a tool call.
///
/// Only the fields the hook needs are modelled. Unknown fields are ignored
/// for forward compatibility.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HookRequest {
    /// Name of the tool the agent just used.
    #[serde(default)]
    pub tool_name: String,
    /// The tool's arguments, kept opaque.
    #[serde(default)]
    pub tool_input: Value,
    /// The agent's working directory, used as the project root.
    #[serde(default)]
    pub cwd: Option<PathBuf>,
}

impl HookRequest {
    /// Parses the raw stdin buffer.
    pub fn parse(input: &str) -> Result<Self> {
        if input.trim().is_empty() {
            return Err(Error::invalid_input("No input received"));
        }

        serde_json::from_str(input).map_err(|e| Error::invalid_input(format!("Invalid JSON: {e}")))
    }

    /// Returns true if the tool edits files.
    #[must_use]
    pub fn is_edit_tool(&self) -> bool {
        EDIT_TOOLS.contains(&self.tool_name.as_str())
    }

    /// The edited file, if the payload names a non-empty one.
    #[must_use]
    pub fn file_path(&self) -> Option<&str> {
        self.tool_input
            .get("file_path")
            .and_then(Value::as_str)
            .filter(|path| !path.is_empty())
    }
}
