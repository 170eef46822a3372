//! Output parser for the type checkers (`tsc` and `svelte-check`).
//!
//! `tsc --pretty false` reports `file.ts(3,7): error TS2322: ...`;
//! `svelte-check --output human` prints the location on one line and
//! `Error: ...` / `Warning: ...` on the next.

use crate::checks::OutputParser;
use regex::Regex;
use std::sync::OnceLock;

/// Parser for type checker output.
#[derive(Debug, Default, Clone, Copy)]
pub struct TypeCheckParser;

fn tsc_diagnostic() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"\b(error|warning) TS\d+:").ok())
        .as_ref()
}

fn tsc_severity(line: &str) -> Option<String> {
    tsc_diagnostic()?
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

impl OutputParser for TypeCheckParser {
    fn is_error(&self, line: &str) -> bool {
        line.trim_start().starts_with("Error:") || tsc_severity(line).as_deref() == Some("error")
    }

    fn is_warning(&self, line: &str) -> bool {
        line.trim_start().starts_with("Warning:")
            || tsc_severity(line).as_deref() == Some("warning")
    }
}
