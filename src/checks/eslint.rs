//! Output parser for ESLint's default `stylish` reporter.

use crate::checks::OutputParser;
use regex::Regex;
use std::sync::OnceLock;

/// Parser for `eslint` output.
#[derive(Debug, Default, Clone, Copy)]
pub struct EslintParser;

/// Matches a stylish message row: `  12:5  error  'x' is never used  no-unused-vars`.
fn stylish_row() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^\s*\d+:\d+\s+(error|warning)\s").ok())
        .as_ref()
}

fn severity(line: &str) -> Option<String> {
    stylish_row()?
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

impl OutputParser for EslintParser {
    fn is_error(&self, line: &str) -> bool {
        severity(line).as_deref() == Some("error")
    }

    fn is_warning(&self, line: &str) -> bool {
        severity(line).as_deref() == Some("warning")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STYLISH: &str = "
/project/src/edited.ts
   3:7   error    'unused' is assigned a value but never used  @typescript-eslint/no-unused-vars
  10:1   warning  Unexpected console statement                 no-console
  12:14  error    Missing semicolon                            semi

✖ 3 problems (2 errors, 1 warning)
  1 error and 0 warnings potentially fixable with the `--fix` option.
";

    #[test]
    fn test_counts_stylish_rows() {
        let parsed = EslintParser.parse(STYLISH);
        assert_eq!(parsed.error_count, 2);
        assert_eq!(parsed.warning_count, 1);
    }

    #[test]
    fn test_summary_lines_are_not_rows() {
        assert!(!EslintParser.is_error("✖ 3 problems (2 errors, 1 warning)"));
        assert!(!EslintParser.is_error("  1 error and 0 warnings potentially fixable"));
    }

    #[test]
    fn test_parsing_error_row() {
        assert!(EslintParser.is_error("  1:1  error  Parsing error: Unexpected token"));
    }

    #[test]
    fn test_clean_output() {
        let parsed = EslintParser.parse("");
        assert_eq!(parsed.error_count, 0);
        assert_eq!(parsed.warning_count, 0);
        assert_eq!(parsed.excerpt, None);
    }

    #[test]
    fn test_excerpt_contains_file_header() {
        let parsed = EslintParser.parse(STYLISH);
        let excerpt = parsed.excerpt.expect("excerpt");
        assert!(excerpt.starts_with("/project/src/edited.ts"));
        assert!(excerpt.contains("Missing semicolon"));
    }
}
