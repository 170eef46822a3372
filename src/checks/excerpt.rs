//! Bounded excerpts of tool output around error lines.

/// Lines of context kept before an error line.
pub const CONTEXT_BEFORE: usize = 1;
/// Lines of context kept after an error line.
pub const CONTEXT_AFTER: usize = 2;
/// Maximum number of windows in one excerpt.
pub const MAX_WINDOWS: usize = 5;
/// Maximum number of lines in one excerpt, dividers included.
pub const MAX_LINES: usize = 30;
/// Maximum characters kept from a single line.
pub const MAX_LINE_CHARS: usize = 400;
/// Separator between windows.
pub const DIVIDER: &str = "---";

/// Builds an excerpt from the context windows around `error_lines`
/// (indices into `lines`). Returns `None` when there is nothing to show.
#[must_use]
pub fn windows(lines: &[&str], error_lines: &[usize]) -> Option<String> {
    let mut out: Vec<&str> = Vec::new();

    for (n, &idx) in error_lines.iter().take(MAX_WINDOWS).enumerate() {
        if idx >= lines.len() {
            continue;
        }
        if n > 0 {
            out.push(DIVIDER);
        }
        let start = idx.saturating_sub(CONTEXT_BEFORE);
        let end = (idx + CONTEXT_AFTER + 1).min(lines.len());
        out.extend_from_slice(&lines[start..end]);
    }

    render(&out)
}

/// Builds an excerpt from the first lines of `raw`, for failures whose
/// output carries no recognizable markers.
#[must_use]
pub fn head(raw: &str) -> Option<String> {
    let lines: Vec<&str> = raw.lines().filter(|l| !l.trim().is_empty()).collect();
    render(&lines)
}

fn render(lines: &[&str]) -> Option<String> {
    if lines.iter().all(|l| l.trim().is_empty()) {
        return None;
    }

    let mut text = lines
        .iter()
        .take(MAX_LINES)
        .map(|line| truncate(line))
        .collect::<Vec<_>>()
        .join("\n");

    if lines.len() > MAX_LINES {
        text.push_str(&format!("\n... ({} more lines)", lines.len() - MAX_LINES));
    }

    Some(text)
}

fn truncate(line: &str) -> String {
    match line.char_indices().nth(MAX_LINE_CHARS) {
        Some((cut, _)) => format!("{}...", &line[..cut]),
        None => line.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn numbered(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("line {i}")).collect()
    }

    #[test]
    fn test_single_window_has_one_before_two_after() {
        let owned = numbered(10);
        let lines: Vec<&str> = owned.iter().map(String::as_str).collect();

        let excerpt = windows(&lines, &[4]).expect("excerpt");
        assert_eq!(excerpt, "line 3\nline 4\nline 5\nline 6");
    }

    #[test]
    fn test_windows_are_divided() {
        let owned = numbered(20);
        let lines: Vec<&str> = owned.iter().map(String::as_str).collect();

        let excerpt = windows(&lines, &[2, 10]).expect("excerpt");
        assert_eq!(
            excerpt,
            "line 1\nline 2\nline 3\nline 4\n---\nline 9\nline 10\nline 11\nline 12"
        );
    }

    #[test]
    fn test_window_clamped_at_edges() {
        let lines = ["first", "second"];
        assert_eq!(windows(&lines, &[0]).as_deref(), Some("first\nsecond"));
        assert_eq!(windows(&lines, &[1]).as_deref(), Some("first\nsecond"));
    }

    #[test]
    fn test_at_most_five_windows() {
        let owned = numbered(100);
        let lines: Vec<&str> = owned.iter().map(String::as_str).collect();
        let errors: Vec<usize> = (0..10).map(|i| i * 10 + 5).collect();

        let excerpt = windows(&lines, &errors).expect("excerpt");
        assert_eq!(excerpt.matches(DIVIDER).count(), MAX_WINDOWS - 1);
        assert!(excerpt.contains("line 45"));
        assert!(!excerpt.contains("line 55"));
    }

    #[test]
    fn test_no_error_lines_is_none() {
        assert_eq!(windows(&["a", "b"], &[]), None);
    }

    #[test]
    fn test_head_caps_line_count() {
        let raw = numbered(100).join("\n");
        let excerpt = head(&raw).expect("excerpt");
        assert!(excerpt.contains("line 29"));
        assert!(!excerpt.contains("line 30\n"));
        assert!(excerpt.ends_with("... (70 more lines)"));
    }

    #[test]
    fn test_head_of_blank_output_is_none() {
        assert_eq!(head(""), None);
        assert_eq!(head("\n  \n"), None);
    }

    #[test]
    fn test_long_lines_are_truncated() {
        let long = "x".repeat(MAX_LINE_CHARS + 50);
        let excerpt = head(&long).expect("excerpt");
        assert_eq!(excerpt.len(), MAX_LINE_CHARS + 3);
        assert!(excerpt.ends_with("..."));
    }
}
