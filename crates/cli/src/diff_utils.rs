//! Utilities for generating line-by-line diffs

use owo_colors::OwoColorize;
use similar::{ChangeTag, TextDiff};

/// Check if content is binary (contains null bytes in first 8KB)
pub fn is_binary(content: &[u8]) -> bool {
    content.iter().take(8192).any(|&b| b == 0)
}

/// Generate a unified diff with colored output
///
/// `old_label` and `new_label` name the two sides in the `---`/`+++` header.
/// Returns an empty string when the contents are equal.
pub fn generate_unified_diff(
    old_content: &[u8],
    new_content: &[u8],
    old_label: &str,
    new_label: &str,
    context_lines: usize,
) -> String {
    let old_text = String::from_utf8_lossy(old_content);
    let new_text = String::from_utf8_lossy(new_content);

    let diff = TextDiff::from_lines(&old_text, &new_text);

    let mut output = String::new();

    for (hunk_idx, hunk) in diff
        .unified_diff()
        .context_radius(context_lines)
        .iter_hunks()
        .enumerate()
    {
        if hunk_idx == 0 {
            output.push_str(&format!("{}\n", format!("--- {}", old_label).bold()));
            output.push_str(&format!("{}\n", format!("+++ {}", new_label).bold()));
        }

        let header = format!("{}", hunk.header());
        output.push_str(&format!("{}\n", header.cyan()));

        for change in hunk.iter_changes() {
            let line: &str = change.value();

            match change.tag() {
                ChangeTag::Delete => output.push_str(&format!("{}", format!("-{}", line).red())),
                ChangeTag::Insert => output.push_str(&format!("{}", format!("+{}", line).green())),
                ChangeTag::Equal => output.push_str(&format!("{}", format!(" {}", line).dimmed())),
            }

            if !line.ends_with('\n') {
                output.push('\n');
            }
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_binary() {
        assert!(!is_binary(b"Hello, world!"));
        assert!(!is_binary(b"Line 1\nLine 2\nLine 3"));
        assert!(is_binary(b"Hello\x00world"));
        assert!(is_binary(&[0u8; 100]));
    }

    #[test]
    fn test_unified_diff_shows_both_sides() {
        let old = b"line 1\nline 2\nline 3\n";
        let new = b"line 1\nline 2 modified\nline 3\n";

        let diff = generate_unified_diff(old, new, "a.txt", "~a.txt", 1);

        assert!(diff.contains("--- a.txt"));
        assert!(diff.contains("+++ ~a.txt"));
        assert!(diff.contains("-line 2"));
        assert!(diff.contains("+line 2 modified"));
    }

    #[test]
    fn test_unified_diff_of_equal_content_is_empty() {
        let text = b"same\n";
        assert!(generate_unified_diff(text, text, "a", "b", 3).is_empty());
    }

    #[test]
    fn test_unified_diff_without_trailing_newline() {
        let diff = generate_unified_diff(b"", b"new", "a", "b", 3);
        assert!(diff.contains("+new"));
        assert!(diff.ends_with('\n'));
    }
}
