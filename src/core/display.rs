//! Display utilities for CLI output formatting.
//!
//! Shared table rendering for quote frames, plus text truncation helpers
//! that keep wide cells (company reports, server lists) inside the
//! terminal.

use tabled::{Table, Tabled};

/// Renders rows as a table sized to the current terminal.
///
/// Falls back to an 80-column layout when the terminal width cannot be
/// detected (pipes, CI).
pub(crate) fn render_table<T: Tabled>(rows: impl IntoIterator<Item = T>) -> String {
    let terminal_width = if let Some((terminal_size::Width(w), _)) = terminal_size::terminal_size()
    {
        w as usize
    } else {
        80
    };

    let mut table = Table::new(rows);
    table
        .with(tabled::settings::Style::modern())
        .with(tabled::settings::Width::wrap(
            terminal_width.saturating_sub(4),
        ))
        .with(tabled::settings::Padding::new(1, 1, 0, 0));

    table.to_string()
}

/// Truncates a string to fit within the specified maximum length.
///
/// Keeps the beginning of the string and appends "..." to indicate
/// truncation, working on character boundaries so multi-byte content
/// (company reports are GBK-decoded Chinese text) stays intact.
pub(crate) fn truncate_string(s: &str, max_len: usize) -> String {
    let chars: Vec<char> = s.chars().collect();

    if chars.len() <= max_len {
        s.to_string()
    } else {
        let available_chars = max_len.saturating_sub(3);
        if available_chars == 0 {
            "...".to_string()
        } else {
            let truncated: String = chars[..available_chars].iter().collect();
            format!("{}...", truncated)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_string_no_truncation_needed() {
        assert_eq!(truncate_string("short", 10), "short");
        assert_eq!(truncate_string("exact", 5), "exact");
        assert_eq!(truncate_string("", 10), "");
        assert_eq!(truncate_string("ab", 2), "ab");
    }

    #[test]
    fn test_truncate_string_basic_truncation() {
        assert_eq!(truncate_string("this is a long string", 10), "this is...");
        assert_eq!(truncate_string("hello world", 8), "hello...");
        assert_eq!(truncate_string("testing", 6), "tes...");
    }

    #[test]
    fn test_truncate_string_minimal_length() {
        assert_eq!(truncate_string("hello", 3), "...");
        assert_eq!(truncate_string("toolong", 4), "t...");
        assert_eq!(truncate_string("ab", 3), "ab");
    }

    #[test]
    fn test_truncate_string_unicode() {
        assert_eq!(truncate_string("café", 4), "café");
        assert_eq!(truncate_string("招商银行股份有限公司", 6), "招商银...");
    }

    #[test]
    fn test_render_table_contains_rows() {
        #[derive(Tabled)]
        struct Row {
            code: String,
            price: f64,
        }

        let rendered = render_table(vec![Row {
            code: "600036".into(),
            price: 10.5,
        }]);

        assert!(rendered.contains("600036"));
        assert!(rendered.contains("10.5"));
    }
}
