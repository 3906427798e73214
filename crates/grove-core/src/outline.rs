//! Plain outline text parsing
//!
//! Outline text is one thought per line. Nesting is expressed by indentation,
//! and an optional bullet (`-`, `*`, `•`) precedes the value:
//!
//! ```text
//! - fruit
//!   - apple
//!   - pear
//! - vegetables
//! ```

/// One non-blank outline line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineLine {
    /// Indentation width in columns (tab = 2)
    pub indent: usize,
    /// Value with indentation and bullet removed
    pub value: String,
}

/// Indentation width of a line in columns. Tabs count as two columns.
pub fn indent_width(line: &str) -> usize {
    line.chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .map(|c| if c == '\t' { 2 } else { 1 })
        .sum()
}

/// True for lines that carry no content
pub fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

fn strip_bullet(s: &str) -> &str {
    for bullet in ["- ", "* ", "• "] {
        if let Some(rest) = s.strip_prefix(bullet) {
            return rest;
        }
    }
    if s == "-" || s == "*" || s == "•" {
        return "";
    }
    s
}

impl OutlineLine {
    /// Parse a single line; `None` for blank lines
    pub fn parse(line: &str) -> Option<Self> {
        if is_blank(line) {
            return None;
        }
        let indent = indent_width(line);
        let value = strip_bullet(line.trim()).trim_end().to_string();
        Some(Self { indent, value })
    }
}

/// Parse every non-blank line of `text`
pub fn parse_lines(text: &str) -> Vec<OutlineLine> {
    text.lines().filter_map(OutlineLine::parse).collect()
}

/// Nesting depth of each line, derived from relative indentation.
///
/// A line is a child of the closest preceding line with a strictly smaller
/// indent, so both 2- and 4-space outlines nest correctly.
pub fn depths(lines: &[OutlineLine]) -> Vec<usize> {
    let mut stack: Vec<usize> = Vec::new();
    lines
        .iter()
        .map(|line| {
            while stack.last().is_some_and(|top| *top >= line.indent) {
                stack.pop();
            }
            let depth = stack.len();
            stack.push(line.indent);
            depth
        })
        .collect()
}

/// Render `(depth, value)` pairs as `- value` lines, two spaces per depth
pub fn render<'a>(entries: impl IntoIterator<Item = (usize, &'a str)>) -> String {
    entries
        .into_iter()
        .map(|(depth, value)| format!("{}- {}", "  ".repeat(depth), value))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line_strips_bullet_and_indent() {
        let line = OutlineLine::parse("    - apple  ").unwrap();
        assert_eq!(line.indent, 4);
        assert_eq!(line.value, "apple");

        assert_eq!(OutlineLine::parse("\t* pear").unwrap().indent, 2);
        assert_eq!(OutlineLine::parse("plain").unwrap().value, "plain");
        assert!(OutlineLine::parse("   ").is_none());
    }

    #[test]
    fn test_depths_follow_relative_indent() {
        let lines = parse_lines("- a\n    - b\n        - c\n    - d\n- e\n");
        assert_eq!(depths(&lines), vec![0, 1, 2, 1, 0]);
    }

    #[test]
    fn test_depths_tolerate_dedent_to_unseen_level() {
        // "c" dedents to a column between "a" and "b"; it becomes a sibling of "b"
        let lines = parse_lines("- a\n    - b\n  - c\n");
        assert_eq!(depths(&lines), vec![0, 1, 1]);
    }

    #[test]
    fn test_render() {
        let text = render([(0, "a"), (1, "b"), (0, "c")]);
        assert_eq!(text, "- a\n  - b\n- c");
    }
}
