//! Outline chunking
//!
//! Plain outline text is split into fixed-size chunks of whole lines. The
//! split is a pure function of the text and the chunk size, which is what lets
//! a resumed import skip exactly the chunks an earlier run already merged.

use grove_core::outline::{indent_width, is_blank};

/// A contiguous run of outline lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Position in chunk order, starting at 0
    pub index: usize,
    /// Verbatim chunk text, including line terminators
    pub text: String,
    /// Outline lines of the ancestors of the chunk's first non-blank line,
    /// outermost first, without line terminators
    pub ancestors: Vec<String>,
    /// Index of the chunk's first line in the whole outline
    pub start_line: usize,
    /// Number of lines in the chunk
    pub line_count: usize,
}

/// Number of lines in `text`. A trailing newline does not start a new line.
pub fn line_count(text: &str) -> usize {
    text.split_inclusive('\n').count()
}

/// Split `text` into chunks of `chunk_size` lines.
///
/// Concatenating the chunk texts in index order reproduces `text` exactly.
/// The last chunk may be shorter. A `chunk_size` of 0 is treated as 1.
pub fn chunk_outline(text: &str, chunk_size: usize) -> Vec<Chunk> {
    let size = chunk_size.max(1);
    let lines: Vec<&str> = text.split_inclusive('\n').collect();

    lines
        .chunks(size)
        .enumerate()
        .map(|(index, group)| {
            let start_line = index * size;
            Chunk {
                index,
                text: group.concat(),
                ancestors: ancestors_of(&lines, start_line, group),
                start_line,
                line_count: group.len(),
            }
        })
        .collect()
}

/// Ancestor lines of the first non-blank line in `group`, found by walking
/// back through `lines` for successively shallower indentation.
fn ancestors_of(lines: &[&str], start_line: usize, group: &[&str]) -> Vec<String> {
    let Some(first) = group.iter().find(|line| !is_blank(line)) else {
        return Vec::new();
    };

    let mut threshold = indent_width(first);
    let mut ancestors = Vec::new();
    for line in lines[..start_line].iter().rev() {
        if threshold == 0 {
            break;
        }
        if is_blank(line) {
            continue;
        }
        let indent = indent_width(line);
        if indent < threshold {
            ancestors.push(line.trim_end_matches(['\n', '\r']).to_string());
            threshold = indent;
        }
    }
    ancestors.reverse();
    ancestors
}
