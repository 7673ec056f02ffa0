//! Paragraph-preserving whitespace normalization.

/// Private-use placeholder for a paragraph break while lines are joined.
const PARAGRAPH_SENTINEL: char = '\u{E000}';

/// Collapse raw page text into paragraphs separated by exactly one blank line.
///
/// A newline followed by optional spaces/tabs and another newline (`"\n \n"` as emitted by
/// the page reader, or a plain blank line) marks a paragraph break. Hyphenated line breaks
/// are rejoined, every other newline is dropped and runs of spaces collapse to one.
pub fn normalize(raw: &str) -> String {
    let marked = mark_paragraph_breaks(&raw.replace('\r', ""));
    let joined = marked.replace("-\n", "").replace('\n', "");

    let paragraphs = joined
        .split(PARAGRAPH_SENTINEL)
        .map(|paragraph| paragraph.trim_matches(' '))
        .filter(|paragraph| !paragraph.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n");

    collapse_spaces(&paragraphs).trim().to_string()
}

/// Replace each newline/blank/newline sequence with the sentinel.
fn mark_paragraph_breaks(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(pos) = rest.find('\n') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        let gap = after.len() - after.trim_start_matches([' ', '\t']).len();

        if after[gap..].starts_with('\n') {
            out.push(PARAGRAPH_SENTINEL);
            rest = &after[gap + 1..];
        } else {
            out.push('\n');
            rest = after;
        }
    }

    out.push_str(rest);
    out
}

fn collapse_spaces(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous_space = false;

    for ch in text.chars() {
        if ch == ' ' {
            if !previous_space {
                out.push(ch);
            }
            previous_space = true;
        } else {
            out.push(ch);
            previous_space = false;
        }
    }

    out
}
