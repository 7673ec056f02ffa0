/// Return the first `count` paragraphs of `text` starting at byte offset `start`.
///
/// The offset may land anywhere before the first paragraph (on the separator, in the
/// whitespace after a marker phrase); leading whitespace is skipped. Offsets past the end
/// or inside a multi-byte character are clamped. When fewer than `count` paragraphs remain,
/// everything up to the end of the text is returned.
pub fn extract_paragraphs(text: &str, count: usize, start: usize) -> &str {
    let rest = tail_from(text, start).trim_start();
    let mut remaining = count.max(1);
    let mut cursor = 0;

    while let Some(offset) = rest[cursor..].find('\n') {
        let boundary = cursor + offset;

        if !rest[cursor..boundary].trim().is_empty() {
            remaining -= 1;
            if remaining == 0 {
                return rest[..boundary].trim();
            }
        }

        cursor = boundary + 1;
    }

    rest.trim()
}

fn tail_from(text: &str, start: usize) -> &str {
    let mut start = start.min(text.len());
    while !text.is_char_boundary(start) {
        start += 1;
    }
    &text[start..]
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESOLUTION: &str = "Security Council,\n\nPara one.\n\nPara two.\n\nPara three.";

    #[test]
    fn test_single_paragraph_returns_whole_input() {
        assert_eq!(extract_paragraphs("  Only one paragraph.  ", 1, 0), "Only one paragraph.");
        assert_eq!(extract_paragraphs("Only one paragraph.", 2, 0), "Only one paragraph.");
    }

    #[test]
    fn test_first_two_paragraphs() {
        let text = "Para one.\n\nPara two.\n\nPara three.";
        assert_eq!(extract_paragraphs(text, 2, 0), "Para one.\n\nPara two.");
        assert_eq!(extract_paragraphs(text, 1, 0), "Para one.");
    }

    #[test]
    fn test_offset_after_marker_phrase() {
        let start = RESOLUTION.find("Security Council,").unwrap() + "Security Council,".len();
        assert_eq!(
            extract_paragraphs(RESOLUTION, 2, start),
            "Para one.\n\nPara two."
        );
    }

    #[test]
    fn test_offset_inside_separator() {
        // One byte into the blank-line separator
        let start = "Security Council,\n".len();
        assert_eq!(extract_paragraphs(RESOLUTION, 1, start), "Para one.");
    }

    #[test]
    fn test_fewer_paragraphs_than_requested() {
        assert_eq!(
            extract_paragraphs("Para one.\n\nPara two.", 5, 0),
            "Para one.\n\nPara two."
        );
    }

    #[test]
    fn test_single_newline_separated_lines() {
        assert_eq!(extract_paragraphs("one\ntwo\nthree", 2, 0), "one\ntwo");
    }

    #[test]
    fn test_out_of_range_offsets_are_clamped() {
        assert_eq!(extract_paragraphs("short", 2, 100), "");
        // Offset 1 is inside the two-byte "С"
        assert_eq!(extract_paragraphs("Совет", 1, 1), "овет");
    }

    #[test]
    fn test_zero_count_behaves_like_one() {
        assert_eq!(extract_paragraphs("a\n\nb", 0, 0), "a");
    }
}
