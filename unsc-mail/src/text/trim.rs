/// Marker appended to cut or dangling text.
const ELLIPSIS: char = '…';

/// Bound a caption body to `max_chars` characters.
///
/// Longer text is cut at `max_chars` characters and gets an ellipsis. Text that ends in a
/// comma or colon (an unfinished sentence) has that character replaced by an ellipsis.
/// The result never exceeds `max_chars + 1` characters and never ends in `,` or `:`.
pub fn trim_message(text: &str, max_chars: usize) -> String {
    let text = text.trim();

    if text.chars().count() > max_chars {
        let cut_at = text
            .char_indices()
            .nth(max_chars)
            .map_or(text.len(), |(index, _)| index);
        let cut = text[..cut_at].trim_end_matches(|c: char| c.is_whitespace() || is_dangling(c));
        return format!("{cut}{ELLIPSIS}");
    }

    match text.strip_suffix(is_dangling) {
        Some(stripped) => format!("{stripped}{ELLIPSIS}"),
        None => text.to_string(),
    }
}

fn is_dangling(c: char) -> bool {
    c == ',' || c == ':'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_unchanged() {
        assert_eq!(trim_message("  Complete sentence.  ", 750), "Complete sentence.");
    }

    #[test]
    fn test_dangling_comma_and_colon() {
        assert_eq!(trim_message("Recalling its resolutions,", 750), "Recalling its resolutions…");
        assert_eq!(trim_message("Agenda:", 750), "Agenda…");
    }

    #[test]
    fn test_long_text_is_cut() {
        let text = "a".repeat(20);
        let trimmed = trim_message(&text, 10);
        assert_eq!(trimmed, format!("{}…", "a".repeat(10)));
    }

    #[test]
    fn test_cut_counts_characters_not_bytes() {
        let text = "Совет Безопасности";
        assert_eq!(trim_message(text, 5), "Совет…");
    }

    #[test]
    fn test_cut_never_leaves_dangling_punctuation() {
        let trimmed = trim_message("Recalling, noting: deciding", 10);
        assert_eq!(trimmed, "Recalling…");
    }

    #[test]
    fn test_length_bound_and_ending() {
        let samples = ["", ",", "a, b, c, d, e, f,", "x:", "plain text that runs long", "  ,  "];

        for max in [0, 1, 3, 8, 50] {
            for sample in samples {
                let out = trim_message(sample, max);
                assert!(out.chars().count() <= max + 1, "{:?} too long for {}", out, max);
                assert!(!out.ends_with(',') && !out.ends_with(':'), "{:?} dangles", out);
            }
        }
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(trim_message("   ", 750), "");
    }
}
