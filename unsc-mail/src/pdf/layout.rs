//! Reading-order reconstruction from positioned text runs.
//!
//! Runs are grouped into lines by vertical position, lines are ordered top to bottom and
//! runs left to right. A vertical gap noticeably larger than the line height starts a new
//! paragraph.

use super::reader::{ClipRect, TextSpan};

/// Vertical gap between lines, relative to line height, that separates paragraphs
const PARAGRAPH_GAP_RATIO: f32 = 0.6;

/// Horizontal gap between runs, relative to line height, that separates words
const WORD_GAP_RATIO: f32 = 0.15;

/// A positioned run of text in top-left page coordinates.
#[derive(Debug, Clone)]
pub struct TextRun {
    pub text: String,
    pub bounds: ClipRect,
    pub bold: bool,
    pub italic: bool,
}

struct Line<'a> {
    runs: Vec<&'a TextRun>,
    top: f32,
    bottom: f32,
}

impl Line<'_> {
    fn height(&self) -> f32 {
        self.bottom - self.top
    }

    fn text(&self) -> String {
        join_runs(&self.runs, self.height())
    }
}

/// Concatenate runs of one line, inserting a space only where the horizontal gap is wide
/// enough to be a word break.
fn join_runs(runs: &[&TextRun], line_height: f32) -> String {
    let mut text = String::new();
    let mut previous: Option<&TextRun> = None;

    for run in runs {
        if let Some(prev) = previous {
            let gap = run.bounds.left - prev.bounds.right;
            if gap > line_height * WORD_GAP_RATIO
                && !text.ends_with(char::is_whitespace)
                && !run.text.starts_with(char::is_whitespace)
            {
                text.push(' ');
            }
        }
        text.push_str(&run.text);
        previous = Some(run);
    }

    text.trim().to_string()
}

/// Text of all runs inside `clip`, one line per `\n` and paragraph gaps as `"\n \n"`.
///
/// Lines that do not end in a hyphen carry a trailing space so words stay separated once
/// line breaks are removed.
pub fn text_in_reading_order(runs: &[TextRun], clip: ClipRect) -> String {
    let lines = group_lines(runs, clip);
    let mut out = String::new();

    for (index, line) in lines.iter().enumerate() {
        let text = line.text();
        out.push_str(&text);

        let Some(next) = lines.get(index + 1) else {
            break;
        };

        if next.top - line.bottom > line.height() * PARAGRAPH_GAP_RATIO {
            out.push_str("\n \n");
        } else if text.ends_with('-') {
            out.push('\n');
        } else {
            out.push_str(" \n");
        }
    }

    out
}

/// Styled spans inside `clip` in reading order.
///
/// Neighbouring runs on a line that share a style form one span, joined the same way as
/// body text, so a word split across several text objects stays one word.
pub fn spans_in_reading_order(runs: &[TextRun], clip: ClipRect) -> Vec<TextSpan> {
    let mut spans = Vec::new();

    for line in group_lines(runs, clip) {
        let height = line.height();
        for styled in line
            .runs
            .chunk_by(|a, b| a.bold == b.bold && a.italic == b.italic)
        {
            spans.push(TextSpan {
                text: join_runs(styled, height),
                bold: styled[0].bold,
            });
        }
    }

    spans
}

fn group_lines(runs: &[TextRun], clip: ClipRect) -> Vec<Line<'_>> {
    let mut inside: Vec<&TextRun> = runs
        .iter()
        .filter(|run| !run.text.trim().is_empty() && clip.contains_center_of(&run.bounds))
        .collect();
    inside.sort_by(|a, b| {
        a.bounds
            .top
            .total_cmp(&b.bounds.top)
            .then(a.bounds.left.total_cmp(&b.bounds.left))
    });

    let mut lines: Vec<Line> = Vec::new();
    for run in inside {
        let center = (run.bounds.top + run.bounds.bottom) / 2.0;
        match lines.last_mut() {
            Some(line) if center >= line.top && center <= line.bottom => {
                line.top = line.top.min(run.bounds.top);
                line.bottom = line.bottom.max(run.bounds.bottom);
                line.runs.push(run);
            }
            _ => lines.push(Line {
                runs: vec![run],
                top: run.bounds.top,
                bottom: run.bounds.bottom,
            }),
        }
    }

    for line in &mut lines {
        line.runs
            .sort_by(|a, b| a.bounds.left.total_cmp(&b.bounds.left));
    }

    lines
}
