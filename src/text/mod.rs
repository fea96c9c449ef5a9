//! # Markup Parsing
//!
//! Turns pasted text into logical lines. Markup applies within one
//! physical line only and never nests:
//!
//! ```text
//! # text      title line
//! ## text     subtitle line
//! **text**    bold run
//! ==text==    emphasized run (highlight box behind the line)
//! ```
//!
//! A marker without a closer later on the same line is plain text. Nothing
//! here can fail.

use crate::model::{LineKind, LogicalLine, StyledRun};
use crate::style::TextStyle;

const EMPH_MARKER: &str = "==";
const BOLD_MARKER: &str = "**";
const SUBTITLE_PREFIX: &str = "## ";
const TITLE_PREFIX: &str = "# ";

/// Split one line (no embedded newline) into styled runs.
///
/// `==` pairs are checked before `**` pairs at each position. Literal text
/// between styled spans, including unmatched markers, is collected into a
/// single `Normal` run. Empty literal runs are never emitted; empty styled
/// runs (`====`, `****`) are.
pub fn tokenize_line(line: &str) -> Vec<StyledRun> {
    let mut runs = Vec::new();
    let mut literal = String::new();
    let mut i = 0;

    while i < line.len() {
        let rest = &line[i..];
        if let Some((style, inner, consumed)) = styled_span(rest) {
            if !literal.is_empty() {
                runs.push(StyledRun::normal(std::mem::take(&mut literal)));
            }
            runs.push(StyledRun::new(style, inner));
            i += consumed;
            continue;
        }

        // Jump to the next marker candidate, or to the end of the line.
        let next = next_marker_offset(rest).unwrap_or(rest.len());
        let step = if next == 0 {
            // Unmatched marker at the cursor: one char is literal, re-check after it.
            rest.chars().next().map_or(1, char::len_utf8)
        } else {
            next
        };
        literal.push_str(&rest[..step]);
        i += step;
    }

    if !literal.is_empty() {
        runs.push(StyledRun::normal(literal));
    }
    runs
}

/// If `rest` starts with a marker that has a closer later on the line,
/// return the style, the enclosed text, and how many bytes the span covers.
fn styled_span(rest: &str) -> Option<(TextStyle, &str, usize)> {
    for (marker, style) in [(EMPH_MARKER, TextStyle::Emph), (BOLD_MARKER, TextStyle::Bold)] {
        if let Some(after) = rest.strip_prefix(marker) {
            if let Some(close) = after.find(marker) {
                let inner = &after[..close];
                return Some((style, inner, marker.len() * 2 + close));
            }
        }
    }
    None
}

fn next_marker_offset(rest: &str) -> Option<usize> {
    [EMPH_MARKER, BOLD_MARKER]
        .iter()
        .filter_map(|m| rest.find(m))
        .min()
}

/// Classify one physical line.
///
/// Heading lines take their whole remainder, trimmed, as one run. No inline
/// markup is recognized inside them.
pub fn classify_line(line: &str) -> LogicalLine {
    if line.trim().is_empty() {
        return LogicalLine::Empty;
    }
    if let Some(rest) = line.strip_prefix(SUBTITLE_PREFIX) {
        return LogicalLine::Text {
            kind: LineKind::Subtitle,
            runs: vec![StyledRun::new(TextStyle::Subtitle, rest.trim())],
        };
    }
    if let Some(rest) = line.strip_prefix(TITLE_PREFIX) {
        return LogicalLine::Text {
            kind: LineKind::Title,
            runs: vec![StyledRun::new(TextStyle::Title, rest.trim())],
        };
    }
    LogicalLine::Text {
        kind: LineKind::Body,
        runs: tokenize_line(line),
    }
}

/// Whether `ch` ends a line. Besides `\n` and `\r` this covers the
/// vertical tab, form feed, file/group/record separators, NEL, and the
/// Unicode line and paragraph separators.
fn is_line_break(ch: char) -> bool {
    matches!(
        ch,
        '\n' | '\r' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// Split `raw_text` into lines. `\r\n` counts as one break, a lone `\r`
/// as another. A trailing break does not produce an extra line.
pub fn split_lines(raw_text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut chars = raw_text.char_indices().peekable();
    while let Some((i, ch)) = chars.next() {
        if !is_line_break(ch) {
            continue;
        }
        lines.push(&raw_text[start..i]);
        start = i + ch.len_utf8();
        if ch == '\r' && matches!(chars.peek(), Some((_, '\n'))) {
            chars.next();
            start += 1;
        }
    }
    if start < raw_text.len() {
        lines.push(&raw_text[start..]);
    }
    lines
}

/// Split raw text on line boundaries and classify every line.
///
/// Line terminators are dropped; nothing else is normalized.
pub fn parse_lines(raw_text: &str) -> Vec<LogicalLine> {
    split_lines(raw_text).into_iter().map(classify_line).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn markup(runs: &[StyledRun]) -> String {
        runs.iter().map(StyledRun::to_markup).collect()
    }

    #[test]
    fn test_plain_text_is_one_normal_run() {
        let runs = tokenize_line("plain text");
        assert_eq!(runs, vec![StyledRun::normal("plain text")]);
    }

    #[test]
    fn test_highlight_pairing() {
        let runs = tokenize_line("a ==b== c");
        assert_eq!(
            runs,
            vec![
                StyledRun::normal("a "),
                StyledRun::new(TextStyle::Emph, "b"),
                StyledRun::normal(" c"),
            ]
        );
    }

    #[test]
    fn test_bold_pairing() {
        let runs = tokenize_line("**Bold note**");
        assert_eq!(runs, vec![StyledRun::new(TextStyle::Bold, "Bold note")]);
    }

    #[test]
    fn test_unterminated_marker_is_literal() {
        assert_eq!(tokenize_line("a ==b"), vec![StyledRun::normal("a ==b")]);
        assert_eq!(tokenize_line("**open"), vec![StyledRun::normal("**open")]);
        assert_eq!(tokenize_line("=="), vec![StyledRun::normal("==")]);
    }

    #[test]
    fn test_empty_pairs_yield_empty_runs() {
        assert_eq!(tokenize_line("===="), vec![StyledRun::new(TextStyle::Emph, "")]);
        assert_eq!(tokenize_line("****"), vec![StyledRun::new(TextStyle::Bold, "")]);
    }

    #[test]
    fn test_markers_do_not_nest() {
        let runs = tokenize_line("==a **b** c==");
        assert_eq!(runs, vec![StyledRun::new(TextStyle::Emph, "a **b** c")]);

        let runs = tokenize_line("**a ==b== c**");
        assert_eq!(runs, vec![StyledRun::new(TextStyle::Bold, "a ==b== c")]);
    }

    #[test]
    fn test_emphasis_checked_before_bold() {
        let runs = tokenize_line("x **y** ==z==");
        assert_eq!(
            runs,
            vec![
                StyledRun::normal("x "),
                StyledRun::new(TextStyle::Bold, "y"),
                StyledRun::normal(" "),
                StyledRun::new(TextStyle::Emph, "z"),
            ]
        );
    }

    #[test]
    fn test_unmatched_then_matched_marker() {
        // The first `**` closes at the second; the trailing `==` is literal.
        let runs = tokenize_line("**a** b ==");
        assert_eq!(
            runs,
            vec![StyledRun::new(TextStyle::Bold, "a"), StyledRun::normal(" b ==")]
        );

        // `===x==`: the pair opens at the first `==` and closes at the last.
        let runs = tokenize_line("===x==");
        assert_eq!(runs, vec![StyledRun::new(TextStyle::Emph, "=x")]);
    }

    #[test]
    fn test_multibyte_text() {
        let runs = tokenize_line("가격 ==특가== 안내 **무료배송");
        assert_eq!(
            runs,
            vec![
                StyledRun::normal("가격 "),
                StyledRun::new(TextStyle::Emph, "특가"),
                StyledRun::normal(" 안내 **무료배송"),
            ]
        );
    }

    #[test]
    fn test_markup_round_trip() {
        let lines = [
            "plain text",
            "a ==b== c",
            "a ==b",
            "**x** and **y**",
            "====",
            "== ** == **",
            "trailing **",
            "한글 ==강조== 끝",
            "=*=*=*",
        ];
        for line in lines {
            assert_eq!(markup(&tokenize_line(line)), line, "round trip of {line:?}");
        }
    }

    #[test]
    fn test_no_adjacent_normal_runs() {
        for line in ["a ==b", "x == y ** z", "==a== ==", "** ** **"] {
            let runs = tokenize_line(line);
            for pair in runs.windows(2) {
                assert!(
                    !(pair[0].style == TextStyle::Normal && pair[1].style == TextStyle::Normal),
                    "adjacent normal runs in {line:?}: {runs:?}"
                );
            }
        }
    }

    #[test]
    fn test_heading_takes_remainder_verbatim() {
        let line = classify_line("## Sub **not bold** ==no box==");
        assert_eq!(
            line,
            LogicalLine::Text {
                kind: LineKind::Subtitle,
                runs: vec![StyledRun::new(
                    TextStyle::Subtitle,
                    "Sub **not bold** ==no box=="
                )],
            }
        );

        let line = classify_line("#   Title  ");
        assert_eq!(
            line,
            LogicalLine::Text {
                kind: LineKind::Title,
                runs: vec![StyledRun::new(TextStyle::Title, "Title")],
            }
        );
    }

    #[test]
    fn test_heading_requires_space() {
        let line = classify_line("#hashtag");
        assert!(matches!(line, LogicalLine::Text { kind: LineKind::Body, .. }));
        let line = classify_line("###  deep");
        assert!(matches!(line, LogicalLine::Text { kind: LineKind::Body, .. }));
        let line = classify_line(" # indented");
        assert!(matches!(line, LogicalLine::Text { kind: LineKind::Body, .. }));
    }

    #[test]
    fn test_whitespace_lines_are_empty() {
        assert_eq!(classify_line(""), LogicalLine::Empty);
        assert_eq!(classify_line("   \t "), LogicalLine::Empty);
    }

    #[test]
    fn test_parse_lines_keeps_every_line() {
        let lines = parse_lines("# Title\n\nNormal line\r\n==Highlighted claim==\n**Bold note**\n");
        assert_eq!(lines.len(), 5);
        assert!(matches!(lines[0], LogicalLine::Text { kind: LineKind::Title, .. }));
        assert_eq!(lines[1], LogicalLine::Empty);
        assert_eq!(lines[2].plain_text(), "Normal line");
        assert!(lines[3].has_emphasis());
        assert_eq!(lines[4].runs()[0].style, TextStyle::Bold);
    }

    #[test]
    fn test_split_lines_on_every_break() {
        assert_eq!(split_lines("a\rb\r\nc\nd"), vec!["a", "b", "c", "d"]);
        assert_eq!(split_lines("a\r\rb"), vec!["a", "", "b"]);
        assert_eq!(
            split_lines("a\x0bb\x0cc\x1cd\u{85}e\u{2028}f\u{2029}g"),
            vec!["a", "b", "c", "d", "e", "f", "g"]
        );
        assert_eq!(split_lines("a\n"), vec!["a"]);
        assert_eq!(split_lines("a\n\n"), vec!["a", ""]);
        assert!(split_lines("").is_empty());
    }

    #[test]
    fn test_old_mac_line_endings() {
        let lines = parse_lines("# Title\r\rbody\r==claim==\r");
        assert_eq!(lines.len(), 4);
        assert!(matches!(lines[0], LogicalLine::Text { kind: LineKind::Title, .. }));
        assert_eq!(lines[1], LogicalLine::Empty);
        assert_eq!(lines[2].plain_text(), "body");
        assert!(lines[3].has_emphasis());
    }
}
