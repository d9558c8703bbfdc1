//! Transcript text cleanup.
//!
//! Whisper output carries layout noise (line breaks, doubled spaces) and
//! captioning conventions such as `[Music]`, `(laughs)` and `♪`. [`normalize`]
//! strips them in a fixed order; later steps see the output of earlier ones.
//!
//! Parenthetical removal is global and lossy: a speaker's genuine aside in
//! parentheses is dropped just like an annotation.

use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
// C0 controls except \t \n \r, DEL, and C1 controls except NEL (U+0085)
static CONTROL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\x00-\x08\x0B\x0C\x0E-\x1F\x7F-\x84\x86-\x9F]").unwrap());
static LEADING_BRACKET_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\[.*?\]").unwrap());
static TRAILING_BRACKET_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[.*?\]$").unwrap());
static PARENTHETICAL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(.*?\)").unwrap());

const MUSIC_NOTES: [char; 2] = ['♪', '♫'];

/// Clean raw transcript text.
///
/// In order:
/// 1. collapse whitespace runs to one space, trim
/// 2. drop control characters
/// 3. drop one leading `[...]`, then one trailing `[...]`; the trailing
///    match runs from the first `[` whose shortest match reaches the end
/// 4. drop every `(...)`
/// 5. drop `♪` / `♫`
/// 6. collapse the gaps left by removals, trim
///
/// A single pass is a fixed point unless a removal uncovers a new bracket
/// at the edge, e.g. `"[a][b] x"`.
pub fn normalize(raw: &str) -> String {
    let text = collapse_whitespace(raw);
    let text = CONTROL_RE.replace_all(&text, "");
    let text = LEADING_BRACKET_RE.replace(&text, "");
    let text = TRAILING_BRACKET_RE.replace(&text, "");
    let text = PARENTHETICAL_RE.replace_all(&text, "");
    let text = text.replace(MUSIC_NOTES, "");
    collapse_whitespace(&text)
}

fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RE.replace_all(text, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Inputs with no nested or stacked brackets.
    const SAMPLES: &[&str] = &[
        "",
        "   ",
        "plain text",
        "  Hello\n\n  world\t again ",
        "[Music] We're no strangers to love [Applause]",
        "a [b] c [d] e",
        "Hello (world) foo (bar) baz",
        "♪ la la ♪",
        "♫ humming ♫ and talking",
        "bell\x07 char and del\x7f char",
        "c1\u{0090}control\u{0084}chars",
        "  [intro] Hello (whispering) world ♪music♪  ",
        "(laughs)",
        "[only a tag]",
        "unbalanced ( paren",
        "unbalanced ] bracket [",
        "spared\u{00A0}nbsp",
    ];

    fn is_stripped_control(c: char) -> bool {
        matches!(c as u32, 0x00..=0x08 | 0x0B | 0x0C | 0x0E..=0x1F | 0x7F..=0x84 | 0x86..=0x9F)
    }

    #[test]
    fn test_collapses_whitespace() {
        assert_eq!(normalize("  Hello\n\n  world\t again "), "Hello world again");
    }

    #[test]
    fn test_strips_leading_and_trailing_brackets() {
        assert_eq!(normalize("[music] hello [end]"), "hello");
    }

    #[test]
    fn test_interior_brackets_untouched() {
        assert_eq!(normalize("a [b] c [d] e"), "a [b] c [d] e");
    }

    #[test]
    fn test_leading_bracket_is_single_shot() {
        assert_eq!(normalize("[a] [b] text"), "[b] text");
    }

    #[test]
    fn test_trailing_bracket_starts_at_first_reaching_bracket() {
        assert_eq!(normalize("x [a] y [b]"), "x");
    }

    #[test]
    fn test_trailing_bracket_after_leading_removal() {
        assert_eq!(normalize("[intro] We talk [laughs] about it [outro]"), "We talk");
    }

    #[test]
    fn test_removes_all_parentheticals() {
        assert_eq!(normalize("Hello (world) foo (bar) baz"), "Hello foo baz");
    }

    #[test]
    fn test_parenthetical_is_non_greedy() {
        assert_eq!(normalize("a (b (c) d) e"), "a d) e");
    }

    #[test]
    fn test_strips_music_notes() {
        assert_eq!(normalize("♪ la la ♪"), "la la");
        assert_eq!(normalize("♫ humming ♫ and talking"), "humming and talking");
    }

    #[test]
    fn test_strips_control_characters() {
        assert_eq!(normalize("bell\x07 char"), "bell char");
        assert_eq!(normalize("c1\u{0090}control\u{0084}"), "c1control");
    }

    #[test]
    fn test_nel_and_nbsp_become_spaces() {
        assert_eq!(normalize("a\u{0085}b\u{00A0}c"), "a b c");
    }

    #[test]
    fn test_whisper_style_output() {
        assert_eq!(
            normalize("  [intro] Hello (whispering) world ♪music♪  "),
            "Hello world music"
        );
    }

    #[test]
    fn test_only_annotations_yields_empty() {
        assert_eq!(normalize("[Music]"), "");
        assert_eq!(normalize("(laughs)"), "");
        assert_eq!(normalize("♪♪"), "");
    }

    #[test]
    fn test_single_pass_is_fixed_point() {
        for input in SAMPLES {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "input: {input:?}");
        }
    }

    #[test]
    fn test_output_invariants() {
        for input in SAMPLES {
            let out = normalize(input);
            assert!(!out.chars().any(is_stripped_control), "input: {input:?}");
            assert!(!out.contains("  "), "input: {input:?}");
            assert_eq!(out.trim(), out, "input: {input:?}");
            assert!(!out.contains(MUSIC_NOTES), "input: {input:?}");
        }
    }
}
