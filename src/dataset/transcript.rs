//! Line-indexed transcript of the source text

use serde::{Deserialize, Serialize};

/// Punctuation kept alongside CJK ideographs
const KEPT_PUNCTUATION: &str = "，。！？；：「」『』《》【】、\"";

/// A kept line of the source text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextLine {
    /// 1-based position in the original, unfiltered line split
    #[serde(rename = "lineNumber")]
    pub line_number: usize,
    pub chars: Vec<char>,
    pub text: String,
}

/// Whether a character survives transcript filtering
pub fn is_transcript_char(c: char) -> bool {
    ('\u{4e00}'..='\u{9fa5}').contains(&c) || KEPT_PUNCTUATION.contains(c)
}

/// Split `raw` on `\n` and keep whitelisted characters of each line.
///
/// Blank lines are dropped, and so are lines with nothing left after
/// filtering. Line numbers still count every line of the split, so the
/// result can have gaps.
pub fn tokenize_transcript(raw: &str) -> Vec<TextLine> {
    raw.split('\n')
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .filter_map(|(idx, line)| {
            let chars: Vec<char> = line.chars().filter(|&c| is_transcript_char(c)).collect();
            if chars.is_empty() {
                return None;
            }

            Some(TextLine {
                line_number: idx + 1,
                text: chars.iter().collect(),
                chars,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_and_line_gap() {
        let lines = tokenize_transcript("你好,world\n\n测试。");

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].line_number, 1);
        assert_eq!(lines[0].text, "你好");
        assert_eq!(lines[0].chars, vec!['你', '好']);
        assert_eq!(lines[1].line_number, 3);
        assert_eq!(lines[1].text, "测试。");
    }

    #[test]
    fn test_whitespace_lines_dropped() {
        let lines = tokenize_transcript("  \t\n\u{3000}\n天地\r\n");

        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].line_number, 3);
        assert_eq!(lines[0].text, "天地");
    }

    #[test]
    fn test_line_without_kept_chars_dropped() {
        let lines = tokenize_transcript("hello 123\n人");

        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].line_number, 2);
    }

    #[test]
    fn test_duplicates_and_order_kept() {
        let lines = tokenize_transcript("「人人」、《天》！");
        assert_eq!(lines[0].text, "「人人」、《天》！");
        assert_eq!(lines[0].chars.len(), 9);
    }

    #[test]
    fn test_whitelist_bounds() {
        assert!(is_transcript_char('\u{4e00}'));
        assert!(is_transcript_char('\u{9fa5}'));
        assert!(!is_transcript_char('\u{9fa6}'));
        assert!(!is_transcript_char('\u{3400}'));
        assert!(is_transcript_char('"'));
        assert!(!is_transcript_char(','));
        assert!(!is_transcript_char('.'));
        assert!(!is_transcript_char('a'));
    }

    #[test]
    fn test_empty_input() {
        assert!(tokenize_transcript("").is_empty());
    }

    #[test]
    fn test_line_number_serializes_camel_case() {
        let lines = tokenize_transcript("人");
        let value = serde_json::to_value(&lines[0]).unwrap();

        assert_eq!(value["lineNumber"], 1);
        assert_eq!(value["text"], "人");
    }
}
