//! Document chunking policy.
//!
//! Splits extracted page texts into overlapping chunks bounded by a
//! character budget. Splitting prefers paragraph breaks, then line breaks,
//! then spaces, and only falls back to a hard character cut when a window
//! contains no separator at all. All limits are in characters, not bytes,
//! so multi-byte text never splits inside a code point.

use crate::config::Settings;
use crate::types::{Chunk, PageText};

#[derive(Debug, Clone)]
pub struct SplitConfig {
    /// Maximum chunk length in characters.
    pub max_chars: usize,
    /// Characters copied from the end of a chunk into the start of the next.
    pub overlap_chars: usize,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            max_chars: 1000,
            overlap_chars: 200,
        }
    }
}

#[derive(Debug, Default)]
pub struct TextSplitter {
    config: SplitConfig,
}

impl TextSplitter {
    pub fn new(config: SplitConfig) -> Self {
        Self { config }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(SplitConfig {
            max_chars: settings.chunk_size,
            overlap_chars: settings.chunk_overlap,
        })
    }

    /// Split extracted pages into overlapping chunks.
    ///
    /// Pages are split one at a time (their texts are never concatenated),
    /// but the overlap window belongs to the document: every chunk except
    /// the first starts with the last `overlap_chars` characters of the
    /// previous chunk, including across a page boundary. A chunk is
    /// attributed to the page its fresh content starts on, and sequence
    /// numbers are gapless across the whole document.
    ///
    /// A page without content contributes no chunk; a document with no
    /// content yields an empty vector, which is not an error.
    pub fn split(&self, source_id: &str, pages: &[PageText]) -> Vec<Chunk> {
        let max = self.config.max_chars.max(1);
        let overlap = self.config.overlap_chars.min(max - 1);

        let mut chunks: Vec<Chunk> = Vec::new();
        // Overlap carried into the next chunk; empty only before the first
        // chunk of the document.
        let mut carry = String::new();
        for page in pages {
            if page.text.trim().is_empty() {
                continue;
            }
            let text: Vec<char> = page.text.chars().collect();
            let mut pos = 0usize;
            while pos < text.len() {
                let carry_len = carry.chars().count();
                let capacity = max - carry_len;
                let hard_end = (pos + capacity).min(text.len());
                let end = if hard_end < text.len() {
                    break_before(&text, pos, hard_end)
                } else {
                    hard_end
                };
                let mut piece = String::with_capacity(carry.len() + (end - pos) * 4);
                piece.push_str(&carry);
                piece.extend(&text[pos..end]);
                carry = char_suffix(&piece, overlap);
                chunks.push(Chunk {
                    source_id: source_id.to_string(),
                    page: page.page,
                    sequence: chunks.len(),
                    text: piece,
                });
                pos = end;
            }
        }
        chunks
    }
}

/// Choose where to end the window `text[pos..hard_end]` when more text
/// follows: after the last paragraph break in the window, otherwise after
/// the last line break, otherwise after the last space, otherwise exactly
/// at `hard_end` (hard character cut). A separator is only taken in the
/// second half of the window so chunks keep a useful length.
fn break_before(text: &[char], pos: usize, hard_end: usize) -> usize {
    let floor = pos + (hard_end - pos) / 2;

    for i in (pos..hard_end.saturating_sub(1)).rev() {
        if text[i] == '\n' && text[i + 1] == '\n' {
            let cut = i + 2;
            if cut > floor {
                return cut;
            }
            break;
        }
    }
    for i in (pos..hard_end).rev() {
        if text[i] == '\n' {
            let cut = i + 1;
            if cut > floor {
                return cut;
            }
            break;
        }
    }
    for i in (pos..hard_end).rev() {
        if text[i] == ' ' {
            let cut = i + 1;
            if cut > floor {
                return cut;
            }
            break;
        }
    }
    hard_end
}

/// Last `n` characters of `s` (the whole string when shorter).
fn char_suffix(s: &str, n: usize) -> String {
    let len = s.chars().count();
    if len <= n {
        return s.to_string();
    }
    s.chars().skip(len - n).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn char_suffix_caps_at_string_length() {
        assert_eq!(char_suffix("abc", 5), "abc");
        assert_eq!(char_suffix("abcdef", 2), "ef");
        assert_eq!(char_suffix("abc", 0), "");
    }

    #[test]
    fn break_prefers_paragraph_over_space() {
        let text: Vec<char> = "one two three four\n\nfive six".chars().collect();
        let cut = break_before(&text, 0, 26);
        assert_eq!(cut, 20, "cuts after the blank line, not the later space");
    }

    #[test]
    fn break_falls_back_to_hard_cut() {
        let text: Vec<char> = "x".repeat(50).chars().collect();
        assert_eq!(break_before(&text, 0, 30), 30);
    }
}
