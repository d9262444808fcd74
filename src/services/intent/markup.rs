//! Delimiter scanning for card intent blocks embedded in assistant text.
//!
//! Everything here works on byte offsets into a borrowed `&str`; nothing
//! mutates the text being scanned.

use std::ops::Range;

pub const FENCE_OPEN: &str = "```card_intent";
pub const FENCE_CLOSE: &str = "```";
pub const TAG_OPEN: &str = "<CARD_INTENT>";
pub const TAG_CLOSE: &str = "</CARD_INTENT>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Syntax {
    Fenced,
    Tag,
}

impl Syntax {
    pub const ALL: [Syntax; 2] = [Syntax::Fenced, Syntax::Tag];

    pub fn open(&self) -> &'static str {
        match self {
            Syntax::Fenced => FENCE_OPEN,
            Syntax::Tag => TAG_OPEN,
        }
    }

    pub fn close(&self) -> &'static str {
        match self {
            Syntax::Fenced => FENCE_CLOSE,
            Syntax::Tag => TAG_CLOSE,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Syntax::Fenced => "fenced",
            Syntax::Tag => "tag",
        }
    }

    // If the first opener has no closer, no later opener has one either.
    fn first_closed(self, text: &str, from: usize) -> Option<Block> {
        let start = from + text.get(from..)?.find(self.open())?;
        let payload_start = start + self.open().len();
        let payload_end = payload_start + text[payload_start..].find(self.close())?;
        Some(Block {
            syntax: self,
            start,
            payload: payload_start..payload_end,
            end: payload_end + self.close().len(),
        })
    }
}

/// A complete block: `start..end` covers both delimiters, `payload` the text
/// between them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub syntax: Syntax,
    pub start: usize,
    pub payload: Range<usize>,
    pub end: usize,
}

impl Block {
    pub fn payload<'a>(&self, text: &'a str) -> &'a str {
        text[self.payload.clone()].trim()
    }
}

/// The earliest-starting fully closed block of either syntax at or after
/// `from`.
pub fn next_block(text: &str, from: usize) -> Option<Block> {
    Syntax::ALL
        .into_iter()
        .filter_map(|syntax| syntax.first_closed(text, from))
        .min_by_key(|block| block.start)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blocks(text: &str) -> impl Iterator<Item = Block> + '_ {
        let mut cursor = 0;
        std::iter::from_fn(move || {
            let block = next_block(text, cursor)?;
            cursor = block.end;
            Some(block)
        })
    }

    #[test]
    fn test_finds_fenced_block() {
        let text = "Hi ```card_intent\n{\"a\":1}\n``` there";
        let block = next_block(text, 0).unwrap();
        assert_eq!(block.syntax, Syntax::Fenced);
        assert_eq!(block.start, 3);
        assert_eq!(block.payload(text), "{\"a\":1}");
        assert_eq!(&text[block.end..], " there");
    }

    #[test]
    fn test_earliest_start_wins_across_syntaxes() {
        let text = "<CARD_INTENT>{}</CARD_INTENT> ```card_intent\n{}\n```";
        let found: Vec<Syntax> = blocks(text).map(|b| b.syntax).collect();
        assert_eq!(found, vec![Syntax::Tag, Syntax::Fenced]);

        let text = "```card_intent\n{}\n``` <CARD_INTENT>{}</CARD_INTENT>";
        let found: Vec<Syntax> = blocks(text).map(|b| b.syntax).collect();
        assert_eq!(found, vec![Syntax::Fenced, Syntax::Tag]);
    }

    #[test]
    fn test_unclosed_opener_is_skipped_for_other_syntax() {
        let text = "```card_intent {\"a\":1} and <CARD_INTENT>{}</CARD_INTENT>";
        let block = next_block(text, 0).unwrap();
        assert_eq!(block.syntax, Syntax::Tag);
    }

    #[test]
    fn test_no_block_without_closer() {
        assert!(next_block("<CARD_INTENT>{\"type\":", 0).is_none());
        assert!(next_block("plain text", 0).is_none());
    }

    #[test]
    fn test_nested_tag_pairs_first_closer() {
        let text = "<CARD_INTENT>a<CARD_INTENT>b</CARD_INTENT>c</CARD_INTENT>";
        let all: Vec<Block> = blocks(text).collect();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].payload(text), "a<CARD_INTENT>b");
    }

    #[test]
    fn test_multibyte_text_around_blocks() {
        let text = "Café ☕ <CARD_INTENT>{}</CARD_INTENT> merci";
        let block = next_block(text, 0).unwrap();
        assert_eq!(&text[..block.start], "Café ☕ ");
    }
}
