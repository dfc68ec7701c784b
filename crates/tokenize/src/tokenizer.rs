//! The [`Tokenizer`] seam and the stock implementations.
//!
//! The diff engine is generic over how text is cut into tokens. Any
//! implementation must be lossless: joining the returned tokens in order has
//! to reproduce the input, or reported positions stop lining up with the old
//! text.

use serde::{Deserialize, Serialize};

use crate::wikitext::WikitextTokenizer;

/// Splits text into borrowed tokens.
pub trait Tokenizer {
    fn tokenize<'a>(&self, text: &'a str) -> Vec<&'a str>;
}

impl<F> Tokenizer for F
where
    F: for<'a> Fn(&'a str) -> Vec<&'a str>,
{
    fn tokenize<'a>(&self, text: &'a str) -> Vec<&'a str> {
        self(text)
    }
}

/// One token per Unicode scalar value. Gives character-level diffs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CharTokenizer;

impl Tokenizer for CharTokenizer {
    fn tokenize<'a>(&self, text: &'a str) -> Vec<&'a str> {
        let mut out = Vec::with_capacity(text.len());
        let mut chars = text.char_indices().peekable();
        while let Some((start, _)) = chars.next() {
            let end = chars.peek().map_or(text.len(), |&(idx, _)| idx);
            out.push(&text[start..end]);
        }
        out
    }
}

/// Alternating runs of whitespace and non-whitespace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WhitespaceTokenizer;

impl Tokenizer for WhitespaceTokenizer {
    fn tokenize<'a>(&self, text: &'a str) -> Vec<&'a str> {
        let mut out = Vec::new();
        let mut start = 0;
        let mut in_space: Option<bool> = None;

        for (idx, ch) in text.char_indices() {
            let space = ch.is_whitespace();
            match in_space {
                Some(prev) if prev != space => {
                    out.push(&text[start..idx]);
                    start = idx;
                }
                _ => {}
            }
            in_space = Some(space);
        }
        if start < text.len() {
            out.push(&text[start..]);
        }
        out
    }
}

/// Config-selectable tokenizer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenizerKind {
    #[default]
    Wikitext,
    Whitespace,
    Chars,
}

impl Tokenizer for TokenizerKind {
    fn tokenize<'a>(&self, text: &'a str) -> Vec<&'a str> {
        match self {
            TokenizerKind::Wikitext => WikitextTokenizer.tokenize(text),
            TokenizerKind::Whitespace => WhitespaceTokenizer.tokenize(text),
            TokenizerKind::Chars => CharTokenizer.tokenize(text),
        }
    }
}
