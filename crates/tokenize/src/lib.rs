//! revdiff tokenization layer.
//!
//! Splits revision text into the lexical units that the diff engine compares.
//! Nothing is normalized here: diffs are reported against the original text,
//! so every byte of the input has to come back out of the tokenizer.
//!
//! ## What we do
//!
//! - Wikitext-aware tokenization: words, link and template delimiters,
//!   bold/italic quote runs, header `=` runs, table syntax, HTML entities
//! - Runs of newlines and runs of spaces are single tokens
//! - Anything else is consumed one character at a time
//!
//! ## Invariants worth knowing
//!
//! - Total: the tokenizer never fails and never drops input
//! - Lossless: `tokenize(t).concat() == t` for every `t`
//! - Tokens borrow from the input; nothing is copied
//!
//! ```
//! use tokenize::tokenize;
//!
//! let tokens = tokenize("[[Foo]] ''bar''");
//! assert_eq!(tokens, vec!["[[", "Foo", "]]", " ", "''", "bar", "''"]);
//! assert_eq!(tokens.concat(), "[[Foo]] ''bar''");
//! ```

mod tokenizer;
mod wikitext;

pub use crate::tokenizer::{CharTokenizer, Tokenizer, TokenizerKind, WhitespaceTokenizer};
pub use crate::wikitext::{tokenize, tokens, Tokens, WikitextTokenizer};
