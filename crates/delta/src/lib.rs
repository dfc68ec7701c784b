//! revdiff delta layer: token-level edit scripts.
//!
//! Generic sequence diffs compare elements for equality and know nothing about
//! words. This crate makes them work on tokens by interning every distinct
//! token into a small integer [`Symbol`]; the two texts become symbol
//! sequences, the sequences are diffed with Myers' algorithm (via `similar`),
//! and the resulting spans are decoded back into text.
//!
//! ## Contract
//!
//! - One fresh [`SymbolTable`] per comparison, shared by both texts
//! - Edits come out in old-text order
//! - [`Edit::position`] is a character offset into the old text; it moves
//!   forward over Delete and Equal spans and stays put for Insert spans
//! - Vocabulary overflow is an error, never a silent wrap
//!
//! ## Example
//!
//! ```
//! use delta::{diff_texts, DiffOptions, EditKind, ReportKinds};
//!
//! let options = DiffOptions::default().with_report(ReportKinds::changes());
//! let edits: Vec<_> = diff_texts("Foo derp 263254", "Foo derp 26354", &options)
//!     .unwrap()
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//!
//! assert_eq!(edits.len(), 2);
//! assert_eq!(edits[0].kind, EditKind::Delete);
//! assert_eq!(edits[0].to_string(), "9:-1:263254");
//! assert_eq!(edits[1].to_string(), "15:1:26354");
//! ```

mod edit;
mod error;
mod script;
mod symbol;

pub use crate::edit::{Edit, EditKind, ReportKinds};
pub use crate::error::DeltaError;
pub use crate::script::{apply_edits, diff_texts, simple_diff, DiffOptions, EditScript};
pub use crate::symbol::{Symbol, SymbolTable, MAX_VOCABULARY};
pub use tokenize::{Tokenizer, TokenizerKind};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codec_round_trips_tokenized_text() {
        let text = "{{Infobox|name=X}}\n'''X''' is a [[thing]] &amp; more.";
        let tokens = tokenize::tokenize(text);
        let mut table = SymbolTable::new();
        let symbols = table.intern(&tokens).expect("intern");
        assert_eq!(symbols.len(), tokens.len());
        assert_eq!(table.decode(&symbols, "").expect("decode"), text);
    }

    #[test]
    fn wikitext_shared_table_growth() {
        let first = tokenize::tokenize("a b");
        let second = tokenize::tokenize("b c");
        let mut table = SymbolTable::new();
        let a = table.intern(&first).expect("first");
        let b = table.intern(&second).expect("second");
        assert_eq!(a[2], b[0]);
        // a, " ", b, c
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn tokenizer_kind_drives_granularity() {
        let options = DiffOptions::default().with_report(ReportKinds::changes());
        let by_char: Vec<_> = simple_diff("cat", "cut", &TokenizerKind::Chars, &options)
            .expect("diff")
            .collect::<Result<_, _>>()
            .expect("decode");
        assert_eq!(by_char.len(), 2);
        assert_eq!(by_char[0].to_string(), "1:-1:a");
        assert_eq!(by_char[1].to_string(), "2:1:u");
    }
}
