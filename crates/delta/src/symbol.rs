//! Token interning.
//!
//! A [`SymbolTable`] maps each distinct token to a dense code, assigned in
//! first-seen order from zero. Token sequences are rewritten as [`Symbol`]
//! sequences (`code + 1`) so an ordinary sequence diff can compare whole
//! tokens as single elements.
//!
//! One table is shared by the two texts of a single comparison so that equal
//! tokens on either side get equal symbols. Tables are never shared between
//! unrelated comparisons: the vocabulary only grows.

use std::num::NonZeroU32;

use fxhash::FxHashMap;

use crate::error::DeltaError;

/// Largest number of distinct tokens a table can hold.
///
/// Codes are `u32` and symbols are `code + 1`, so codes `0..u32::MAX` are
/// usable.
pub const MAX_VOCABULARY: usize = u32::MAX as usize;

/// An interned token: `code + 1`, never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(NonZeroU32);

impl Symbol {
    /// Wraps a raw symbol value. Zero is not a symbol.
    pub fn new(raw: u32) -> Option<Self> {
        NonZeroU32::new(raw).map(Symbol)
    }

    /// Symbol for a table code.
    pub fn from_code(code: u32) -> Option<Self> {
        code.checked_add(1).and_then(Self::new)
    }

    /// The raw value, `code + 1`.
    pub fn get(self) -> u32 {
        self.0.get()
    }

    /// Index of the token in its table.
    pub fn code(self) -> u32 {
        self.0.get() - 1
    }
}

/// Bidirectional token ↔ code mapping, append-only.
#[derive(Debug, Clone)]
pub struct SymbolTable<'a> {
    tokens: Vec<&'a str>,
    codes: FxHashMap<&'a str, u32>,
    limit: usize,
}

impl Default for SymbolTable<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> SymbolTable<'a> {
    pub fn new() -> Self {
        Self::with_limit(MAX_VOCABULARY)
    }

    /// A table that refuses to grow past `limit` distinct tokens.
    /// The limit is clamped to [`MAX_VOCABULARY`].
    pub fn with_limit(limit: usize) -> Self {
        Self {
            tokens: Vec::new(),
            codes: FxHashMap::default(),
            limit: limit.min(MAX_VOCABULARY),
        }
    }

    /// Number of distinct tokens interned so far.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// The token behind `symbol`, if this table issued it.
    pub fn token(&self, symbol: Symbol) -> Option<&'a str> {
        self.tokens.get(symbol.code() as usize).copied()
    }

    /// Symbol for `token`, allocating a new code on first sight.
    pub fn intern_one(&mut self, token: &'a str) -> Result<Symbol, DeltaError> {
        if let Some(&code) = self.codes.get(token) {
            return Ok(Symbol(code_to_nonzero(code)));
        }
        if self.tokens.len() >= self.limit {
            return Err(DeltaError::VocabularyOverflow { limit: self.limit });
        }
        let code = u32::try_from(self.tokens.len())
            .map_err(|_| DeltaError::VocabularyOverflow { limit: self.limit })?;
        self.tokens.push(token);
        self.codes.insert(token, code);
        Ok(Symbol(code_to_nonzero(code)))
    }

    /// Rewrites `tokens` as symbols, growing the table as needed.
    ///
    /// The output has exactly one symbol per input token.
    pub fn intern(&mut self, tokens: &[&'a str]) -> Result<Vec<Symbol>, DeltaError> {
        let mut out = Vec::with_capacity(tokens.len());
        for &token in tokens {
            out.push(self.intern_one(token)?);
        }
        Ok(out)
    }

    /// Maps symbols back to their tokens and joins them with `sep`.
    pub fn decode(&self, symbols: &[Symbol], sep: &str) -> Result<String, DeltaError> {
        let mut out = String::new();
        for (idx, &symbol) in symbols.iter().enumerate() {
            let token = self.token(symbol).ok_or(DeltaError::UnknownSymbol {
                symbol: symbol.get(),
                table_len: self.tokens.len(),
            })?;
            if idx > 0 {
                out.push_str(sep);
            }
            out.push_str(token);
        }
        Ok(out)
    }
}

// Codes are always below `limit <= u32::MAX`, so `code + 1` cannot wrap.
fn code_to_nonzero(code: u32) -> NonZeroU32 {
    NonZeroU32::MIN.saturating_add(code)
}
