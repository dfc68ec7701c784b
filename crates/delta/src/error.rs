use thiserror::Error;

/// Errors that can occur while interning, decoding, or applying an edit
/// script.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DeltaError {
    /// A symbol was decoded against a table that never issued it.
    #[error("symbol {symbol} has no entry in a table of {table_len} tokens")]
    UnknownSymbol { symbol: u32, table_len: usize },
    /// More distinct tokens than the table may hold.
    #[error("vocabulary limit of {limit} distinct tokens exceeded")]
    VocabularyOverflow { limit: usize },
    /// An edit does not line up with the text it is applied to.
    #[error("edit at byte {offset} does not match the old text: {reason}")]
    InvalidEdit { offset: usize, reason: String },
}
