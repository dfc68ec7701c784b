use quick_xml::events::attributes::AttrError;
use thiserror::Error;

/// Errors raised while walking a dump.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DumpError {
    #[error("XML error near byte {position}: {source}")]
    Xml {
        position: u64,
        #[source]
        source: quick_xml::Error,
    },
    #[error("malformed attribute: {0}")]
    Attribute(#[from] AttrError),
    #[error("input ended inside <{0}>")]
    UnexpectedEof(&'static str),
    #[error("expected <{expected}>, found <{found}>")]
    UnexpectedElement {
        expected: &'static str,
        found: String,
    },
    #[error("<{context}> has no <{element}>")]
    MissingField {
        element: &'static str,
        context: &'static str,
    },
    #[error("invalid <{field}> value {value:?}: {reason}")]
    InvalidValue {
        field: &'static str,
        value: String,
        reason: String,
    },
}

impl DumpError {
    /// True when the document is still well formed and the walker can
    /// skip to the next page. Syntax and I/O failures leave the reader
    /// in an unknown state and are not recoverable.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            DumpError::MissingField { .. } | DumpError::InvalidValue { .. }
        )
    }

    pub(crate) fn invalid(field: &'static str, value: &str, reason: impl ToString) -> Self {
        DumpError::InvalidValue {
            field,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}
