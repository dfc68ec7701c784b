use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Kind of an edit span.
///
/// The numeric codes (`-1`, `0`, `1`) are part of the output format and are
/// what [`Display`](fmt::Display) and serde produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditKind {
    Delete,
    Equal,
    Insert,
}

impl EditKind {
    pub const ALL: [EditKind; 3] = [EditKind::Delete, EditKind::Equal, EditKind::Insert];

    pub fn code(self) -> i8 {
        match self {
            EditKind::Delete => -1,
            EditKind::Equal => 0,
            EditKind::Insert => 1,
        }
    }

    pub fn from_code(code: i8) -> Option<Self> {
        match code {
            -1 => Some(EditKind::Delete),
            0 => Some(EditKind::Equal),
            1 => Some(EditKind::Insert),
            _ => None,
        }
    }

    /// Whether a span of this kind covers old text.
    pub fn consumes_old(self) -> bool {
        !matches!(self, EditKind::Insert)
    }
}

impl fmt::Display for EditKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl Serialize for EditKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i8(self.code())
    }
}

impl<'de> Deserialize<'de> for EditKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = i8::deserialize(deserializer)?;
        EditKind::from_code(code).ok_or_else(|| {
            serde::de::Error::custom(format!("edit kind must be -1, 0 or 1, got {code}"))
        })
    }
}

/// One span of an edit script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edit {
    pub kind: EditKind,
    /// Character offset into the old text where the span starts.
    pub position: usize,
    /// The same point as a UTF-8 byte offset.
    pub byte_offset: usize,
    /// Decoded tokens of the span, joined with the script's separator.
    pub text: String,
}

impl fmt::Display for Edit {
    /// `position:kind:text`, the row encoding of an edit.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.position, self.kind, self.text)
    }
}

/// Which edit kinds a script yields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<EditKind>", into = "Vec<EditKind>")]
pub struct ReportKinds {
    delete: bool,
    equal: bool,
    insert: bool,
}

impl Default for ReportKinds {
    fn default() -> Self {
        Self::all()
    }
}

impl ReportKinds {
    pub fn all() -> Self {
        Self {
            delete: true,
            equal: true,
            insert: true,
        }
    }

    /// Deletions and insertions only.
    pub fn changes() -> Self {
        Self {
            equal: false,
            ..Self::all()
        }
    }

    pub fn none() -> Self {
        Self {
            delete: false,
            equal: false,
            insert: false,
        }
    }

    pub fn with(mut self, kind: EditKind) -> Self {
        *self.slot(kind) = true;
        self
    }

    pub fn contains(&self, kind: EditKind) -> bool {
        match kind {
            EditKind::Delete => self.delete,
            EditKind::Equal => self.equal,
            EditKind::Insert => self.insert,
        }
    }

    fn slot(&mut self, kind: EditKind) -> &mut bool {
        match kind {
            EditKind::Delete => &mut self.delete,
            EditKind::Equal => &mut self.equal,
            EditKind::Insert => &mut self.insert,
        }
    }
}

impl FromIterator<EditKind> for ReportKinds {
    fn from_iter<I: IntoIterator<Item = EditKind>>(iter: I) -> Self {
        iter.into_iter().fold(Self::none(), Self::with)
    }
}

impl From<Vec<EditKind>> for ReportKinds {
    fn from(kinds: Vec<EditKind>) -> Self {
        kinds.into_iter().collect()
    }
}

impl From<ReportKinds> for Vec<EditKind> {
    fn from(kinds: ReportKinds) -> Self {
        EditKind::ALL
            .into_iter()
            .filter(|&kind| kinds.contains(kind))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_use_signed_codes() {
        for kind in EditKind::ALL {
            assert_eq!(EditKind::from_code(kind.code()), Some(kind));
        }
        assert_eq!(EditKind::from_code(2), None);
        assert_eq!(EditKind::Delete.to_string(), "-1");
    }

    #[test]
    fn edit_row_encoding() {
        let edit = Edit {
            kind: EditKind::Insert,
            position: 12,
            byte_offset: 14,
            text: "new words".into(),
        };
        assert_eq!(edit.to_string(), "12:1:new words");
    }

    #[test]
    fn report_kinds_serialize_as_code_lists() {
        let json = serde_json::to_string(&ReportKinds::changes()).expect("serialize");
        assert_eq!(json, "[-1,1]");
        let parsed: ReportKinds = serde_json::from_str("[0]").expect("deserialize");
        assert!(parsed.contains(EditKind::Equal));
        assert!(!parsed.contains(EditKind::Insert));
        assert!(serde_json::from_str::<ReportKinds>("[5]").is_err());
    }
}
