use std::ops::Range;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use similar::{capture_diff_slices_deadline, Algorithm, DiffTag};
use tokenize::{Tokenizer, WikitextTokenizer};
use tracing::debug;

use crate::edit::{Edit, EditKind, ReportKinds};
use crate::error::DeltaError;
use crate::symbol::{Symbol, SymbolTable, MAX_VOCABULARY};

/// Knobs for a single [`simple_diff`] call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffOptions {
    /// Placed between tokens when a span is decoded back to text.
    ///
    /// With a non-empty separator, reported offsets count separator
    /// characters too and no longer index the old text.
    #[serde(default)]
    pub separator: String,
    /// Kinds the script yields. Unreported spans still move the cursor.
    #[serde(default)]
    pub report: ReportKinds,
    /// Upper bound on time spent in the sequence diff. When it expires the
    /// script is still correct, only less minimal.
    #[serde(default)]
    pub timeout: Option<Duration>,
    /// Cap on distinct tokens across both texts.
    #[serde(default)]
    pub max_vocabulary: Option<usize>,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            separator: String::new(),
            report: ReportKinds::all(),
            timeout: None,
            max_vocabulary: None,
        }
    }
}

impl DiffOptions {
    pub fn with_report(mut self, report: ReportKinds) -> Self {
        self.report = report;
        self
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// A contiguous run of one edit kind, as symbol indices into the old
/// sequence (Delete, Equal) or the new sequence (Insert).
#[derive(Debug, Clone, PartialEq, Eq)]
struct Span {
    kind: EditKind,
    range: Range<usize>,
}

/// Computes the token-level edit script turning `old` into `new`.
///
/// Both texts are tokenized, interned into one fresh [`SymbolTable`], and
/// compared as symbol sequences with Myers' algorithm. The returned script
/// is lazy: spans are decoded as it is iterated.
pub fn simple_diff<'a, T>(
    old: &'a str,
    new: &'a str,
    tokenizer: &T,
    options: &DiffOptions,
) -> Result<EditScript<'a>, DeltaError>
where
    T: Tokenizer + ?Sized,
{
    let start = Instant::now();
    let old_tokens = tokenizer.tokenize(old);
    let new_tokens = tokenizer.tokenize(new);

    let mut table = SymbolTable::with_limit(options.max_vocabulary.unwrap_or(MAX_VOCABULARY));
    let old_symbols = table.intern(&old_tokens)?;
    let new_symbols = table.intern(&new_tokens)?;

    // A timeout too large to represent as an instant means no deadline.
    let deadline = options.timeout.and_then(|timeout| start.checked_add(timeout));
    let ops = capture_diff_slices_deadline(Algorithm::Myers, &old_symbols, &new_symbols, deadline);

    let mut spans: Vec<Span> = Vec::with_capacity(ops.len() + 1);
    for op in &ops {
        let (tag, old_range, new_range) = op.as_tag_tuple();
        match tag {
            DiffTag::Equal => push_span(&mut spans, EditKind::Equal, old_range),
            DiffTag::Delete => push_span(&mut spans, EditKind::Delete, old_range),
            DiffTag::Insert => push_span(&mut spans, EditKind::Insert, new_range),
            DiffTag::Replace => {
                push_span(&mut spans, EditKind::Delete, old_range);
                push_span(&mut spans, EditKind::Insert, new_range);
            }
        }
    }

    debug!(
        old_tokens = old_symbols.len(),
        new_tokens = new_symbols.len(),
        vocabulary = table.len(),
        spans = spans.len(),
        elapsed_micros = start.elapsed().as_micros(),
        "diff_computed"
    );

    Ok(EditScript {
        table,
        old: old_symbols,
        new: new_symbols,
        spans: spans.into_iter(),
        separator: options.separator.clone(),
        report: options.report,
        position: 0,
        byte_offset: 0,
        failed: false,
    })
}

/// [`simple_diff`] with the wikitext tokenizer.
pub fn diff_texts<'a>(
    old: &'a str,
    new: &'a str,
    options: &DiffOptions,
) -> Result<EditScript<'a>, DeltaError> {
    simple_diff(old, new, &WikitextTokenizer, options)
}

fn push_span(spans: &mut Vec<Span>, kind: EditKind, range: Range<usize>) {
    if range.is_empty() {
        return;
    }
    if let Some(last) = spans.last_mut() {
        if last.kind == kind && last.range.end == range.start {
            last.range.end = range.end;
            return;
        }
    }
    spans.push(Span { kind, range });
}

/// Lazy, single-pass edit script produced by [`simple_diff`].
///
/// Yields edits in old-text order. Positions advance past Delete and Equal
/// spans but not Insert spans, so an insertion is reported at the old-text
/// point it goes in front of. After an error the script is exhausted.
#[derive(Debug)]
pub struct EditScript<'a> {
    table: SymbolTable<'a>,
    old: Vec<Symbol>,
    new: Vec<Symbol>,
    spans: std::vec::IntoIter<Span>,
    separator: String,
    report: ReportKinds,
    position: usize,
    byte_offset: usize,
    failed: bool,
}

impl<'a> EditScript<'a> {
    /// The table both texts were interned into.
    pub fn table(&self) -> &SymbolTable<'a> {
        &self.table
    }

    /// Spans not yet visited, reported or not.
    pub fn remaining_spans(&self) -> usize {
        if self.failed {
            0
        } else {
            self.spans.len()
        }
    }

    fn decode(&self, span: &Span) -> Result<String, DeltaError> {
        let source = if span.kind.consumes_old() {
            &self.old
        } else {
            &self.new
        };
        let symbols = source.get(span.range.clone()).ok_or(DeltaError::InvalidEdit {
            offset: self.byte_offset,
            reason: format!("span {:?} outside symbol sequence", span.range),
        })?;
        self.table.decode(symbols, &self.separator)
    }
}

impl Iterator for EditScript<'_> {
    type Item = Result<Edit, DeltaError>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.failed {
            let span = self.spans.next()?;
            let text = match self.decode(&span) {
                Ok(text) => text,
                Err(err) => {
                    self.failed = true;
                    return Some(Err(err));
                }
            };
            let edit = Edit {
                kind: span.kind,
                position: self.position,
                byte_offset: self.byte_offset,
                text,
            };
            if span.kind.consumes_old() {
                self.position += edit.text.chars().count();
                self.byte_offset += edit.text.len();
            }
            if self.report.contains(span.kind) {
                return Some(Ok(edit));
            }
        }
        None
    }
}

impl std::iter::FusedIterator for EditScript<'_> {}

/// Rebuilds the new text from `old` and a script's edits.
///
/// `edits` must come from a script with an empty separator and must include
/// every Delete and Insert span; Equal spans are optional. Each Delete and
/// Equal span is checked against `old`.
pub fn apply_edits(old: &str, edits: &[Edit]) -> Result<String, DeltaError> {
    let mut out = String::with_capacity(old.len());
    let mut cursor = 0;

    for edit in edits {
        let offset = edit.byte_offset;
        let kept = old
            .get(cursor..offset)
            .ok_or_else(|| DeltaError::InvalidEdit {
                offset,
                reason: format!("out of order or off a char boundary (cursor at {cursor})"),
            })?;
        out.push_str(kept);
        cursor = offset;

        match edit.kind {
            EditKind::Insert => out.push_str(&edit.text),
            EditKind::Delete | EditKind::Equal => {
                if !old[cursor..].starts_with(edit.text.as_str()) {
                    return Err(DeltaError::InvalidEdit {
                        offset,
                        reason: "span text differs from old text".into(),
                    });
                }
                if edit.kind == EditKind::Equal {
                    out.push_str(&edit.text);
                }
                cursor += edit.text.len();
            }
        }
    }
    out.push_str(&old[cursor..]);
    Ok(out)
}
